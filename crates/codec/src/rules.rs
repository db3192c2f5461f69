use serde::{Deserialize, Serialize};

/// The default number of words the decoder may read per word of input.
pub const DEFAULT_DECODE_BUDGET_FACTOR: usize = 32;

/// Rules for the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncodeRules {
    /// Alias identical dynamic values to a single encoding. The output remains decodable by
    /// any ABI decoder but is not byte-for-byte canonical.
    pub should_optimize: bool,
    /// Render the output as an annotated dump instead of a hex string.
    pub should_annotate: bool,
}

impl Default for EncodeRules {
    fn default() -> Self {
        Self { should_optimize: true, should_annotate: false }
    }
}

impl EncodeRules {
    /// Returns rules producing the canonical encoding, without optimization.
    pub const fn canonical() -> Self {
        Self { should_optimize: false, should_annotate: false }
    }
}

/// Rules for the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecodeRules {
    /// Decode tuples to [`AbiValue::Struct`](abi_primitives::AbiValue::Struct) keyed by member
    /// name instead of positional [`AbiValue::Tuple`](abi_primitives::AbiValue::Tuple).
    pub should_convert_structs_to_objects: bool,
    /// Decode a `bool` found at the end of the input with no bytes left as `false`. Some
    /// nodes return empty data for a `false` result.
    pub allow_empty_bool: bool,
    /// The number of words the decoder may read per word of input. Offsets pointing to the
    /// same content are followed every time, so a small input can otherwise take an amount
    /// of work exponential in its nesting depth. Encodings heavily aliased by the optimizer
    /// may need a larger factor. Zero disables the limit.
    pub decode_budget_factor: usize,
}

impl Default for DecodeRules {
    fn default() -> Self {
        Self {
            should_convert_structs_to_objects: false,
            allow_empty_bool: false,
            decode_budget_factor: DEFAULT_DECODE_BUDGET_FACTOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_deserialize_rules_with_defaults() -> eyre::Result<()> {
        let rules: EncodeRules = serde_json::from_str(r#"{ "shouldAnnotate": true }"#)?;
        assert_eq!(rules, EncodeRules { should_optimize: true, should_annotate: true });

        let rules: DecodeRules = serde_json::from_str(r#"{ "allowEmptyBool": true }"#)?;
        assert!(!rules.should_convert_structs_to_objects);
        assert!(rules.allow_empty_bool);
        assert_eq!(rules.decode_budget_factor, DEFAULT_DECODE_BUDGET_FACTOR);

        let rules: DecodeRules = serde_json::from_str(r#"{ "decodeBudgetFactor": 0 }"#)?;
        assert_eq!(rules.decode_budget_factor, 0);

        Ok(())
    }
}
