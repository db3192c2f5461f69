//! Canonical signatures and selectors.

use crate::{Param, SELECTOR_SIZE};
use alloy_primitives::{keccak256, Selector};

/// Returns the canonical form of the type string `ty`, replacing the `tuple` keyword with the
/// parenthesized canonical types of `components` and expanding the `int`, `uint` and `byte`
/// aliases.
///
/// The function does not validate the type: unknown types are returned as is.
pub fn canonical_type(ty: &str, components: &[Param]) -> String {
    let ty = ty.trim();
    let (base, suffix) = split_array_suffix(ty);

    let base = if base == "tuple" {
        let members = components.iter().map(Param::canonical_type).collect::<Vec<_>>();
        format!("({})", members.join(","))
    } else if let Some(members) =
        base.strip_prefix('(').and_then(|b| b.strip_suffix(')')).and_then(split_top_level)
    {
        let members = members.into_iter().map(|c| canonical_type(c, &[])).collect::<Vec<_>>();
        format!("({})", members.join(","))
    } else {
        match base {
            "uint" => "uint256",
            "int" => "int256",
            "byte" => "bytes1",
            other => other,
        }
        .to_owned()
    };

    format!("{base}{suffix}")
}

/// Returns the canonical signature `name(t1,t2,...)` of a function or an error.
pub fn function_signature(name: &str, inputs: &[Param]) -> String {
    let inputs = inputs.iter().map(Param::canonical_type).collect::<Vec<_>>();
    format!("{name}({})", inputs.join(","))
}

/// Returns the canonical signature of a custom error. Errors share the function signature
/// format.
pub fn error_signature(name: &str, inputs: &[Param]) -> String {
    function_signature(name, inputs)
}

/// Returns the selector of the signature: the first 4 bytes of its Keccak-256 hash.
pub fn selector(signature: &str) -> Selector {
    Selector::from_slice(&keccak256(signature.as_bytes())[..SELECTOR_SIZE])
}

/// Splits `ty` into its base type and its array suffix, e.g. `(a,b)[2][]` into `(a,b)` and
/// `[2][]`.
fn split_array_suffix(ty: &str) -> (&str, &str) {
    let search_from = if ty.starts_with('(') { ty.rfind(')').map_or(0, |i| i + 1) } else { 0 };
    match ty[search_from..].find('[') {
        Some(index) => ty.split_at(search_from + index),
        None => (ty, ""),
    }
}

/// Splits the inner part of an inline tuple, e.g. `uint256,(bool,string)[]`, at its top level
/// commas. The parts are trimmed. Returns [`None`] on unbalanced parentheses.
pub fn split_top_level(inner: &str) -> Option<Vec<&str>> {
    if inner.trim().is_empty() {
        return Some(Vec::new())
    }

    let mut depth = 0usize;
    let mut start = 0;
    let mut parts = Vec::new();
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None
    }
    parts.push(inner[start..].trim());
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::{sol, SolCall};

    sol! {
        struct Deposit {
            address owner;
            uint96 amount;
        }

        function stake(uint256 poolId, Deposit[] deposits, bytes32 salt);
    }

    #[test]
    fn test_should_expand_aliases() {
        assert_eq!(canonical_type("uint", &[]), "uint256");
        assert_eq!(canonical_type("int[3][]", &[]), "int256[3][]");
        assert_eq!(canonical_type("(uint, (int,byte)[2])[]", &[]), "(uint256,(int256,bytes1)[2])[]");
    }

    #[test]
    fn test_should_split_at_top_level_commas() {
        assert_eq!(
            split_top_level("uint256, (bool,string)[],bytes"),
            Some(vec!["uint256", "(bool,string)[]", "bytes"])
        );
        assert_eq!(split_top_level(" "), Some(vec![]));
        assert_eq!(split_top_level("(bool"), None);
        assert_eq!(split_top_level("bool),(uint8"), None);
    }

    #[test]
    fn test_should_keep_unbalanced_tuples_as_is() {
        assert_eq!(canonical_type("(uint,(int)", &[]), "(uint,(int)");
    }

    #[test]
    fn test_should_render_tuple_components() {
        let ty = canonical_type(
            "tuple[2]",
            &[Param::new("owner", "address"), Param::new("amount", "uint")],
        );
        assert_eq!(ty, "(address,uint256)[2]");
    }

    #[test]
    fn test_should_compute_function_selector() {
        let inputs = [
            Param::new("poolId", "uint256"),
            Param::tuple(
                "deposits",
                "tuple[]",
                vec![Param::new("owner", "address"), Param::new("amount", "uint96")],
            ),
            Param::new("salt", "bytes32"),
        ];
        let signature = function_signature("stake", &inputs);

        assert_eq!(signature, stakeCall::SIGNATURE);
        assert_eq!(selector(&signature), Selector::from(stakeCall::SELECTOR));
    }
}
