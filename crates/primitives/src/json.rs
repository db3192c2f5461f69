//! Conversions between [`AbiValue`] and JSON.
//!
//! JSON values map loosely onto [`AbiValue`]: strings stay strings and are coerced by the
//! encoder according to the target type (hex for bytes and addresses, decimal or hex for
//! integers). Serialization renders addresses and bytes as lower-case `0x` hex and integers as
//! decimal strings, so values of any width survive a trip through JSON.

use crate::AbiValue;
use alloy_primitives::{hex, I256, U256};
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serialize, Serializer,
};
use serde_json::Value;

/// An error converting a JSON value into an [`AbiValue`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JsonValueError {
    /// JSON `null` has no ABI counterpart.
    #[error("null is not a valid ABI value")]
    Null,
    /// The number is neither a 64 bits signed nor unsigned integer. Larger numbers must be
    /// provided as strings.
    #[error("unsupported number {0}, use a decimal string for large or fractional values")]
    UnsupportedNumber(String),
}

impl TryFrom<Value> for AbiValue {
    type Error = JsonValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => return Err(JsonValueError::Null),
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Self::Uint(U256::from(u))
                } else if let Some(i) = n.as_i64() {
                    Self::Int(
                        I256::try_from(i)
                            .map_err(|_| JsonValueError::UnsupportedNumber(n.to_string()))?,
                    )
                } else {
                    return Err(JsonValueError::UnsupportedNumber(n.to_string()))
                }
            }
            Value::String(s) => Self::String(s),
            Value::Array(values) => {
                Self::Array(values.into_iter().map(Self::try_from).collect::<Result<_, _>>()?)
            }
            Value::Object(map) => Self::Struct(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Self::try_from(v)?)))
                    .collect::<Result<_, JsonValueError>>()?,
            ),
        })
    }
}

impl Serialize for AbiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Address(address) => serializer.serialize_str(&hex::encode_prefixed(address)),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.collect_str(i),
            Self::Uint(u) => serializer.collect_str(u),
            Self::Bytes(bytes) => serializer.serialize_str(&hex::encode_prefixed(bytes)),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(values) | Self::Tuple(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Self::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
