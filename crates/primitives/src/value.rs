//! The dynamic value model shared by the encoder and the decoder.

use alloy_primitives::{Address, Bytes, I256, U256};

/// A dynamically typed ABI value.
///
/// The encoder accepts some loose representations (hex strings for byte types and addresses,
/// decimal or hex strings for integers, positional tuples for structs). The decoder always
/// produces the canonical variant for the type it decodes.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum AbiValue {
    /// An `address`.
    Address(Address),
    /// A `bool`.
    Bool(bool),
    /// A signed integer, any width up to 256 bits.
    Int(I256),
    /// An unsigned integer, any width up to 256 bits.
    Uint(U256),
    /// A `bytes` or `bytesN` value.
    Bytes(Bytes),
    /// A `string`.
    String(String),
    /// A fixed or dynamic array.
    #[from(ignore)]
    Array(Vec<AbiValue>),
    /// A tuple with positional members.
    #[from(ignore)]
    Tuple(Vec<AbiValue>),
    /// A tuple keyed by member name, in declaration order.
    #[from(ignore)]
    Struct(Vec<(String, AbiValue)>),
}

impl AbiValue {
    /// Returns a short name for the variant, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
            Self::Struct(_) => "struct",
        }
    }

    /// Returns a new [`AbiValue::Struct`] from the provided `(name, value)` pairs.
    pub fn new_struct<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Struct(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Returns a new [`AbiValue::Array`] from the provided values.
    pub fn new_array<V: Into<Self>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }

    /// Returns the address if the value is an [`AbiValue::Address`].
    pub const fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(address) => Some(address),
            _ => None,
        }
    }

    /// Returns the boolean if the value is an [`AbiValue::Bool`].
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the unsigned integer if the value is an [`AbiValue::Uint`].
    pub const fn as_uint(&self) -> Option<&U256> {
        match self {
            Self::Uint(u) => Some(u),
            _ => None,
        }
    }

    /// Returns the signed integer if the value is an [`AbiValue::Int`].
    pub const fn as_int(&self) -> Option<&I256> {
        match self {
            Self::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the bytes if the value is an [`AbiValue::Bytes`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the string if the value is an [`AbiValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the values of an [`AbiValue::Array`] or an [`AbiValue::Tuple`].
    pub fn as_slice(&self) -> Option<&[Self]> {
        match self {
            Self::Array(values) | Self::Tuple(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the member `name` of an [`AbiValue::Struct`].
    pub fn field(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(key, _)| key == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Converts every [`AbiValue::Struct`] in the value into an [`AbiValue::Tuple`], recursively.
    pub fn into_positional(self) -> Self {
        match self {
            Self::Struct(fields) => {
                Self::Tuple(fields.into_iter().map(|(_, v)| v.into_positional()).collect())
            }
            Self::Tuple(values) => Self::Tuple(values.into_iter().map(Self::into_positional).collect()),
            Self::Array(values) => Self::Array(values.into_iter().map(Self::into_positional).collect()),
            other => other,
        }
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }
}

impl From<i64> for AbiValue {
    fn from(value: i64) -> Self {
        Self::Int(I256::try_from(value).unwrap_or(I256::ZERO))
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_should_convert_struct_to_positional() {
        let value = AbiValue::new_struct([
            ("owner", AbiValue::from(address!("00000000000000000000000000000000000000aa"))),
            (
                "stakes",
                AbiValue::Array(vec![AbiValue::new_struct([("amount", AbiValue::from(5u64))])]),
            ),
        ]);

        let expected = AbiValue::Tuple(vec![
            AbiValue::Address(address!("00000000000000000000000000000000000000aa")),
            AbiValue::Array(vec![AbiValue::Tuple(vec![AbiValue::Uint(U256::from(5))])]),
        ]);
        assert_eq!(value.into_positional(), expected);
    }

    #[test]
    fn test_should_lookup_struct_field() {
        let value = AbiValue::new_struct([("a", "hi"), ("b", "there")]);

        assert_eq!(value.field("b").and_then(AbiValue::as_str), Some("there"));
        assert_eq!(value.field("c"), None);
        assert_eq!(AbiValue::from(-3i64).as_int(), Some(&I256::try_from(-3i64).unwrap()));
    }
}
