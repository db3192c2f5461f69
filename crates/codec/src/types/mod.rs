//! The typed node tree the encoder and the decoder walk.

pub use blob::{Blob, BlobKind};
mod blob;

pub use pointer::Pointer;
mod pointer;

pub use set::{Set, SetKind, TupleMember};
mod set;

use crate::{
    cursor::Cursor,
    error::CodecError,
    layout::{BlockId, Layout},
    rules::DecodeRules,
};
use abi_primitives::{AbiValue, WORD_SIZE};
use alloy_primitives::{B256, U256};

/// A node of the type tree.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum DataType {
    /// An elementary type.
    Blob(Blob),
    /// A tuple or an array.
    Set(Set),
    /// A dynamic member of a set.
    Pointer(Pointer),
}

impl DataType {
    /// Returns the scoped name of the node, e.g. `pool.poolId`.
    pub fn name(&self) -> &str {
        match self {
            Self::Blob(blob) => blob.name(),
            Self::Set(set) => set.name(),
            Self::Pointer(pointer) => pointer.name(),
        }
    }

    /// Returns the canonical type string, without member names.
    pub fn signature(&self) -> String {
        match self {
            Self::Blob(blob) => blob.signature(),
            Self::Set(set) => set.signature(),
            Self::Pointer(pointer) => pointer.destination().signature(),
        }
    }

    /// Returns true if the size of the encoding does not depend on the value.
    pub fn is_static(&self) -> bool {
        match self {
            Self::Blob(blob) => blob.is_static(),
            Self::Set(set) => set.is_static(),
            Self::Pointer(_) => false,
        }
    }

    /// Returns true if the node is a [`Pointer`].
    pub const fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }

    /// Returns the size of the encoding if it does not depend on the value.
    pub fn static_size(&self) -> Option<usize> {
        match self {
            Self::Blob(blob) => blob.static_size(),
            Self::Set(set) => set.static_size(),
            Self::Pointer(_) => None,
        }
    }

    /// Returns the size the node takes in the head of its enclosing set.
    pub fn head_size(&self) -> usize {
        self.static_size().unwrap_or(WORD_SIZE)
    }

    /// Encodes the value into blocks of the layout, named after `path`, and returns the
    /// block of the node.
    pub fn encode_fragment(
        &self,
        value: &AbiValue,
        layout: &mut Layout,
        path: &str,
    ) -> Result<BlockId, CodecError> {
        match self {
            Self::Blob(blob) => blob.encode_fragment(value, layout, path),
            Self::Set(set) => set.encode_fragment(value, layout, path),
            Self::Pointer(pointer) => pointer.encode_fragment(value, layout, path),
        }
    }

    /// Decodes a value at the cursor.
    pub fn decode_fragment(
        &self,
        cursor: &mut Cursor<'_>,
        rules: &DecodeRules,
    ) -> Result<AbiValue, CodecError> {
        match self {
            Self::Blob(blob) => blob.decode_fragment(cursor, rules),
            Self::Set(set) => set.decode_fragment(cursor, rules),
            Self::Pointer(pointer) => pointer.decode_fragment(cursor, rules),
        }
    }

    /// Returns the node ready to be a member of the set `parent`: dynamic nodes are placed
    /// behind a [`Pointer`].
    pub(crate) fn into_member(self, parent: &str) -> Self {
        if self.is_static() || self.is_pointer() {
            return self
        }
        Pointer::new(parent, self).into()
    }
}

/// Returns `key` scoped by the `parent` path.
pub(crate) fn scoped(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

/// Reads an offset or a length from a word.
pub(crate) fn word_to_usize(word: B256) -> Option<usize> {
    usize::try_from(U256::from_be_bytes(word.0)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linearizer;
    use alloy_primitives::bytes;

    #[test]
    fn test_should_encode_and_decode_nested_pointers() -> eyre::Result<()> {
        // (uint8,string[])
        let node: DataType = Set::tuple(
            "batch",
            vec![
                ("version".into(), Blob::new("batch.version", BlobKind::Uint(8))?.into()),
                (
                    "chunks".into(),
                    Set::array("batch.chunks", Blob::new("batch.chunks[]", BlobKind::String)?.into(), None)
                        .into(),
                ),
            ],
        )
        .into();
        assert_eq!(node.signature(), "(uint8,string[])");

        let value = AbiValue::Tuple(vec![
            AbiValue::from(7u64),
            AbiValue::new_array(["a", "bc"]),
        ]);

        let mut layout = Layout::new();
        let root = node.encode_fragment(&value, &mut layout, node.name())?;
        layout.set_root(root);
        let order = linearizer::linearize(&layout)?;
        linearizer::assign_offsets(&mut layout, &order);
        let encoded = linearizer::to_bytes(&layout, &order)?;

        assert_eq!(
            encoded,
            bytes!(
                "0000000000000000000000000000000000000000000000000000000000000007"
                "0000000000000000000000000000000000000000000000000000000000000040"
                "0000000000000000000000000000000000000000000000000000000000000002"
                "0000000000000000000000000000000000000000000000000000000000000040"
                "0000000000000000000000000000000000000000000000000000000000000080"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "6100000000000000000000000000000000000000000000000000000000000000"
                "0000000000000000000000000000000000000000000000000000000000000002"
                "6263000000000000000000000000000000000000000000000000000000000000"
            )
        );

        let decoded = node.decode_fragment(&mut Cursor::new(&encoded), &DecodeRules::default())?;
        assert_eq!(decoded, value);

        Ok(())
    }

    #[test]
    fn test_should_reject_out_of_bounds_pointer() -> eyre::Result<()> {
        let node: DataType = Set::tuple(
            "greet",
            vec![("message".into(), Blob::new("greet.message", BlobKind::String)?.into())],
        )
        .into();
        let mut data = vec![0u8; 32];
        data[31] = 0x40;

        assert!(matches!(
            node.decode_fragment(&mut Cursor::new(&data), &DecodeRules::default()),
            Err(CodecError::Decoding(crate::error::DecodingError::OutOfBounds { .. }))
        ));

        Ok(())
    }
}
