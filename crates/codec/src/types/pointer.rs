use crate::{
    cursor::Cursor,
    error::{CodecError, DecodingError},
    layout::{Block, BlockId, Layout},
    rules::DecodeRules,
    types::{word_to_usize, DataType},
};
use abi_primitives::AbiValue;

/// The head of a dynamic member of a set: a word holding the offset of the member's content,
/// relative to the start of the set's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    parent: String,
    destination: Box<DataType>,
}

impl Pointer {
    /// Returns a new [`Pointer`] to `destination`, member of the set named `parent`.
    pub fn new(parent: impl Into<String>, destination: DataType) -> Self {
        Self { parent: parent.into(), destination: Box::new(destination) }
    }

    /// Returns the name of the destination.
    pub fn name(&self) -> &str {
        self.destination.name()
    }

    /// Returns the name of the enclosing set.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Returns the node the pointer points to.
    pub fn destination(&self) -> &DataType {
        &self.destination
    }

    /// Encodes the destination and returns the dependent block pointing to it.
    pub fn encode_fragment(
        &self,
        value: &AbiValue,
        layout: &mut Layout,
        path: &str,
    ) -> Result<BlockId, CodecError> {
        let destination = self.destination.encode_fragment(value, layout, path)?;
        let id = layout.push(Block::dependent(path, self.destination.signature(), destination));
        layout.block_mut(destination).parent = Some(id);
        Ok(id)
    }

    /// Follows the offset at the cursor, decodes the destination and moves the cursor back
    /// after the offset.
    pub fn decode_fragment(
        &self,
        cursor: &mut Cursor<'_>,
        rules: &DecodeRules,
    ) -> Result<AbiValue, CodecError> {
        cursor.charge(1, rules.decode_budget_factor)?;
        let word = cursor.pop_word()?;
        let offset = word_to_usize(word)
            .and_then(|relative| cursor.to_absolute_offset(relative))
            .filter(|offset| *offset <= cursor.len())
            .ok_or_else(|| DecodingError::OutOfBounds { name: self.name().to_owned(), value: word })?;

        let resume = cursor.position();
        cursor.seek(offset)?;
        let value = self.destination.decode_fragment(cursor, rules);
        cursor.seek(resume)?;
        value
    }
}
