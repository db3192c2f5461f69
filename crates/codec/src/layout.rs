//! The layout tree built by the encoder.
//!
//! Each node instance encoded for a value produces one [`Block`] in a [`Layout`] arena. Blocks
//! reference each other through [`BlockId`] handles: a [`BlockKind::Member`] lists its
//! children, a [`BlockKind::Dependent`] points at the block holding the dynamic value it
//! stands for. Offsets are assigned once the tree is linearized.

use crate::error::LayoutError;
use abi_primitives::WORD_SIZE;
use alloy_primitives::{Selector, B256, U256};
use std::borrow::Cow;

/// A handle to a [`Block`] of a [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("#{_0}")]
pub struct BlockId(usize);

/// A block of the layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The name of the node that produced the block, scoped by the path of the value.
    pub name: String,
    /// The canonical type of the node.
    pub signature: String,
    /// The enclosing block.
    pub parent: Option<BlockId>,
    /// The offset of the block in the output, set during linearization.
    pub offset: Option<usize>,
    /// The content of the block.
    pub kind: BlockKind,
}

/// The content of a [`Block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Encoded bytes. The first `header_size` bytes are the length word of a dynamic blob.
    Payload {
        /// The encoded bytes.
        data: Vec<u8>,
        /// The size of the header.
        header_size: usize,
    },
    /// The members of a set, with the length word of a dynamic array.
    Member {
        /// The members, in order.
        children: Vec<BlockId>,
        /// The length word.
        header: Option<B256>,
    },
    /// A pointer to another block.
    Dependent {
        /// The block holding the value.
        destination: BlockId,
        /// A block with identical content the pointer resolves to instead of its destination.
        alias: Option<BlockId>,
    },
}

impl Block {
    /// Returns a new [`BlockKind::Payload`] block.
    pub fn payload(
        name: impl Into<String>,
        signature: impl Into<String>,
        data: Vec<u8>,
        header_size: usize,
    ) -> Self {
        Self::new(name, signature, BlockKind::Payload { data, header_size })
    }

    /// Returns a new [`BlockKind::Member`] block without children.
    pub fn member(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self::new(name, signature, BlockKind::Member { children: Vec::new(), header: None })
    }

    /// Returns a new [`BlockKind::Dependent`] block.
    pub fn dependent(
        name: impl Into<String>,
        signature: impl Into<String>,
        destination: BlockId,
    ) -> Self {
        Self::new(name, signature, BlockKind::Dependent { destination, alias: None })
    }

    fn new(name: impl Into<String>, signature: impl Into<String>, kind: BlockKind) -> Self {
        Self { name: name.into(), signature: signature.into(), parent: None, offset: None, kind }
    }

    /// Returns the size of the header of the block.
    pub const fn header_size(&self) -> usize {
        match &self.kind {
            BlockKind::Payload { header_size, .. } => *header_size,
            BlockKind::Member { header: Some(_), .. } => WORD_SIZE,
            BlockKind::Member { header: None, .. } | BlockKind::Dependent { .. } => 0,
        }
    }

    /// Returns the size of the body of the block. The body of a member block is made of its
    /// children's blocks, which are sized on their own.
    pub fn body_size(&self) -> usize {
        match &self.kind {
            BlockKind::Payload { data, header_size } => data.len() - header_size,
            BlockKind::Member { .. } => 0,
            BlockKind::Dependent { .. } => WORD_SIZE,
        }
    }

    /// Returns the number of bytes the block itself contributes to the output.
    pub fn size_in_bytes(&self) -> usize {
        self.header_size() + self.body_size()
    }

    /// Returns true if the block is a [`BlockKind::Dependent`].
    pub const fn is_dependent(&self) -> bool {
        matches!(self.kind, BlockKind::Dependent { .. })
    }

    fn offset_or_err(&self) -> Result<usize, LayoutError> {
        self.offset.ok_or_else(|| LayoutError::UnassignedOffset(self.name.clone()))
    }
}

/// The arena of blocks produced by a single encode call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    blocks: Vec<Block>,
    root: Option<BlockId>,
    selector: Option<Selector>,
}

impl Layout {
    /// Returns a new empty [`Layout`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new empty [`Layout`] whose output is prefixed by the selector.
    pub fn with_selector(selector: Selector) -> Self {
        Self { selector: Some(selector), ..Default::default() }
    }

    /// Returns the selector prefixing the output.
    pub const fn selector(&self) -> Option<Selector> {
        self.selector
    }

    /// Returns the root block.
    pub const fn root(&self) -> Option<BlockId> {
        self.root
    }

    /// Sets the root block.
    pub fn set_root(&mut self, root: BlockId) {
        self.root = Some(root);
    }

    /// Returns the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if the layout holds no block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Adds the block to the arena and returns its handle.
    pub fn push(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.blocks.len());
        tracing::trace!(target: "abi::codec", %id, name = %block.name, signature = %block.signature, "new block");
        self.blocks.push(block);
        id
    }

    /// Returns the block. Handles are only produced by [`Layout::push`], so the block exists
    /// as long as the handle comes from this layout.
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    /// Returns an iterator over the handles of all blocks, in creation order.
    pub fn ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len()).map(BlockId)
    }

    /// Sets the children and the length word of a member block.
    pub(crate) fn set_members(&mut self, id: BlockId, members: Vec<BlockId>, len: Option<usize>) {
        for member in &members {
            self.block_mut(*member).parent = Some(id);
        }
        if let BlockKind::Member { children, header } = &mut self.block_mut(id).kind {
            *children = members;
            *header = len.map(|len| B256::from(U256::from(len)));
        }
    }

    /// Aliases the dependent block `id` to `target`.
    pub(crate) fn set_alias(&mut self, id: BlockId, target: BlockId) {
        if let BlockKind::Dependent { alias, .. } = &mut self.block_mut(id).kind {
            *alias = Some(target);
        }
    }

    /// Returns the offset assigned to the block.
    pub fn offset(&self, id: BlockId) -> Result<usize, LayoutError> {
        self.block(id).offset_or_err()
    }

    /// Returns the bytes the block represents, pointers replaced by the content they point to.
    /// Two blocks with equal signatures and raw bytes encode the same value.
    pub fn raw_bytes(&self, id: BlockId) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_raw_bytes(id, &mut out);
        out
    }

    fn write_raw_bytes(&self, id: BlockId, out: &mut Vec<u8>) {
        match &self.block(id).kind {
            BlockKind::Payload { data, .. } => out.extend_from_slice(data),
            BlockKind::Member { children, header } => {
                if let Some(header) = header {
                    out.extend_from_slice(header.as_slice());
                }
                for child in children {
                    self.write_raw_bytes(*child, out);
                }
            }
            BlockKind::Dependent { destination, .. } => self.write_raw_bytes(*destination, out),
        }
    }

    /// Returns the bytes the block writes to the output. A dependent block writes the offset
    /// of its destination relative to the body of its parent, offsets must be assigned.
    pub fn own_bytes(&self, id: BlockId) -> Result<Cow<'_, [u8]>, LayoutError> {
        let block = self.block(id);
        Ok(match &block.kind {
            BlockKind::Payload { data, .. } => Cow::Borrowed(data.as_slice()),
            BlockKind::Member { header, .. } => {
                Cow::Borrowed(header.as_ref().map(|h| h.as_slice()).unwrap_or_default())
            }
            BlockKind::Dependent { destination, alias } => {
                let destination = self.offset(alias.unwrap_or(*destination))?;
                let parent = self.block(
                    block.parent.ok_or_else(|| LayoutError::MissingParent(block.name.clone()))?,
                );
                let base = parent.offset_or_err()? + parent.header_size();
                let relative = destination
                    .checked_sub(base)
                    .ok_or_else(|| LayoutError::NegativeOffset(block.name.clone()))?;
                Cow::Owned(U256::from(relative).to_be_bytes::<32>().to_vec())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    fn string_payload(s: &str) -> Vec<u8> {
        let mut data = U256::from(s.len()).to_be_bytes::<32>().to_vec();
        data.extend_from_slice(s.as_bytes());
        data.resize(WORD_SIZE + s.len().div_ceil(WORD_SIZE) * WORD_SIZE, 0);
        data
    }

    #[test]
    fn test_should_size_blocks() {
        let hi = Block::payload("hi", "string", string_payload("hi"), WORD_SIZE);
        assert_eq!((hi.header_size(), hi.body_size(), hi.size_in_bytes()), (32, 32, 64));

        let flag = Block::payload("flag", "bool", vec![0; 32], 0);
        assert_eq!(flag.size_in_bytes(), 32);

        let pointer = Block::dependent("hi", "string", BlockId(0));
        assert_eq!((pointer.header_size(), pointer.size_in_bytes()), (0, 32));

        let set = Block::member("set", "(string,bool)");
        assert_eq!(set.size_in_bytes(), 0);
    }

    #[test]
    fn test_should_exclude_pointers_from_raw_bytes() {
        let mut layout = Layout::new();
        let set = layout.push(Block::member("values", "string[]"));
        let destination =
            layout.push(Block::payload("values[0]", "string", string_payload("a"), WORD_SIZE));
        let pointer = layout.push(Block::dependent("values[0]", "string", destination));
        layout.set_members(set, vec![pointer], Some(1));

        assert_eq!(layout.block(pointer).parent, Some(set));
        assert_eq!(layout.raw_bytes(pointer), string_payload("a"));

        let mut expected = hex!("0000000000000000000000000000000000000000000000000000000000000001")
            .to_vec();
        expected.extend(string_payload("a"));
        assert_eq!(layout.raw_bytes(set), expected);
    }

    #[test]
    fn test_should_resolve_pointer_relative_to_parent_body() -> Result<(), LayoutError> {
        let mut layout = Layout::new();
        let set = layout.push(Block::member("values", "string[]"));
        let destination =
            layout.push(Block::payload("values[0]", "string", string_payload("a"), WORD_SIZE));
        let pointer = layout.push(Block::dependent("values[0]", "string", destination));
        layout.set_members(set, vec![pointer], Some(1));

        assert_eq!(layout.own_bytes(pointer), Err(LayoutError::UnassignedOffset("values[0]".into())));

        layout.block_mut(set).offset = Some(0);
        layout.block_mut(pointer).offset = Some(32);
        layout.block_mut(destination).offset = Some(64);

        // the body of the array starts after its length word.
        assert_eq!(
            layout.own_bytes(pointer)?.as_ref(),
            hex!("0000000000000000000000000000000000000000000000000000000000000020")
        );
        assert_eq!(
            layout.own_bytes(set)?.as_ref(),
            hex!("0000000000000000000000000000000000000000000000000000000000000001")
        );

        layout.set_alias(pointer, set);
        assert_eq!(layout.own_bytes(pointer), Err(LayoutError::NegativeOffset("values[0]".into())));

        Ok(())
    }
}
