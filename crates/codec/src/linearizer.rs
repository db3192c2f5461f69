//! Flattens a [`Layout`] into the head/tail order of the ABI encoding.

use crate::{
    error::LayoutError,
    layout::{BlockId, BlockKind, Layout},
};
use abi_primitives::{SELECTOR_SIZE, WORD_SIZE};
use alloy_primitives::{hex, Bytes};
use std::{collections::VecDeque, fmt::Write};

/// Returns the blocks of the layout in output order.
pub fn linearize(layout: &Layout) -> Result<VecDeque<BlockId>, LayoutError> {
    let root = layout.root().ok_or(LayoutError::MissingRoot)?;
    Ok(expand(layout, root))
}

/// Expands the block: the members of a set are laid out in place, followed by the content
/// of its pointers, in member order.
fn expand(layout: &Layout, id: BlockId) -> VecDeque<BlockId> {
    let BlockKind::Member { children, .. } = &layout.block(id).kind else {
        return VecDeque::from([id])
    };

    let mut order = VecDeque::new();
    for child in children.iter().rev() {
        let mut expanded = expand(layout, *child);
        while let Some(block) = expanded.pop_back() {
            order.push_front(block);
        }
    }
    for child in children {
        // an aliased pointer reuses content laid out elsewhere.
        if let BlockKind::Dependent { destination, alias: None } = &layout.block(*child).kind {
            order.extend(expand(layout, *destination));
        }
    }
    order.push_front(id);
    order
}

/// Assigns an offset to every block in `order` and returns the size of the output, selector
/// excluded.
pub fn assign_offsets(layout: &mut Layout, order: &VecDeque<BlockId>) -> usize {
    let mut offset = 0;
    for id in order {
        let block = layout.block_mut(*id);
        block.offset = Some(offset);
        offset += block.size_in_bytes();
    }
    tracing::trace!(target: "abi::linearizer", blocks = order.len(), size = offset, "assigned offsets");
    offset
}

/// Returns the output bytes, prefixed by the selector of the layout if any. Offsets must be
/// assigned.
pub fn to_bytes(layout: &Layout, order: &VecDeque<BlockId>) -> Result<Bytes, LayoutError> {
    let mut out = Vec::with_capacity(SELECTOR_SIZE + order.len() * WORD_SIZE);
    if let Some(selector) = layout.selector() {
        out.extend_from_slice(selector.as_slice());
    }
    for id in order {
        out.extend_from_slice(&layout.own_bytes(*id)?);
    }
    Ok(out.into())
}

/// Returns a human readable dump of the output, one word per line:
///
/// ```text
/// 0x0000 0000000000000000000000000000000000000000000000000000000000000040 greet.message
/// ```
pub fn annotate(layout: &Layout, order: &VecDeque<BlockId>) -> Result<String, LayoutError> {
    let mut out = String::new();
    if let Some(selector) = layout.selector() {
        let _ = writeln!(out, "selector {}", hex::encode(selector));
    }
    for id in order {
        let block = layout.block(*id);
        let offset = layout.offset(*id)?;
        for (i, word) in layout.own_bytes(*id)?.chunks(WORD_SIZE).enumerate() {
            let name = match (&block.kind, i) {
                (BlockKind::Dependent { .. }, _) => format!("{} (offset)", block.name),
                (_, 0) if block.header_size() > 0 => format!("{} (length)", block.name),
                _ => block.name.clone(),
            };
            let _ = writeln!(out, "{:#06x} {} {name}", offset + i * WORD_SIZE, hex::encode(word));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Block;
    use alloy_primitives::{bytes, U256};

    fn word(value: u64) -> Vec<u8> {
        U256::from(value).to_be_bytes::<32>().to_vec()
    }

    /// `(string,bool)` holding `("hi", true)`.
    fn greeting() -> Layout {
        let mut layout = Layout::new();
        let set = layout.push(Block::member("greet", "(string,bool)"));
        let mut data = word(2);
        data.extend_from_slice(b"hi");
        data.resize(64, 0);
        let message = layout.push(Block::payload("greet.message", "string", data, WORD_SIZE));
        let pointer = layout.push(Block::dependent("greet.message", "string", message));
        layout.block_mut(message).parent = Some(pointer);
        let flag = layout.push(Block::payload("greet.flag", "bool", word(1), 0));
        layout.set_members(set, vec![pointer, flag], None);
        layout.set_root(set);
        layout
    }

    #[test]
    fn test_should_place_heads_before_tails() -> Result<(), LayoutError> {
        let mut layout = greeting();
        let order = linearize(&layout)?;
        let names: Vec<_> = order
            .iter()
            .map(|id| (layout.block(*id).name.as_str(), layout.block(*id).is_dependent()))
            .collect();
        assert_eq!(
            names,
            [
                ("greet", false),
                ("greet.message", true),
                ("greet.flag", false),
                ("greet.message", false)
            ]
        );

        assert_eq!(assign_offsets(&mut layout, &order), 128);
        assert_eq!(
            to_bytes(&layout, &order)?,
            bytes!(
                "0000000000000000000000000000000000000000000000000000000000000040"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000002"
                "6869000000000000000000000000000000000000000000000000000000000000"
            )
        );

        Ok(())
    }

    #[test]
    fn test_should_annotate_words() -> Result<(), LayoutError> {
        let mut layout = greeting();
        let order = linearize(&layout)?;
        assign_offsets(&mut layout, &order);

        let dump = annotate(&layout, &order)?;
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("0x0000 "));
        assert!(lines[0].ends_with("greet.message (offset)"));
        assert!(lines[2].starts_with("0x0040 "));
        assert!(lines[2].ends_with("greet.message (length)"));
        assert!(lines[3].ends_with(" greet.message"));

        Ok(())
    }

    #[test]
    fn test_should_fail_without_root() {
        assert_eq!(linearize(&Layout::new()), Err(LayoutError::MissingRoot));
    }
}
