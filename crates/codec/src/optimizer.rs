//! Shrinks the encoding by pointing identical dynamic values to a single copy.
//!
//! The output stays decodable by any ABI decoder, which only follows offsets, but is no longer
//! the canonical encoding.

use crate::{
    error::LayoutError,
    layout::{BlockId, BlockKind, Layout},
    linearizer,
};
use alloy_primitives::{keccak256, B256};
use std::collections::HashMap;

/// Aliases every pointer whose content is identical to a block laid out after it.
///
/// Blocks are visited from the end of the linearized order. The expansion of a subtree is
/// contiguous and a pointer is visited before its own destination and after the blocks laid
/// out after its destination, so the aliased target always sits after the pointer's parent
/// and outside of the content that is dropped.
pub fn optimize(layout: &mut Layout) -> Result<(), LayoutError> {
    let order = linearizer::linearize(layout)?;
    let mut seen: HashMap<B256, BlockId> = HashMap::new();
    let mut aliased = 0usize;

    for id in order.iter().rev() {
        let block = layout.block(*id);
        match block.kind {
            BlockKind::Dependent { destination, alias: None } => {
                let hash = content_hash(layout, destination);
                if let Some(target) = seen.get(&hash).copied().filter(|target| *target != destination) {
                    tracing::trace!(target: "abi::optimizer", name = %block.name, %target, "aliased pointer");
                    layout.set_alias(*id, target);
                    aliased += 1;
                }
            }
            BlockKind::Dependent { .. } => {}
            _ => {
                seen.entry(content_hash(layout, *id)).or_insert(*id);
            }
        }
    }

    tracing::debug!(target: "abi::optimizer", blocks = order.len(), aliased, "optimized layout");
    Ok(())
}

/// Hashes the type and the content of the block.
fn content_hash(layout: &Layout, id: BlockId) -> B256 {
    let block = layout.block(id);
    let mut preimage = block.signature.as_bytes().to_vec();
    preimage.extend(layout.raw_bytes(id));
    keccak256(preimage)
}
