//! Checkpoint height lookups.
//!
//! Checkpoints pin known-good blocks: mutations at or below the most recent
//! checkpoint are rejected, and qualification history that ends below it can
//! be swept once the address is no longer mid-qualification. The tracker
//! receives the checkpoint set per mutation and consults only the heights;
//! the 256-bit tags are opaque.

use std::collections::BTreeMap;

use crate::types::Hash256;

/// Ordered map from checkpoint height to the opaque tag of the block pinned
/// there.
pub type CheckpointMap = BTreeMap<u64, Hash256>;

/// The greatest checkpoint height at or below `height`, or `None` if every
/// checkpoint lies above it.
///
/// O(log n) on the ordered map.
pub fn last_checkpoint_at(checkpoints: &CheckpointMap, height: u64) -> Option<u64> {
    checkpoints.range(..=height).next_back().map(|(h, _)| *h)
}
