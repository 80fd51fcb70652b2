//! Reward multiplier extraction over a qualification range list.
//!
//! Answers, for a reward height `H`, which multiplier an address earned
//! across the window `(H - REWARD_RANGE_SPAN, H]` given its ordered range
//! list. Pure functions over a snapshot; no persistence access.

use crate::constants::REWARD_RANGE_SPAN;
use crate::error::TrackerError;
use crate::range::BlockHeightRange;

/// Validate that `height` is a positive multiple of [`REWARD_RANGE_SPAN`].
pub(crate) fn ensure_reward_height(height: u64) -> Result<(), TrackerError> {
    if height == 0 || height % REWARD_RANGE_SPAN != 0 {
        return Err(TrackerError::InvalidRewardHeight(height));
    }
    Ok(())
}

/// Walk `ranges` from newest to oldest and collect the multipliers that
/// bound what the address held across the reward window ending at `height`.
///
/// Let `X = height - REWARD_RANGE_SPAN` be the window boundary. For each
/// range, judged by the position of `[start, end]` relative to `X`:
///
/// - `start >= height` or `end >= height`: the range is not yet materialised
///   at this reward height and is skipped.
/// - `start > X`: the range opened strictly inside the window. A zero on
///   either its own multiplier or `prev_multiplier` means the balance dipped
///   below the minimum within the window, which voids qualification
///   outright. Otherwise the smaller of the two bounds the holding across
///   the gap, and the walk continues toward the boundary.
/// - `start <= X` and `end >= X`: the range covers the boundary; its
///   multiplier answers the rest of the window on its own and the walk
///   stops.
/// - `start <= X` and `end < X`: the range lies fully before the window. It
///   contributes its multiplier only when nothing has been collected yet
///   (otherwise its multiplier is already visible as the following range's
///   `prev_multiplier`); the walk stops either way.
///
/// The empty list means "not eligible". The caller's final answer is the
/// minimum of the returned multipliers; see [`reward_multiplier`].
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRewardHeight`] when `height` is not a
/// positive multiple of [`REWARD_RANGE_SPAN`].
pub fn extract_reward_multipliers(
    height: u64,
    ranges: &[BlockHeightRange],
) -> Result<Vec<u32>, TrackerError> {
    ensure_reward_height(height)?;
    let boundary = height - REWARD_RANGE_SPAN;

    let mut contributions = Vec::new();
    for range in ranges.iter().rev() {
        if range.start() >= height || range.end() >= height {
            continue;
        }
        if range.start() > boundary {
            if range.multiplier() == 0 || range.prev_multiplier() == 0 {
                return Ok(Vec::new());
            }
            contributions.push(range.multiplier().min(range.prev_multiplier()));
            continue;
        }
        if range.end() >= boundary || contributions.is_empty() {
            if range.multiplier() == 0 {
                return Ok(Vec::new());
            }
            contributions.push(range.multiplier());
        }
        break;
    }
    Ok(contributions)
}

/// Collapse an extraction result into the single eligibility multiplier:
/// the minimum contribution, or 0 (not eligible) for the empty list.
pub fn reward_multiplier(multipliers: &[u32]) -> u32 {
    multipliers.iter().copied().min().unwrap_or(0)
}
