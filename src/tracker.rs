//! Cold reward tracking engine.
//!
//! Maintains, per address, the exact running balance and the compact list of
//! qualification ranges recording when the balance stayed at or above
//! [`MINIMUM_REWARD_BALANCE`](crate::constants::MINIMUM_REWARD_BALANCE).
//! Balance deltas arrive tagged with block heights: [`apply`] appends state
//! during normal chain growth, [`rollback`] reverses it during
//! reorganizations, and [`eligible_addresses`] answers which addresses earn
//! the periodic reward at a given height and at what multiplier.
//!
//! The tracker is single-writer and owns no storage: all state lives behind
//! an injected [`RewardStore`]. Every mutation must run inside a
//! [`with_transaction`] scope so an on-disk backend can group its writes
//! atomically. A failed precondition leaves the store untouched.
//!
//! [`apply`]: ColdRewardTracker::apply
//! [`rollback`]: ColdRewardTracker::rollback
//! [`eligible_addresses`]: ColdRewardTracker::eligible_addresses
//! [`with_transaction`]: ColdRewardTracker::with_transaction

use tracing::{debug, trace};

use crate::checkpoint::{last_checkpoint_at, CheckpointMap};
use crate::constants::MINIMUM_REWARD_BALANCE;
use crate::error::{ColdRewardError, TrackerError};
use crate::multiplier::{ensure_reward_height, extract_reward_multipliers, reward_multiplier};
use crate::range::BlockHeightRange;
use crate::store::RewardStore;
use crate::types::Address;

/// Deterministic append/rollback index over per-address reward state.
pub struct ColdRewardTracker<S: RewardStore> {
    store: S,
}

impl<S: RewardStore> ColdRewardTracker<S> {
    /// Create a tracker over the given persistence collaborator.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the tracker, returning the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Run `f` inside a storage write scope.
    ///
    /// The scope is closed whether `f` succeeds or fails, so precondition
    /// failures inside never leave a transaction dangling. Nesting is not
    /// supported; the store rejects it.
    pub fn with_transaction<T, F>(&mut self, f: F) -> Result<T, ColdRewardError>
    where
        F: FnOnce(&mut Self) -> Result<T, ColdRewardError>,
    {
        self.store.begin_transaction()?;
        let result = f(self);
        self.store.end_transaction()?;
        result
    }

    /// Record a balance delta for `address` at `height`.
    ///
    /// Classifies the transition of the balance against the qualification
    /// minimum and updates the range list accordingly: opens a range when
    /// the minimum is reached, extends the final range while the balance
    /// weight is unchanged, starts a new range when the weight changes, and
    /// appends a zero-multiplier marker when the balance drops below the
    /// minimum. Before the transition, ranges left entirely at or below the
    /// newest checkpoint are swept once the address is no longer
    /// mid-qualification.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::HeightBelowCheckpoint`] if `height` is at or below
    ///   the last checkpoint in `checkpoints`
    /// - [`TrackerError::NegativeBalance`] if the delta would drive the
    ///   balance negative
    /// - [`TrackerError::BalanceOverflow`] on `i64` overflow
    ///
    /// On error, no store write has happened.
    pub fn apply(
        &mut self,
        height: u64,
        address: &Address,
        delta: i64,
        checkpoints: &CheckpointMap,
    ) -> Result<(), ColdRewardError> {
        let last_checkpoint = last_checkpoint_at(checkpoints, height);
        match last_checkpoint {
            Some(checkpoint) if height <= checkpoint => {
                return Err(TrackerError::HeightBelowCheckpoint { height, checkpoint }.into());
            }
            None => {
                // Every checkpoint lies above this height: the whole region
                // below the earliest checkpoint is frozen.
                if let Some((&checkpoint, _)) = checkpoints.iter().next() {
                    return Err(TrackerError::HeightBelowCheckpoint { height, checkpoint }.into());
                }
            }
            _ => {}
        }

        let balance = self.store.balance(address)?;
        let new_balance = balance
            .checked_add(delta)
            .ok_or(TrackerError::BalanceOverflow)?;
        if new_balance < 0 {
            return Err(TrackerError::NegativeBalance.into());
        }

        let mut ranges = self.store.ranges(address)?;
        let mut changed = false;
        if let Some(checkpoint) = last_checkpoint {
            self.store.set_checkpoint(checkpoint)?;
            if Self::purgeable(&ranges, checkpoint) {
                trace!(checkpoint, "sweeping ranges frozen below checkpoint");
                ranges.clear();
                changed = true;
            }
        }

        let weight = (new_balance / MINIMUM_REWARD_BALANCE) as u32;
        let last_multiplier = ranges.last().map_or(0, |r| r.multiplier());
        if weight > 0 {
            if last_multiplier != weight {
                debug!(height, weight, "qualification range opened");
                ranges.push(BlockHeightRange::new(height, height, weight, last_multiplier));
                changed = true;
            } else if let Some(last) = ranges.last_mut() {
                if last.end() < height {
                    last.extend_to(height);
                    changed = true;
                }
            }
        } else if balance >= MINIMUM_REWARD_BALANCE {
            debug!(height, "balance fell below minimum, qualification closed");
            ranges.push(BlockHeightRange::new(height, height, 0, last_multiplier));
            changed = true;
        }

        self.store.set_balance(address, new_balance)?;
        if changed {
            self.store.set_ranges(address, ranges)?;
        }
        Ok(())
    }

    /// Reverse a previously applied delta for `address` at `height`.
    ///
    /// Subtracts the delta from the balance. When the final range ends
    /// exactly at `height`, the range is popped (zero width) or its end is
    /// pulled back one block -- the previous block remains qualifying. A
    /// final range ending elsewhere is left alone: rolling back a height the
    /// list never recorded adjusts the balance only. Multipliers are never
    /// recomputed on rollback.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::HeightBelowCheckpoint`] if `height` is at or below
    ///   the persisted checkpoint barrier
    /// - [`TrackerError::NegativeBalance`] / [`TrackerError::BalanceOverflow`]
    ///   as for [`apply`](Self::apply)
    pub fn rollback(
        &mut self,
        height: u64,
        address: &Address,
        delta: i64,
    ) -> Result<(), ColdRewardError> {
        let checkpoint = self.store.checkpoint()?;
        if height <= checkpoint {
            return Err(TrackerError::HeightBelowCheckpoint { height, checkpoint }.into());
        }

        let balance = self.store.balance(address)?;
        let new_balance = balance
            .checked_sub(delta)
            .ok_or(TrackerError::BalanceOverflow)?;
        if new_balance < 0 {
            return Err(TrackerError::NegativeBalance.into());
        }

        let mut ranges = self.store.ranges(address)?;
        let mut changed = false;
        if let Some(last) = ranges.last().copied() {
            if last.end() == height {
                if last.start() == height {
                    ranges.pop();
                } else if let Some(last) = ranges.last_mut() {
                    last.trim_end();
                }
                trace!(height, "qualification range rolled back");
                changed = true;
            }
        }

        self.store.set_balance(address, new_balance)?;
        if changed {
            self.store.set_ranges(address, ranges)?;
        }
        Ok(())
    }

    /// All addresses eligible for the reward at `reward_height`, paired with
    /// their multiplier.
    ///
    /// Pure over a snapshot of the store: two calls without an intervening
    /// mutation return equal results, in the store's deterministic address
    /// order. The empty answer means no one qualifies and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRewardHeight`] when `reward_height` is
    /// not a positive multiple of the reward span.
    pub fn eligible_addresses(
        &self,
        reward_height: u64,
    ) -> Result<Vec<(Address, u32)>, ColdRewardError> {
        ensure_reward_height(reward_height)?;

        let all = self.store.all_ranges()?;
        let mut eligible = Vec::new();
        for (address, ranges) in all {
            let multipliers = extract_reward_multipliers(reward_height, &ranges)?;
            let multiplier = reward_multiplier(&multipliers);
            if multiplier > 0 {
                eligible.push((address, multiplier));
            }
        }
        Ok(eligible)
    }

    /// A range list can be swept once every entry ends at or below the
    /// checkpoint barrier and the final entry is a sub-threshold marker. An
    /// open qualification (non-zero final multiplier) is kept even when it
    /// ends below the barrier: its start is still needed to answer future
    /// reward windows.
    fn purgeable(ranges: &[BlockHeightRange], checkpoint: u64) -> bool {
        match ranges.last() {
            Some(last) => {
                last.multiplier() == 0 && ranges.iter().all(|r| r.end() <= checkpoint)
            }
            None => false,
        }
    }
}
