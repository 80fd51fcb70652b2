//! Reward state storage interface and in-memory implementation.
//!
//! Provides the [`RewardStore`] trait the tracker consumes for per-address
//! balances, qualification range lists, and the persisted checkpoint
//! barrier. The [`MemoryRewardStore`] is suitable for testing; a production
//! node backs the trait with its key/value store and groups writes inside
//! the transaction scope.
//!
//! The store must keep the pair balance/ranges for an address atomic across
//! a transaction; the tracker issues every mutation between
//! [`begin_transaction`](RewardStore::begin_transaction) and
//! [`end_transaction`](RewardStore::end_transaction).

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::range::BlockHeightRange;
use crate::types::Address;

/// Persistence capabilities consumed by the tracker.
///
/// Unknown addresses read as balance 0 with an empty range list. The
/// checkpoint is monotone: [`set_checkpoint`](RewardStore::set_checkpoint)
/// silently ignores values below the one already persisted.
///
/// Not thread-safe by contract -- the tracker is single-writer; readers may
/// run concurrently only if the backing implementation permits.
pub trait RewardStore {
    /// Running balance of an address, 0 if unknown.
    fn balance(&self, address: &Address) -> Result<i64, StoreError>;

    /// Persist the running balance of an address.
    fn set_balance(&mut self, address: &Address, amount: i64) -> Result<(), StoreError>;

    /// Ordered qualification ranges of an address, empty if unknown.
    fn ranges(&self, address: &Address) -> Result<Vec<BlockHeightRange>, StoreError>;

    /// Persist the qualification ranges of an address.
    fn set_ranges(
        &mut self,
        address: &Address,
        ranges: Vec<BlockHeightRange>,
    ) -> Result<(), StoreError>;

    /// The persisted checkpoint barrier, 0 if none was ever recorded.
    fn checkpoint(&self) -> Result<u64, StoreError>;

    /// Raise the persisted checkpoint barrier. Values at or below the
    /// current barrier are ignored.
    fn set_checkpoint(&mut self, height: u64) -> Result<(), StoreError>;

    /// Open a write scope. Nesting is not supported.
    fn begin_transaction(&mut self) -> Result<(), StoreError>;

    /// Close the current write scope, committing its mutations.
    fn end_transaction(&mut self) -> Result<(), StoreError>;

    /// Snapshot of every known address's range list, used by the bulk
    /// eligibility scan. Iteration order must be deterministic.
    fn all_ranges(&self) -> Result<BTreeMap<Address, Vec<BlockHeightRange>>, StoreError>;
}

/// In-memory reward state storage for testing.
///
/// Stores everything in `BTreeMap`s with no persistence. Transactions only
/// enforce correct begin/end pairing; mutations are visible immediately.
#[derive(Clone, Debug, Default)]
pub struct MemoryRewardStore {
    balances: BTreeMap<Address, i64>,
    ranges: BTreeMap<Address, Vec<BlockHeightRange>>,
    checkpoint: u64,
    transaction_open: bool,
}

impl MemoryRewardStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a write scope is currently open.
    pub fn transaction_open(&self) -> bool {
        self.transaction_open
    }

    /// Number of addresses with a persisted range entry (possibly empty).
    pub fn tracked_addresses(&self) -> usize {
        self.ranges.len()
    }
}

impl RewardStore for MemoryRewardStore {
    fn balance(&self, address: &Address) -> Result<i64, StoreError> {
        Ok(self.balances.get(address).copied().unwrap_or(0))
    }

    fn set_balance(&mut self, address: &Address, amount: i64) -> Result<(), StoreError> {
        self.balances.insert(address.clone(), amount);
        Ok(())
    }

    fn ranges(&self, address: &Address) -> Result<Vec<BlockHeightRange>, StoreError> {
        Ok(self.ranges.get(address).cloned().unwrap_or_default())
    }

    fn set_ranges(
        &mut self,
        address: &Address,
        ranges: Vec<BlockHeightRange>,
    ) -> Result<(), StoreError> {
        self.ranges.insert(address.clone(), ranges);
        Ok(())
    }

    fn checkpoint(&self) -> Result<u64, StoreError> {
        Ok(self.checkpoint)
    }

    fn set_checkpoint(&mut self, height: u64) -> Result<(), StoreError> {
        if height > self.checkpoint {
            self.checkpoint = height;
        }
        Ok(())
    }

    fn begin_transaction(&mut self) -> Result<(), StoreError> {
        if self.transaction_open {
            return Err(StoreError::TransactionAlreadyOpen);
        }
        self.transaction_open = true;
        Ok(())
    }

    fn end_transaction(&mut self) -> Result<(), StoreError> {
        if !self.transaction_open {
            return Err(StoreError::TransactionNotOpen);
        }
        self.transaction_open = false;
        Ok(())
    }

    fn all_ranges(&self) -> Result<BTreeMap<Address, Vec<BlockHeightRange>>, StoreError> {
        Ok(self.ranges.clone())
    }
}
