//! Error types for the cold reward tracker.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("balance would become negative")] NegativeBalance,
    #[error("balance arithmetic overflow")] BalanceOverflow,
    #[error("height {height} is frozen by the checkpoint at {checkpoint}")] HeightBelowCheckpoint { height: u64, checkpoint: u64 },
    #[error("invalid reward height {0}: not a positive multiple of the reward span")] InvalidRewardHeight(u64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("transaction already open")] TransactionAlreadyOpen,
    #[error("no open transaction")] TransactionNotOpen,
    #[error("storage backend: {0}")] Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColdRewardError {
    #[error(transparent)] Tracker(#[from] TrackerError),
    #[error(transparent)] Store(#[from] StoreError),
}
