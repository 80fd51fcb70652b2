//! Protocol constants. All monetary values in base units (1 coin = 10^8 base units).

/// Base units per coin.
pub const COIN: i64 = 100_000_000;

/// Minimum balance an address must hold continuously to accrue cold-staking
/// reward exposure: 20,000 coins.
///
/// The balance weight `balance / MINIMUM_REWARD_BALANCE` is the reward
/// multiplier an address earns while it stays at or above this minimum.
pub const MINIMUM_REWARD_BALANCE: i64 = 20_000 * COIN;

/// Length of one reward window in blocks (about one month at the target
/// block cadence). Eligibility at a reward height `H` is judged over the
/// window `(H - REWARD_RANGE_SPAN, H]`; valid reward heights are positive
/// multiples of this span.
pub const REWARD_RANGE_SPAN: u64 = 21_600;
