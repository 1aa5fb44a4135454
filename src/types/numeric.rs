//! Fixed-width numeric domain types
//!
//! Identifiers, amounts and user tags are 128-bit; timestamps are 64-bit
//! nanoseconds. Every value is a plain unsigned integer so arithmetic on it is
//! always explicit about overflow (`checked_*` / `saturating_*`).

/// 128-bit identifier of an account or transfer
///
/// Zero and `u128::MAX` are reserved and never valid ids.
pub type Id128 = u128;

/// 128-bit amount in the smallest unit of the ledger's asset
pub type Amount128 = u128;

/// Nanoseconds since the UNIX epoch, assigned by the engine (or supplied by an
/// importer for `imported` events)
pub type Timestamp = u64;

/// Largest representable id, reserved as invalid
pub const ID_MAX: Id128 = u128::MAX;

/// Sentinel amount meaning "the whole pending amount" when posting
///
/// Outside of posting (and as an upper bound for balancing transfers) it is not a
/// valid literal amount.
pub const AMOUNT_MAX: Amount128 = u128::MAX;

/// Smallest timestamp an event can carry
pub const TIMESTAMP_MIN: Timestamp = 1;

/// Largest timestamp an event can carry (the top bit is reserved)
pub const TIMESTAMP_MAX: Timestamp = (1 << 63) - 1;

/// Nanoseconds per second, used to turn pending timeouts into deadlines
pub const NS_PER_SECOND: u64 = 1_000_000_000;

/// Maximum number of events a collaborator may submit in one batch
pub const BATCH_MAX: usize = 8190;

/// Returns true when `timestamp` lies inside the valid event range
pub fn timestamp_in_range(timestamp: Timestamp) -> bool {
    (TIMESTAMP_MIN..=TIMESTAMP_MAX).contains(&timestamp)
}
