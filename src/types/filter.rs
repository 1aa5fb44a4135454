//! Filter records for the read-only range queries

use super::flags::{AccountFilterFlags, QueryFilterFlags};
use super::numeric::{Id128, Timestamp, ID_MAX};

/// Selects transfers touching one account
///
/// Zero-valued predicate fields match everything. `timestamp_min` and
/// `timestamp_max` are inclusive; zero means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountFilter {
    pub account_id: Id128,
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,
    pub code: u16,
    pub timestamp_min: Timestamp,
    pub timestamp_max: Timestamp,
    pub limit: u32,
    pub flags: AccountFilterFlags,
}

impl AccountFilter {
    /// Both sides of `account_id`, oldest first, at most `limit` results
    pub fn new(account_id: Id128, limit: u32) -> Self {
        AccountFilter {
            account_id,
            limit,
            flags: AccountFilterFlags::DEBITS | AccountFilterFlags::CREDITS,
            ..Default::default()
        }
    }

    pub fn with_flags(mut self, flags: AccountFilterFlags) -> Self {
        self.flags = flags;
        self
    }

    /// A filter that can never match yields an empty result instead of an error
    pub fn is_valid(&self) -> bool {
        self.account_id != 0
            && self.account_id != ID_MAX
            && self.limit != 0
            && !self.flags.has_reserved_bits()
            && self
                .flags
                .intersects(AccountFilterFlags::DEBITS | AccountFilterFlags::CREDITS)
            && timestamps_ordered(self.timestamp_min, self.timestamp_max)
    }

    pub fn is_reversed(&self) -> bool {
        self.flags.contains(AccountFilterFlags::REVERSED)
    }
}

/// Selects accounts or transfers by their user data, ledger and code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryFilter {
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,
    pub ledger: u32,
    pub code: u16,
    pub timestamp_min: Timestamp,
    pub timestamp_max: Timestamp,
    pub limit: u32,
    pub flags: QueryFilterFlags,
}

impl QueryFilter {
    /// Matches everything, oldest first, at most `limit` results
    pub fn new(limit: u32) -> Self {
        QueryFilter {
            limit,
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.limit != 0
            && !self.flags.has_reserved_bits()
            && timestamps_ordered(self.timestamp_min, self.timestamp_max)
    }

    pub fn is_reversed(&self) -> bool {
        self.flags.contains(QueryFilterFlags::REVERSED)
    }
}

fn timestamps_ordered(min: Timestamp, max: Timestamp) -> bool {
    min == 0 || max == 0 || min <= max
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_account_filter_is_valid() {
        assert!(AccountFilter::new(1, 10).is_valid());
    }

    #[rstest]
    #[case::zero_account(AccountFilter { account_id: 0, ..AccountFilter::new(1, 10) })]
    #[case::max_account(AccountFilter { account_id: ID_MAX, ..AccountFilter::new(1, 10) })]
    #[case::zero_limit(AccountFilter::new(1, 0))]
    #[case::no_side(AccountFilter::new(1, 10).with_flags(AccountFilterFlags::REVERSED))]
    #[case::inverted_range(AccountFilter { timestamp_min: 5, timestamp_max: 4, ..AccountFilter::new(1, 10) })]
    #[case::reserved_bits(AccountFilter::new(1, 10).with_flags(AccountFilterFlags::from_bits_retain(1 << 3 | 1)))]
    fn test_invalid_account_filter(#[case] filter: AccountFilter) {
        assert!(!filter.is_valid());
    }

    #[rstest]
    #[case::open_min(0, 4, true)]
    #[case::open_max(5, 0, true)]
    #[case::single_point(5, 5, true)]
    #[case::inverted(6, 5, false)]
    fn test_query_filter_range(#[case] min: Timestamp, #[case] max: Timestamp, #[case] valid: bool) {
        let filter = QueryFilter {
            timestamp_min: min,
            timestamp_max: max,
            ..QueryFilter::new(1)
        };
        assert_eq!(filter.is_valid(), valid);
    }

    #[test]
    fn test_query_filter_zero_limit() {
        assert!(!QueryFilter::new(0).is_valid());
    }
}
