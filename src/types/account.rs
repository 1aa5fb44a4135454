//! Account-related types for the ledger engine
//!
//! This module defines the Account record, its balance snapshot and the
//! primitive balance mutation used when a transfer is applied.

use super::flags::AccountFlags;
use super::numeric::{Amount128, Id128, Timestamp};
use super::result::CreateTransferResult;

/// Ledger account
///
/// `id`, `ledger` and `code` are immutable once created. The four balance
/// fields are only ever changed by transfers; callers must submit them as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Account {
    /// Unique, nonzero identifier
    pub id: Id128,

    /// Sum of pending (reserved) debits
    pub debits_pending: Amount128,

    /// Sum of posted debits
    pub debits_posted: Amount128,

    /// Sum of pending (reserved) credits
    pub credits_pending: Amount128,

    /// Sum of posted credits
    pub credits_posted: Amount128,

    /// Opaque caller data
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,

    /// Must be zero
    pub reserved: u32,

    /// Partition (asset or book) the account belongs to
    pub ledger: u32,

    /// Caller-defined account category
    pub code: u16,

    pub flags: AccountFlags,

    /// Assigned on creation; caller-supplied only when `imported`
    pub timestamp: Timestamp,
}

impl Account {
    /// Create an account input with zero balances and no flags
    pub fn new(id: Id128, ledger: u32, code: u16) -> Self {
        Account {
            id,
            ledger,
            code,
            ..Default::default()
        }
    }

    /// Builder-style flag setter used by callers assembling batches
    pub fn with_flags(mut self, flags: AccountFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Would debiting `amount` more break `debits_must_not_exceed_credits`?
    pub fn debits_exceed_credits(&self, amount: Amount128) -> bool {
        self.flags
            .contains(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS)
            && self
                .debits_pending
                .checked_add(self.debits_posted)
                .and_then(|debits| debits.checked_add(amount))
                .is_none_or(|debits| debits > self.credits_posted)
    }

    /// Would crediting `amount` more break `credits_must_not_exceed_debits`?
    pub fn credits_exceed_debits(&self, amount: Amount128) -> bool {
        self.flags
            .contains(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS)
            && self
                .credits_pending
                .checked_add(self.credits_posted)
                .and_then(|credits| credits.checked_add(amount))
                .is_none_or(|credits| credits > self.debits_posted)
    }

    /// Headroom left before `debits_must_not_exceed_credits` would trip
    pub fn debit_headroom(&self) -> Amount128 {
        self.credits_posted
            .saturating_sub(self.debits_pending.saturating_add(self.debits_posted))
    }

    /// Headroom left before `credits_must_not_exceed_debits` would trip
    pub fn credit_headroom(&self) -> Amount128 {
        self.debits_posted
            .saturating_sub(self.credits_pending.saturating_add(self.credits_posted))
    }

    pub fn is_closed(&self) -> bool {
        self.flags.contains(AccountFlags::CLOSED)
    }

    /// Snapshot of the balances, stamped with the causing transfer's timestamp
    pub fn balance(&self, timestamp: Timestamp) -> AccountBalance {
        AccountBalance {
            debits_pending: self.debits_pending,
            debits_posted: self.debits_posted,
            credits_pending: self.credits_pending,
            credits_posted: self.credits_posted,
            timestamp,
        }
    }

    /// Apply one balance mutation and re-check the account's invariants
    ///
    /// Returns the overflow or exceeds code on violation. The account may have
    /// been partially mutated when an error is returned; callers apply effects
    /// to staged copies that are discarded on failure.
    pub fn apply_effect(&mut self, effect: BalanceEffect) -> Result<(), CreateTransferResult> {
        use CreateTransferResult as R;

        let (field, overflow) = match (effect.side, effect.phase) {
            (Side::Debit, Phase::Pending) => (&mut self.debits_pending, R::OverflowsDebitsPending),
            (Side::Debit, Phase::Posted) => (&mut self.debits_posted, R::OverflowsDebitsPosted),
            (Side::Credit, Phase::Pending) => {
                (&mut self.credits_pending, R::OverflowsCreditsPending)
            }
            (Side::Credit, Phase::Posted) => (&mut self.credits_posted, R::OverflowsCreditsPosted),
        };

        match effect.delta {
            Delta::Increase(amount) => *field = field.checked_add(amount).ok_or(overflow)?,
            Delta::Decrease(amount) => {
                debug_assert!(*field >= amount, "balance underflow on {:?}", effect);
                *field = field.saturating_sub(amount);
            }
        }

        if self.debits_pending.checked_add(self.debits_posted).is_none() {
            return Err(R::OverflowsDebits);
        }
        if self.credits_pending.checked_add(self.credits_posted).is_none() {
            return Err(R::OverflowsCredits);
        }
        if self.debits_exceed_credits(0) {
            return Err(R::ExceedsCredits);
        }
        if self.credits_exceed_debits(0) {
            return Err(R::ExceedsDebits);
        }
        Ok(())
    }
}

/// Point-in-time balances of an account with `history` enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountBalance {
    pub debits_pending: Amount128,
    pub debits_posted: Amount128,
    pub credits_pending: Amount128,
    pub credits_posted: Amount128,

    /// Timestamp of the transfer that produced this snapshot
    pub timestamp: Timestamp,
}

/// Which side of the account a mutation touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Debit,
    Credit,
}

/// Reserved or final balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Posted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    Increase(Amount128),
    Decrease(Amount128),
}

/// A single balance mutation produced by a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceEffect {
    pub side: Side,
    pub phase: Phase,
    pub delta: Delta,
}

impl BalanceEffect {
    pub fn debit(phase: Phase, delta: Delta) -> Self {
        BalanceEffect {
            side: Side::Debit,
            phase,
            delta,
        }
    }

    pub fn credit(phase: Phase, delta: Delta) -> Self {
        BalanceEffect {
            side: Side::Credit,
            phase,
            delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn funded(flags: AccountFlags) -> Account {
        Account {
            credits_posted: 100,
            debits_posted: 40,
            ..Account::new(1, 1, 1).with_flags(flags)
        }
    }

    #[test]
    fn test_new_account_has_zero_balances() {
        let account = Account::new(7, 2, 3);
        assert_eq!(account.id, 7);
        assert_eq!(account.ledger, 2);
        assert_eq!(account.code, 3);
        assert_eq!(account.debits_pending, 0);
        assert_eq!(account.credits_posted, 0);
        assert!(account.flags.is_empty());
        assert_eq!(account.timestamp, 0);
    }

    #[rstest]
    #[case::within(10, false)]
    #[case::exact(60, false)]
    #[case::over(61, true)]
    fn test_debits_exceed_credits(#[case] amount: Amount128, #[case] expected: bool) {
        let account = funded(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS);
        assert_eq!(account.debits_exceed_credits(amount), expected);
    }

    #[test]
    fn test_exceed_checks_ignore_unflagged_accounts() {
        let account = funded(AccountFlags::empty());
        assert!(!account.debits_exceed_credits(u128::MAX));
        assert!(!account.credits_exceed_debits(u128::MAX));
    }

    #[test]
    fn test_headroom() {
        let account = funded(AccountFlags::empty());
        assert_eq!(account.debit_headroom(), 60);
        assert_eq!(account.credit_headroom(), 0);
    }

    #[test]
    fn test_apply_effect_increase_and_decrease() {
        let mut account = Account::new(1, 1, 1);
        account
            .apply_effect(BalanceEffect::debit(Phase::Pending, Delta::Increase(10)))
            .unwrap();
        account
            .apply_effect(BalanceEffect::debit(Phase::Pending, Delta::Decrease(10)))
            .unwrap();
        account
            .apply_effect(BalanceEffect::debit(Phase::Posted, Delta::Increase(10)))
            .unwrap();
        assert_eq!(account.debits_pending, 0);
        assert_eq!(account.debits_posted, 10);
    }

    #[rstest]
    #[case::field(Phase::Posted, u128::MAX, 1, CreateTransferResult::OverflowsCreditsPosted)]
    #[case::total(Phase::Pending, 0, u128::MAX, CreateTransferResult::OverflowsCredits)]
    fn test_apply_effect_overflow(
        #[case] phase: Phase,
        #[case] posted: Amount128,
        #[case] amount: Amount128,
        #[case] expected: CreateTransferResult,
    ) {
        let mut account = Account {
            credits_posted: posted.max(1),
            ..Account::new(1, 1, 1)
        };
        let result = account.apply_effect(BalanceEffect::credit(phase, Delta::Increase(amount)));
        assert_eq!(result, Err(expected));
    }

    #[test]
    fn test_apply_effect_enforces_exceed_flags() {
        let mut account = funded(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS);
        let result = account.apply_effect(BalanceEffect::debit(Phase::Posted, Delta::Increase(61)));
        assert_eq!(result, Err(CreateTransferResult::ExceedsCredits));

        let mut account = Account::new(1, 1, 1).with_flags(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS);
        let result =
            account.apply_effect(BalanceEffect::credit(Phase::Pending, Delta::Increase(1)));
        assert_eq!(result, Err(CreateTransferResult::ExceedsDebits));
    }
}
