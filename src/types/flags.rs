//! Bit-flag sets for accounts, transfers and query filters
//!
//! Flags are stored with [`from_bits_retain`](AccountFlags::from_bits_retain) so
//! that unknown bits survive deserialization and can be rejected by the
//! validator as `reserved_flag` instead of being silently dropped.

use bitflags::{bitflags, Flags};

bitflags! {
    /// Account behaviour flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccountFlags: u16 {
        /// The next event in the batch belongs to the same chain
        const LINKED = 1 << 0;
        /// `debits_pending + debits_posted` may never exceed `credits_posted`
        const DEBITS_MUST_NOT_EXCEED_CREDITS = 1 << 1;
        /// `credits_pending + credits_posted` may never exceed `debits_posted`
        const CREDITS_MUST_NOT_EXCEED_DEBITS = 1 << 2;
        /// Keep a balance snapshot for every transfer touching the account
        const HISTORY = 1 << 3;
        /// The caller supplies the timestamp
        const IMPORTED = 1 << 4;
        /// No further transfers may touch the account
        const CLOSED = 1 << 5;
    }
}

bitflags! {
    /// Transfer behaviour flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TransferFlags: u16 {
        /// The next event in the batch belongs to the same chain
        const LINKED = 1 << 0;
        /// Reserve the amount until it is posted, voided or expires
        const PENDING = 1 << 1;
        /// Post the pending transfer referenced by `pending_id`
        const POST_PENDING_TRANSFER = 1 << 2;
        /// Void the pending transfer referenced by `pending_id`
        const VOID_PENDING_TRANSFER = 1 << 3;
        /// Clamp the amount to the debit account's headroom
        const BALANCING_DEBIT = 1 << 4;
        /// Clamp the amount to the credit account's headroom
        const BALANCING_CREDIT = 1 << 5;
        /// Close the debit account once the transfer succeeds
        const CLOSING_DEBIT = 1 << 6;
        /// Close the credit account once the transfer succeeds
        const CLOSING_CREDIT = 1 << 7;
        /// The caller supplies the timestamp
        const IMPORTED = 1 << 8;
    }
}

bitflags! {
    /// Flags of an [`AccountFilter`](crate::types::AccountFilter)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccountFilterFlags: u32 {
        /// Include transfers where the account is debited
        const DEBITS = 1 << 0;
        /// Include transfers where the account is credited
        const CREDITS = 1 << 1;
        /// Newest first
        const REVERSED = 1 << 2;
    }
}

bitflags! {
    /// Flags of a [`QueryFilter`](crate::types::QueryFilter)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct QueryFilterFlags: u32 {
        /// Newest first
        const REVERSED = 1 << 0;
    }
}

impl AccountFlags {
    /// True when bits outside the known set are present
    pub fn has_reserved_bits(&self) -> bool {
        self.bits() & !Self::all().bits() != 0
    }
}

impl TransferFlags {
    /// True when bits outside the known set are present
    pub fn has_reserved_bits(&self) -> bool {
        self.bits() & !Self::all().bits() != 0
    }

    /// True for the second phase of a two-phase transfer
    pub fn is_post_or_void(&self) -> bool {
        self.intersects(Self::POST_PENDING_TRANSFER | Self::VOID_PENDING_TRANSFER)
    }

    /// True when either balancing flag is set
    pub fn is_balancing(&self) -> bool {
        self.intersects(Self::BALANCING_DEBIT | Self::BALANCING_CREDIT)
    }

    /// True when either closing flag is set
    pub fn is_closing(&self) -> bool {
        self.intersects(Self::CLOSING_DEBIT | Self::CLOSING_CREDIT)
    }
}

impl AccountFilterFlags {
    /// True when bits outside the known set are present
    pub fn has_reserved_bits(&self) -> bool {
        self.bits() & !Self::all().bits() != 0
    }
}

impl QueryFilterFlags {
    /// True when bits outside the known set are present
    pub fn has_reserved_bits(&self) -> bool {
        self.bits() & !Self::all().bits() != 0
    }
}

/// Render a flag set as lowercase names joined by `|` (empty for no flags)
pub fn flag_names<F: Flags>(flags: &F) -> String {
    flags
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("|")
}

/// Parse `|`-separated flag names (case-insensitive, blank means no flags)
pub fn parse_flag_names<F: Flags>(input: &str) -> Result<F, String> {
    let mut flags = F::empty();
    for name in input.split('|').map(str::trim).filter(|n| !n.is_empty()) {
        let flag = F::from_name(&name.to_ascii_uppercase())
            .ok_or_else(|| format!("unknown flag '{}'", name))?;
        flags.insert(flag);
    }
    Ok(flags)
}
