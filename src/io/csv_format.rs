//! CSV format handling for ledger events and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to accounts and transfers
//! - Account output serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input format
//!
//! ```text
//! kind,id,debit_account_id,credit_account_id,amount,pending_id,user_data_128,user_data_64,user_data_32,timeout,ledger,code,flags,timestamp
//! account,1,,,,,,,,,700,10,history,
//! transfer,100,1,2,250,,,,,,700,1,linked,
//! transfer,101,1,2,max,,,,,,700,1,balancing_debit,
//! ```
//!
//! Empty fields are zero. `flags` holds `|`-separated lowercase flag names and
//! `amount` accepts `max` for the all-ones amount.

use std::io::Write;
use std::str::FromStr;

use serde::Deserialize;

use crate::types::flags::{flag_names, parse_flag_names};
use crate::types::{Account, AccountFlags, LedgerError, Transfer, TransferFlags, AMOUNT_MAX};

/// CSV record structure for deserialization
///
/// Every column but `kind` and `id` is optional; account rows leave the
/// transfer-only columns empty.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvRecord {
    pub kind: String,
    pub id: String,
    pub debit_account_id: Option<String>,
    pub credit_account_id: Option<String>,
    pub amount: Option<String>,
    pub pending_id: Option<String>,
    pub user_data_128: Option<String>,
    pub user_data_64: Option<String>,
    pub user_data_32: Option<String>,
    pub timeout: Option<String>,
    pub ledger: Option<String>,
    pub code: Option<String>,
    pub flags: Option<String>,
    pub timestamp: Option<String>,
}

/// One parsed input row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRecord {
    Account(Account),
    Transfer(Transfer),
}

impl EventRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            EventRecord::Account(_) => "account",
            EventRecord::Transfer(_) => "transfer",
        }
    }

    pub fn is_linked(&self) -> bool {
        match self {
            EventRecord::Account(account) => account.flags.contains(AccountFlags::LINKED),
            EventRecord::Transfer(transfer) => transfer.flags.contains(TransferFlags::LINKED),
        }
    }
}

/// Convert a CsvRecord to an account or transfer
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Returns
///
/// Result containing either:
/// - Ok(EventRecord) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<EventRecord, String> {
    let id = parse_required::<u128>("id", &csv_record.id)?;

    match csv_record.kind.to_ascii_lowercase().as_str() {
        "account" => {
            for (name, value) in [
                ("debit_account_id", &csv_record.debit_account_id),
                ("credit_account_id", &csv_record.credit_account_id),
                ("amount", &csv_record.amount),
                ("pending_id", &csv_record.pending_id),
                ("timeout", &csv_record.timeout),
            ] {
                if present(value).is_some() {
                    return Err(format!("account {} must not set '{}'", id, name));
                }
            }

            Ok(EventRecord::Account(Account {
                id,
                user_data_128: parse_optional("user_data_128", &csv_record.user_data_128)?,
                user_data_64: parse_optional("user_data_64", &csv_record.user_data_64)?,
                user_data_32: parse_optional("user_data_32", &csv_record.user_data_32)?,
                ledger: parse_optional("ledger", &csv_record.ledger)?,
                code: parse_optional("code", &csv_record.code)?,
                flags: parse_flags(&csv_record.flags)?,
                timestamp: parse_optional("timestamp", &csv_record.timestamp)?,
                ..Account::default()
            }))
        }
        "transfer" => {
            let amount = match present(&csv_record.amount) {
                Some(value) if value.eq_ignore_ascii_case("max") => AMOUNT_MAX,
                _ => parse_optional("amount", &csv_record.amount)?,
            };

            Ok(EventRecord::Transfer(Transfer {
                id,
                debit_account_id: parse_optional("debit_account_id", &csv_record.debit_account_id)?,
                credit_account_id: parse_optional(
                    "credit_account_id",
                    &csv_record.credit_account_id,
                )?,
                amount,
                pending_id: parse_optional("pending_id", &csv_record.pending_id)?,
                user_data_128: parse_optional("user_data_128", &csv_record.user_data_128)?,
                user_data_64: parse_optional("user_data_64", &csv_record.user_data_64)?,
                user_data_32: parse_optional("user_data_32", &csv_record.user_data_32)?,
                timeout: parse_optional("timeout", &csv_record.timeout)?,
                ledger: parse_optional("ledger", &csv_record.ledger)?,
                code: parse_optional("code", &csv_record.code)?,
                flags: parse_flags(&csv_record.flags)?,
                timestamp: parse_optional("timestamp", &csv_record.timestamp)?,
            }))
        }
        _ => Err(format!(
            "Invalid record kind: '{}' for id {}",
            csv_record.kind, id
        )),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_required<T: FromStr>(name: &str, value: &str) -> Result<T, String> {
    let value = value.trim();
    value
        .parse()
        .map_err(|_| format!("Invalid {} '{}'", name, value))
}

/// Missing or blank fields are zero
fn parse_optional<T: FromStr + Default>(name: &str, value: &Option<String>) -> Result<T, String> {
    match present(value) {
        Some(value) => parse_required(name, value),
        None => Ok(T::default()),
    }
}

fn parse_flags<F: bitflags::Flags>(value: &Option<String>) -> Result<F, String> {
    parse_flag_names(present(value).unwrap_or_default())
}

/// Write account states to CSV format
///
/// Writes accounts in CSV format with columns: id, ledger, code, flags,
/// debits_pending, debits_posted, credits_pending, credits_posted.
/// Accounts are sorted by id for deterministic output.
///
/// # Arguments
///
/// * `accounts` - Slice of account states to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(LedgerError)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record([
        "id",
        "ledger",
        "code",
        "flags",
        "debits_pending",
        "debits_posted",
        "credits_pending",
        "credits_posted",
    ])?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer.write_record(&[
            account.id.to_string(),
            account.ledger.to_string(),
            account.code.to_string(),
            flag_names(&account.flags),
            account.debits_pending.to_string(),
            account.debits_posted.to_string(),
            account.credits_pending.to_string(),
            account.credits_posted.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(kind: &str, id: &str) -> CsvRecord {
        CsvRecord {
            kind: kind.to_string(),
            id: id.to_string(),
            ..CsvRecord::default()
        }
    }

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn test_convert_account() {
        let csv_record = CsvRecord {
            ledger: some("700"),
            code: some("10"),
            user_data_64: some("42"),
            flags: some("linked|history"),
            ..record("account", "1")
        };

        let converted = convert_csv_record(csv_record).unwrap();
        let EventRecord::Account(account) = converted else {
            panic!("expected an account, got {:?}", converted);
        };
        assert_eq!(account.id, 1);
        assert_eq!(account.ledger, 700);
        assert_eq!(account.code, 10);
        assert_eq!(account.user_data_64, 42);
        assert_eq!(account.flags, AccountFlags::LINKED | AccountFlags::HISTORY);
        assert!(converted.is_linked());
        assert_eq!(converted.kind(), "account");
    }

    #[test]
    fn test_convert_transfer() {
        let csv_record = CsvRecord {
            debit_account_id: some("1"),
            credit_account_id: some("2"),
            amount: some("250"),
            timeout: some("30"),
            ledger: some("700"),
            code: some("1"),
            flags: some("pending"),
            ..record("Transfer", " 100 ")
        };

        let EventRecord::Transfer(transfer) = convert_csv_record(csv_record).unwrap() else {
            panic!("expected a transfer");
        };
        assert_eq!(transfer.id, 100);
        assert_eq!(transfer.debit_account_id, 1);
        assert_eq!(transfer.credit_account_id, 2);
        assert_eq!(transfer.amount, 250);
        assert_eq!(transfer.timeout, 30);
        assert_eq!(transfer.flags, TransferFlags::PENDING);
        assert_eq!(transfer.pending_id, 0);
    }

    #[rstest]
    #[case::max("max", AMOUNT_MAX)]
    #[case::max_upper("MAX", AMOUNT_MAX)]
    #[case::blank("", 0)]
    #[case::u128_max("340282366920938463463374607431768211455", u128::MAX)]
    fn test_convert_transfer_amount(#[case] amount: &str, #[case] expected: u128) {
        let csv_record = CsvRecord {
            amount: some(amount),
            ..record("transfer", "5")
        };
        let EventRecord::Transfer(transfer) = convert_csv_record(csv_record).unwrap() else {
            panic!("expected a transfer");
        };
        assert_eq!(transfer.amount, expected);
    }

    #[rstest]
    #[case::unknown_kind(record("deposit", "1"), "Invalid record kind")]
    #[case::bad_id(record("account", "x"), "Invalid id")]
    #[case::negative_amount(CsvRecord { amount: some("-5"), ..record("transfer", "1") }, "Invalid amount")]
    #[case::unknown_flag(CsvRecord { flags: some("frozen"), ..record("account", "1") }, "unknown flag")]
    #[case::account_with_amount(CsvRecord { amount: some("5"), ..record("account", "1") }, "must not set 'amount'")]
    #[case::code_too_wide(CsvRecord { code: some("70000"), ..record("account", "1") }, "Invalid code")]
    fn test_convert_rejects(#[case] csv_record: CsvRecord, #[case] expected: &str) {
        let err = convert_csv_record(csv_record).unwrap_err();
        assert!(err.contains(expected), "{} does not mention {}", err, expected);
    }

    #[test]
    fn test_write_accounts_csv_sorted_by_id() {
        let mut second = Account::new(2, 700, 10).with_flags(AccountFlags::HISTORY);
        second.credits_posted = 25;
        let mut first = Account::new(1, 700, 10);
        first.debits_posted = 25;
        first.debits_pending = u128::MAX;

        let mut output = Vec::new();
        write_accounts_csv(&[second, first], &mut output).unwrap();

        let expected = "id,ledger,code,flags,debits_pending,debits_posted,credits_pending,credits_posted\n\
                        1,700,10,,340282366920938463463374607431768211455,25,0,0\n\
                        2,700,10,history,0,0,0,25\n";
        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }
}
