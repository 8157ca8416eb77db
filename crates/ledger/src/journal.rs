use std::sync::Arc;

use thiserror::Error;

use stockforge_core::StockKey;

use crate::entry::{LedgerEntry, NewLedgerEntry};
use crate::query::JournalQuery;

/// Journal operation error.
///
/// `InvalidEntry` and `ChainBreak` are deterministic rejections of a
/// malformed append; `Storage` is an infrastructure failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JournalError {
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// The entry's `balance_before` does not continue the key's chain.
    #[error("chain break for {key}: last balance_after {last}, entry balance_before {found}")]
    ChainBreak {
        key: StockKey,
        last: i64,
        found: i64,
    },

    #[error("journal storage failure: {0}")]
    Storage(String),
}

/// Append-only movement journal.
///
/// Implementations must:
/// - never mutate or remove committed entries
/// - preserve append order per key (creation order defines each key's chain)
/// - reflect every committed append in reads immediately
/// - enforce the per-key chain invariant: a new entry's `balance_before`
///   equals the key's last `balance_after` (zero for a fresh key)
pub trait MovementJournal: Send + Sync {
    /// Append one entry. Pure insert; assigns `entry_id` and `created_at`.
    fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, JournalError>;

    /// Append two entries as one unit (transfer legs). Both are validated
    /// before either is committed; a rejected pair leaves the journal
    /// untouched.
    fn append_pair(
        &self,
        first: NewLedgerEntry,
        second: NewLedgerEntry,
    ) -> Result<(LedgerEntry, LedgerEntry), JournalError>;

    /// Read path used by reporting collaborators.
    fn query(&self, query: &JournalQuery) -> Result<Vec<LedgerEntry>, JournalError>;

    /// Full chain for one key in creation order (replay verification).
    fn entries_for_key(&self, key: StockKey) -> Result<Vec<LedgerEntry>, JournalError>;
}

impl<J> MovementJournal for Arc<J>
where
    J: MovementJournal + ?Sized,
{
    fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, JournalError> {
        (**self).append(entry)
    }

    fn append_pair(
        &self,
        first: NewLedgerEntry,
        second: NewLedgerEntry,
    ) -> Result<(LedgerEntry, LedgerEntry), JournalError> {
        (**self).append_pair(first, second)
    }

    fn query(&self, query: &JournalQuery) -> Result<Vec<LedgerEntry>, JournalError> {
        (**self).query(query)
    }

    fn entries_for_key(&self, key: StockKey) -> Result<Vec<LedgerEntry>, JournalError> {
        (**self).entries_for_key(key)
    }
}
