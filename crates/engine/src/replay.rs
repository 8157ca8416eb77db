//! Replay verification: the journal is the source of truth, the balance row
//! is a cache that must equal the fold of its entries.

use thiserror::Error;

use stockforge_core::{StockError, StockKey};
use stockforge_ledger::LedgerEntry;

/// Outcome of checking one key's ledger chain against its balance row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// An entry's `balance_before` does not continue the chain.
    #[error("broken chain for {key} at entry {index}: expected before {expected}, found {found}")]
    BrokenChain {
        key: StockKey,
        index: usize,
        expected: i64,
        found: i64,
    },

    /// Folding the chain from zero does not reproduce the stored balance.
    #[error("replay mismatch for {key}: folded {folded}, stored {stored}")]
    Mismatch {
        key: StockKey,
        folded: i64,
        stored: i64,
    },

    #[error(transparent)]
    Stock(#[from] StockError),
}

/// Fold a key's entries in creation order from an initial zero balance,
/// verifying each chain link on the way. Returns the folded final balance.
pub fn fold_chain(key: StockKey, entries: &[LedgerEntry]) -> Result<i64, ReplayError> {
    let mut balance = 0i64;
    for (index, entry) in entries.iter().enumerate() {
        if entry.balance_before != balance {
            return Err(ReplayError::BrokenChain {
                key,
                index,
                expected: balance,
                found: entry.balance_before,
            });
        }
        balance += entry.signed_effect();
    }
    Ok(balance)
}
