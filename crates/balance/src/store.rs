use std::sync::Arc;

use thiserror::Error;

use stockforge_core::{ExpectedVersion, StockKey};

use crate::record::BalanceRecord;

/// Balance store operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceStoreError {
    /// The apply would drive `current_stock` negative. Nothing was mutated.
    #[error("negative stock for {key}: current {current}, delta {delta}")]
    NegativeStock {
        key: StockKey,
        current: i64,
        delta: i64,
    },

    /// Version check failed (row changed since it was read).
    #[error("version conflict for {key}: {detail}")]
    Concurrency { key: StockKey, detail: String },

    #[error("balance storage failure: {0}")]
    Storage(String),
}

/// One row mutation inside a multi-row apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    pub key: StockKey,
    pub delta: i64,
    pub expected: ExpectedVersion,
}

impl BalanceDelta {
    pub fn new(key: StockKey, delta: i64, expected: ExpectedVersion) -> Self {
        Self {
            key,
            delta,
            expected,
        }
    }
}

/// Keyed store of balance rows.
///
/// `get` never fails on absence: a missing row is the valid zero-stock state.
/// Writes go through `apply`/`apply_many`, which create the row lazily,
/// enforce non-negativity, recompute availability and bump the row version.
pub trait BalanceStore: Send + Sync {
    /// Current row for a key, `None` when no movement has touched it yet.
    fn get(&self, key: StockKey) -> Result<Option<BalanceRecord>, BalanceStoreError>;

    /// Add `delta` to the key's `current_stock` (creates-if-absent).
    ///
    /// Rejects with no mutation if the result would be negative or the
    /// version expectation does not hold.
    fn apply(
        &self,
        key: StockKey,
        delta: i64,
        expected: ExpectedVersion,
    ) -> Result<BalanceRecord, BalanceStoreError>;

    /// Apply several row mutations as one unit: every delta is validated
    /// before the first write, and a rejection leaves all rows untouched.
    fn apply_many(&self, deltas: &[BalanceDelta]) -> Result<Vec<BalanceRecord>, BalanceStoreError>;

    /// All rows (reporting read surface).
    fn list(&self) -> Result<Vec<(StockKey, BalanceRecord)>, BalanceStoreError>;
}

impl<S> BalanceStore for Arc<S>
where
    S: BalanceStore + ?Sized,
{
    fn get(&self, key: StockKey) -> Result<Option<BalanceRecord>, BalanceStoreError> {
        (**self).get(key)
    }

    fn apply(
        &self,
        key: StockKey,
        delta: i64,
        expected: ExpectedVersion,
    ) -> Result<BalanceRecord, BalanceStoreError> {
        (**self).apply(key, delta, expected)
    }

    fn apply_many(&self, deltas: &[BalanceDelta]) -> Result<Vec<BalanceRecord>, BalanceStoreError> {
        (**self).apply_many(deltas)
    }

    fn list(&self) -> Result<Vec<(StockKey, BalanceRecord)>, BalanceStoreError> {
        (**self).list()
    }
}
