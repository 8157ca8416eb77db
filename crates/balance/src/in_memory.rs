use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use stockforge_core::{ExpectedVersion, StockKey};

use crate::record::BalanceRecord;
use crate::store::{BalanceDelta, BalanceStore, BalanceStoreError};

/// In-memory balance store.
///
/// Intended for tests/dev. A single `RwLock` write guard gives `apply_many`
/// its multi-row transaction boundary.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    rows: RwLock<HashMap<StockKey, BalanceRecord>>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one delta against `rows`, with `staged` standing in for
    /// earlier deltas of the same commit. Returns the resulting stock level.
    fn check(
        rows: &HashMap<StockKey, BalanceRecord>,
        staged: &HashMap<StockKey, i64>,
        delta: &BalanceDelta,
    ) -> Result<i64, BalanceStoreError> {
        let row = rows.get(&delta.key);
        let current = staged
            .get(&delta.key)
            .copied()
            .unwrap_or_else(|| row.map(|r| r.current_stock).unwrap_or(0));
        let version = row.map(|r| r.version).unwrap_or(0);

        if !delta.expected.matches(version) {
            return Err(BalanceStoreError::Concurrency {
                key: delta.key,
                detail: format!("expected {:?}, found {version}", delta.expected),
            });
        }

        let next = current + delta.delta;
        if next < 0 {
            return Err(BalanceStoreError::NegativeStock {
                key: delta.key,
                current,
                delta: delta.delta,
            });
        }

        Ok(next)
    }

    fn commit(rows: &mut HashMap<StockKey, BalanceRecord>, key: StockKey, delta: i64) -> BalanceRecord {
        let row = rows.entry(key).or_insert_with(BalanceRecord::zero);
        row.current_stock += delta;
        row.last_updated = Utc::now();
        row.version += 1;
        row.clone()
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn get(&self, key: StockKey) -> Result<Option<BalanceRecord>, BalanceStoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| BalanceStoreError::Storage("lock poisoned".to_string()))?;
        Ok(rows.get(&key).cloned())
    }

    fn apply(
        &self,
        key: StockKey,
        delta: i64,
        expected: ExpectedVersion,
    ) -> Result<BalanceRecord, BalanceStoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| BalanceStoreError::Storage("lock poisoned".to_string()))?;

        let delta = BalanceDelta::new(key, delta, expected);
        Self::check(&rows, &HashMap::new(), &delta)?;
        Ok(Self::commit(&mut rows, key, delta.delta))
    }

    fn apply_many(&self, deltas: &[BalanceDelta]) -> Result<Vec<BalanceRecord>, BalanceStoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| BalanceStoreError::Storage("lock poisoned".to_string()))?;

        // Validate everything before the first write.
        let mut staged: HashMap<StockKey, i64> = HashMap::new();
        for delta in deltas {
            let next = Self::check(&rows, &staged, delta)?;
            staged.insert(delta.key, next);
        }

        Ok(deltas
            .iter()
            .map(|d| Self::commit(&mut rows, d.key, d.delta))
            .collect())
    }

    fn list(&self) -> Result<Vec<(StockKey, BalanceRecord)>, BalanceStoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| BalanceStoreError::Storage("lock poisoned".to_string()))?;
        Ok(rows.iter().map(|(k, v)| (*k, v.clone())).collect())
    }
}
