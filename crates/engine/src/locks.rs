use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use stockforge_core::{StockError, StockKey, StockResult};

/// Per-key mutex registry.
///
/// Each movement operation holds its key's lock across the whole
/// read-validate-write-append sequence, which serializes writers per key
/// while leaving unrelated keys fully parallel.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<StockKey, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lazily created, never removed: the registry grows with the set of
    /// keys that ever moved, matching the balance store's lifecycle.
    pub fn lock_for(&self, key: StockKey) -> StockResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StockError::storage("lock registry poisoned"))?;
        Ok(locks.entry(key).or_default().clone())
    }

    /// Both keys' locks in deterministic (sorted) order, regardless of
    /// argument order. Two opposite-direction transfers between the same
    /// warehouse pair therefore cannot deadlock.
    pub fn lock_pair(
        &self,
        a: StockKey,
        b: StockKey,
    ) -> StockResult<(Arc<Mutex<()>>, Arc<Mutex<()>>)> {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Ok((self.lock_for(first)?, self.lock_for(second)?))
    }
}

/// Acquire a key lock, mapping poisoning to a storage error.
pub fn acquire(lock: &Arc<Mutex<()>>) -> StockResult<MutexGuard<'_, ()>> {
    lock.lock()
        .map_err(|_| StockError::storage("key lock poisoned"))
}
