use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use stockforge_core::{EntryId, StockKey};

use crate::entry::{LedgerEntry, NewLedgerEntry};
use crate::journal::{JournalError, MovementJournal};
use crate::query::JournalQuery;

#[derive(Debug, Default)]
struct JournalState {
    /// All committed entries in global append order.
    entries: Vec<LedgerEntry>,
    /// Last `balance_after` per key (chain tail).
    tails: HashMap<StockKey, i64>,
}

/// In-memory append-only movement journal.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryMovementJournal {
    state: RwLock<JournalState>,
}

impl InMemoryMovementJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate an entry against the current chain tails, with `staged`
    /// standing in for entries accepted earlier in the same commit.
    fn check_chain(
        state: &JournalState,
        staged: &HashMap<StockKey, i64>,
        entry: &NewLedgerEntry,
    ) -> Result<(), JournalError> {
        entry.validate().map_err(JournalError::InvalidEntry)?;

        let key = entry.key();
        let last = staged
            .get(&key)
            .or_else(|| state.tails.get(&key))
            .copied()
            .unwrap_or(0);
        if entry.balance_before != last {
            return Err(JournalError::ChainBreak {
                key,
                last,
                found: entry.balance_before,
            });
        }
        Ok(())
    }

    fn commit(state: &mut JournalState, entry: NewLedgerEntry) -> LedgerEntry {
        let committed = LedgerEntry {
            entry_id: EntryId::new(),
            product: entry.product,
            warehouse: entry.warehouse,
            movement_type: entry.movement_type,
            quantity: entry.quantity,
            reference: entry.reference,
            balance_before: entry.balance_before,
            balance_after: entry.balance_after,
            actor: entry.actor,
            created_at: Utc::now(),
        };
        state.tails.insert(committed.key(), committed.balance_after);
        state.entries.push(committed.clone());
        committed
    }
}

impl MovementJournal for InMemoryMovementJournal {
    fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, JournalError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| JournalError::Storage("lock poisoned".to_string()))?;

        Self::check_chain(&state, &HashMap::new(), &entry)?;
        Ok(Self::commit(&mut state, entry))
    }

    fn append_pair(
        &self,
        first: NewLedgerEntry,
        second: NewLedgerEntry,
    ) -> Result<(LedgerEntry, LedgerEntry), JournalError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| JournalError::Storage("lock poisoned".to_string()))?;

        // Validate both legs before committing either.
        Self::check_chain(&state, &HashMap::new(), &first)?;
        let staged = HashMap::from([(first.key(), first.balance_after)]);
        Self::check_chain(&state, &staged, &second)?;

        let a = Self::commit(&mut state, first);
        let b = Self::commit(&mut state, second);
        Ok((a, b))
    }

    fn query(&self, query: &JournalQuery) -> Result<Vec<LedgerEntry>, JournalError> {
        let state = self
            .state
            .read()
            .map_err(|_| JournalError::Storage("lock poisoned".to_string()))?;

        Ok(state
            .entries
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect())
    }

    fn entries_for_key(&self, key: StockKey) -> Result<Vec<LedgerEntry>, JournalError> {
        let state = self
            .state
            .read()
            .map_err(|_| JournalError::Storage("lock poisoned".to_string()))?;

        Ok(state
            .entries
            .iter()
            .filter(|e| e.key() == key)
            .cloned()
            .collect())
    }
}
