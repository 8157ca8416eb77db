use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of on-hand stock for one (product, warehouse) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// Authoritative on-hand quantity, never negative.
    pub current_stock: i64,
    /// Earmarked but not yet deducted. Carried for completeness; the
    /// movement engine never mutates it.
    pub reserved_stock: i64,
    pub last_updated: DateTime<Utc>,
    /// Row version stamp, bumped on every apply.
    pub version: u64,
}

impl BalanceRecord {
    /// The implicit zero-state row for a key with no movements yet.
    pub fn zero() -> Self {
        Self {
            current_stock: 0,
            reserved_stock: 0,
            last_updated: Utc::now(),
            version: 0,
        }
    }

    /// Always derived, never stored.
    pub fn available_stock(&self) -> i64 {
        self.current_stock - self.reserved_stock
    }
}

impl Default for BalanceRecord {
    fn default() -> Self {
        Self::zero()
    }
}
