use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockforge_core::{ProductId, WarehouseId};

use crate::entry::{LedgerEntry, MovementType};

/// Filter for the journal read path. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalQuery {
    pub product: Option<ProductId>,
    pub warehouse: Option<WarehouseId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub movement_type: Option<MovementType>,
}

impl JournalQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(mut self, product: ProductId) -> Self {
        self.product = Some(product);
        self
    }

    pub fn warehouse(mut self, warehouse: WarehouseId) -> Self {
        self.warehouse = Some(warehouse);
        self
    }

    /// Inclusive lower bound on `created_at`.
    pub fn from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Inclusive upper bound on `created_at`.
    pub fn to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    pub fn movement_type(mut self, movement_type: MovementType) -> Self {
        self.movement_type = Some(movement_type);
        self
    }

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if self.product.is_some_and(|p| p != entry.product) {
            return false;
        }
        if self.warehouse.is_some_and(|w| w != entry.warehouse) {
            return false;
        }
        if self.from.is_some_and(|from| entry.created_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| entry.created_at > to) {
            return false;
        }
        if self.movement_type.is_some_and(|t| t != entry.movement_type) {
            return false;
        }
        true
    }
}
