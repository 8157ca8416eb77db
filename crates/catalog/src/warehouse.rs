use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockforge_core::{Entity, WarehouseId};

/// Catalog reference: one physical stock location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub code: String,
    pub name: String,
    /// Inactive warehouses are rejected by the movement processor.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Warehouse {
    pub fn new(id: WarehouseId, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
