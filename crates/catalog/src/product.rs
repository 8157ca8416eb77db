use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockforge_core::{Entity, ProductId};

/// Catalog reference: one sellable/stockable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    /// Inactive products are rejected by the movement processor.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(id: ProductId, sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            sku: sku.into(),
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

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
