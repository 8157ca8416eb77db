//! The (product, warehouse) pair every balance row and ledger chain hangs off.

use serde::{Deserialize, Serialize};

use crate::id::{ProductId, WarehouseId};
use crate::value_object::ValueObject;

/// Key of one balance row / one ledger chain.
///
/// Exactly one balance record exists per key; journal entries for a key form
/// an independent, strictly-ordered chain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub product: ProductId,
    pub warehouse: WarehouseId,
}

impl StockKey {
    pub fn new(product: ProductId, warehouse: WarehouseId) -> Self {
        Self { product, warehouse }
    }
}

impl ValueObject for StockKey {}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.product, self.warehouse)
    }
}
