use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stockforge_core::{ProductId, WarehouseId};

use crate::product::Product;
use crate::warehouse::Warehouse;

/// Read-only identity lookups consumed by the movement processor.
///
/// Absence means the reference is unknown; activity flags are carried on the
/// returned records and interpreted by the caller.
pub trait ReferenceCatalog: Send + Sync {
    fn product(&self, id: ProductId) -> Option<Product>;
    fn warehouse(&self, id: WarehouseId) -> Option<Warehouse>;
}

impl<C> ReferenceCatalog for Arc<C>
where
    C: ReferenceCatalog + ?Sized,
{
    fn product(&self, id: ProductId) -> Option<Product> {
        (**self).product(id)
    }

    fn warehouse(&self, id: WarehouseId) -> Option<Warehouse> {
        (**self).warehouse(id)
    }
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
    warehouses: RwLock<HashMap<WarehouseId, Warehouse>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&self, product: Product) {
        if let Ok(mut map) = self.products.write() {
            map.insert(product.id, product);
        }
    }

    pub fn insert_warehouse(&self, warehouse: Warehouse) {
        if let Ok(mut map) = self.warehouses.write() {
            map.insert(warehouse.id, warehouse);
        }
    }
}

impl ReferenceCatalog for InMemoryCatalog {
    fn product(&self, id: ProductId) -> Option<Product> {
        let map = self.products.read().ok()?;
        map.get(&id).cloned()
    }

    fn warehouse(&self, id: WarehouseId) -> Option<Warehouse> {
        let map = self.warehouses.read().ok()?;
        map.get(&id).cloned()
    }
}
