//! Reference catalog: product and warehouse identity lookups.
//!
//! Read-only from the engine's perspective. Document workflows own the write
//! side of these records; the movement processor only resolves them.

pub mod product;
pub mod store;
pub mod warehouse;

pub use product::Product;
pub use store::{InMemoryCatalog, ReferenceCatalog};
pub use warehouse::Warehouse;
