//! `stockforge-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod concurrency;
pub mod entity;
pub mod error;
pub mod id;
pub mod key;
pub mod value_object;

pub use concurrency::ExpectedVersion;
pub use entity::Entity;
pub use error::{StockError, StockResult};
pub use id::{ActorId, DocumentId, EntryId, ProductId, WarehouseId};
pub use key::StockKey;
pub use value_object::ValueObject;
