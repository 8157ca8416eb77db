//! Balance store: one mutable snapshot row per (product, warehouse) key.
//!
//! A balance row is the materialized projection of that key's ledger chain.
//! Rows are created lazily on first movement and never deleted, only driven
//! toward zero.

pub mod in_memory;
pub mod record;
pub mod store;

pub use in_memory::InMemoryBalanceStore;
pub use record::BalanceRecord;
pub use store::{BalanceDelta, BalanceStore, BalanceStoreError};
