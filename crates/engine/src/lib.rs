//! Movement processor: the write surface of the stock consistency engine.
//!
//! Each operation is one synchronous critical section over one or two
//! (product, warehouse) keys: read balance, validate, write balance, append
//! journal entry(ies). Failed calls leave no trace in either store.

pub mod locks;
pub mod processor;
pub mod replay;

#[cfg(test)]
mod integration_tests;

pub use locks::LockRegistry;
pub use processor::{MovementProcessor, Posted, PostedTransfer};
pub use replay::{fold_chain, ReplayError};
