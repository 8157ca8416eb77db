//! Stock domain error model.

use thiserror::Error;

/// Result type used across the stock engine.
pub type StockResult<T> = Result<T, StockError>;

/// Typed failure surfaced to the calling workflow controller.
///
/// Keep this focused on deterministic, business/domain failures plus the two
/// infrastructure outcomes the caller must distinguish (conflict, storage).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// A value failed validation (e.g. zero/negative quantity, malformed id).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An unknown product or warehouse reference.
    #[error("not found: {0}")]
    NotFound(String),

    /// The movement would drive `current_stock` negative.
    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    /// A serialization mechanism rejected the write (stale row version).
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// Underlying persistence failure.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl StockError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn insufficient(available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            available,
            requested,
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConcurrencyConflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
