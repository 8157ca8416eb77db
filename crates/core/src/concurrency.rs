//! Optimistic concurrency expectation for versioned balance rows.

use crate::error::{StockError, StockResult};

/// Version expectation checked by the balance store before a write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (useful when the caller already holds the key lock).
    Any,
    /// Require the row to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> StockResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(StockError::conflict(format!(
                "version check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
