//! Movement journal: append-only, immutable log of every stock change.
//!
//! The journal is the source of truth; balance rows are a materialized
//! projection of it. Entries are never edited or deleted.

pub mod entry;
pub mod in_memory;
pub mod journal;
pub mod query;

pub use entry::{LedgerEntry, MovementRef, MovementType, NewLedgerEntry, ReferenceKind};
pub use in_memory::InMemoryMovementJournal;
pub use journal::{JournalError, MovementJournal};
pub use query::JournalQuery;
