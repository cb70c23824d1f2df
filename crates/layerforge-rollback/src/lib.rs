#![warn(missing_docs)]

//! Change journaling and rollback for layerforge
//!
//! Records every file mutation a generation run performs into an ordered,
//! named transaction, persists committed transactions as journal files, and
//! can reverse a transaction by replaying its recorded changes in reverse
//! order. Rollback replay is best-effort: individual record failures are
//! reported and skipped so the remaining records still get a chance to
//! restore state.

pub mod engine;
pub mod error;
pub mod journal;
pub mod models;

// Re-export public API
pub use engine::{RollbackEngine, RollbackReport};
pub use error::RollbackError;
pub use journal::JournalStore;
pub use models::{ChangeKind, ChangeRecord, Transaction};
