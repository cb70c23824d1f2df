#![warn(missing_docs)]

//! Shared utilities for layerforge
//!
//! Provides the notification abstraction used by the rollback engine and the
//! module generator, plus the line-normalization helper both sides of the
//! journal agree on.

pub mod notify;
pub mod text;

// Re-export public API
pub use notify::{MemoryNotifier, Notifier, NullNotifier, TracingNotifier};
pub use text::normalize_line;
