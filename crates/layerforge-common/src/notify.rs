//! Notification abstraction for user-facing status lines
//!
//! The engine and the generator report informational and warning events
//! through an injected [`Notifier`] instead of a process-wide singleton, so
//! callers decide how messages surface (log stream, UI, test buffer).

use std::sync::Mutex;

use tracing::{info, warn};

/// Receives informational and warning messages from long-running operations
pub trait Notifier: Send + Sync {
    /// Reports a routine progress message
    fn info(&self, message: &str);

    /// Reports a recoverable problem
    fn warn(&self, message: &str);
}

/// Notifier that forwards messages to the `tracing` subscriber
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates a new TracingNotifier
    pub fn new() -> Self {
        TracingNotifier
    }
}

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Notifier that discards every message
#[derive(Debug, Clone, Default)]
pub struct NullNotifier;

impl NullNotifier {
    /// Creates a new NullNotifier
    pub fn new() -> Self {
        NullNotifier
    }
}

impl Notifier for NullNotifier {
    fn info(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}
}

/// Notifier that buffers messages in memory, for assertions in tests
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<(Level, String)>>,
}

/// Severity of a buffered message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Informational message
    Info,
    /// Warning message
    Warn,
}

impl MemoryNotifier {
    /// Creates a new MemoryNotifier with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all buffered messages in arrival order
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.lock().expect("notifier lock poisoned").clone()
    }

    /// Returns only buffered warning messages
    pub fn warnings(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, message)| message)
            .collect()
    }

    /// True if any buffered message contains the given fragment
    pub fn saw(&self, fragment: &str) -> bool {
        self.messages()
            .iter()
            .any(|(_, message)| message.contains(fragment))
    }
}

impl Notifier for MemoryNotifier {
    fn info(&self, message: &str) {
        self.messages
            .lock()
            .expect("notifier lock poisoned")
            .push((Level::Info, message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .expect("notifier lock poisoned")
            .push((Level::Warn, message.to_string()));
    }
}
