//! Data models for change journaling

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of recorded mutation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeKind {
    /// A file that did not previously exist was written
    Created,
    /// An existing file was overwritten; the prior content is snapshotted
    Modified,
    /// A single line was inserted into a file that is otherwise left alone
    LineAdded,
}

/// One atomic recorded mutation with enough data to reverse it
///
/// Exactly one payload is populated per kind: `backup_content` for
/// `Modified`, `added_line` plus `line_number` for `LineAdded`, neither for
/// `Created` (there is nothing to restore, the file did not exist).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Absolute path of the mutated file
    pub file_path: PathBuf,
    /// What was done to the file
    pub kind: ChangeKind,
    /// Full content as it existed immediately before the mutation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_content: Option<String>,
    /// The inserted logical line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_line: Option<String>,
    /// 1-based line number of the insertion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
}

/// A named, timestamped, ordered list of recorded mutations
///
/// Changes are append-only while the transaction is active; their order is
/// the order they were applied, and rollback correctness depends on
/// replaying them in reverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Module the generation request targeted
    pub module: String,
    /// Logical method name of the request
    pub method_name: String,
    /// Operation label (e.g. "Get", "Post")
    pub operation: String,
    /// When the transaction was opened
    pub created_at: DateTime<Utc>,
    /// Recorded changes in application order
    pub changes: Vec<ChangeRecord>,
}

impl Transaction {
    /// Opens a new transaction with an empty change list
    pub fn new(
        module: impl Into<String>,
        method_name: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Transaction {
            module: module.into(),
            method_name: method_name.into(),
            operation: operation.into(),
            created_at: Utc::now(),
            changes: Vec::new(),
        }
    }

    /// Records that a previously absent file was written
    ///
    /// Callers must invoke this only for files they are about to write that
    /// did not exist; the journal does not verify existence itself.
    pub fn record_created(&mut self, file_path: impl Into<PathBuf>) {
        self.changes.push(ChangeRecord {
            file_path: file_path.into(),
            kind: ChangeKind::Created,
            backup_content: None,
            added_line: None,
            line_number: None,
        });
    }

    /// Records an overwrite, capturing the pre-mutation snapshot
    pub fn record_modified(
        &mut self,
        file_path: impl Into<PathBuf>,
        original_content: impl Into<String>,
    ) {
        self.changes.push(ChangeRecord {
            file_path: file_path.into(),
            kind: ChangeKind::Modified,
            backup_content: Some(original_content.into()),
            added_line: None,
            line_number: None,
        });
    }

    /// Records a single-line insertion into a shared file
    ///
    /// Used when many unrelated insertions accumulate into one long-lived
    /// file and a full snapshot per run would be wasteful.
    pub fn record_line_added(
        &mut self,
        file_path: impl Into<PathBuf>,
        added_line: impl Into<String>,
        line_number: usize,
    ) {
        self.changes.push(ChangeRecord {
            file_path: file_path.into(),
            kind: ChangeKind::LineAdded,
            backup_content: None,
            added_line: Some(added_line.into()),
            line_number: Some(line_number),
        });
    }

    /// True when no changes have been recorded
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
