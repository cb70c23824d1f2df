//! Rollback engine: transaction lifecycle and reverse-order replay

use std::path::{Path, PathBuf};
use std::sync::Arc;

use layerforge_common::text::lines_equivalent;
use layerforge_common::Notifier;
use tokio::fs;

use crate::error::RollbackError;
use crate::journal::JournalStore;
use crate::models::{ChangeKind, ChangeRecord, Transaction};

/// Outcome of a rollback execution
///
/// Rollback is best-effort: records that could not be reverted are listed as
/// warnings rather than failing the run.
#[derive(Debug, Clone, Default)]
pub struct RollbackReport {
    /// Number of records reverted
    pub reverted: usize,
    /// Records that were no-ops (file already gone, line already absent)
    pub skipped: usize,
    /// Human-readable descriptions of per-record failures
    pub warnings: Vec<String>,
}

/// Owns the transaction lifecycle: start, commit, execute, list, purge
///
/// The engine is the only component that writes journal files or derives
/// their names. Callers record changes onto the [`Transaction`] they were
/// handed and bring it back here to commit.
#[derive(Clone)]
pub struct RollbackEngine {
    journal: JournalStore,
    notifier: Arc<dyn Notifier>,
}

impl RollbackEngine {
    /// Creates an engine over a journal store, reporting through `notifier`
    pub fn new(journal: JournalStore, notifier: Arc<dyn Notifier>) -> Self {
        RollbackEngine { journal, notifier }
    }

    /// Opens a transaction; no side effects beyond the in-memory allocation
    pub fn begin(
        &self,
        module: impl Into<String>,
        method_name: impl Into<String>,
        operation: impl Into<String>,
    ) -> Transaction {
        Transaction::new(module, method_name, operation)
    }

    /// Persists the transaction to the journal store
    ///
    /// This is the durability point; a write failure is fatal to the
    /// generation run and is never swallowed.
    pub async fn commit(&self, tx: &Transaction) -> Result<PathBuf, RollbackError> {
        let path = self.journal.save(tx).await?;
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            self.notifier.info(&format!("Journal recorded: {}", name));
        }
        Ok(path)
    }

    /// Loads a committed transaction and reverses it, then consumes the journal
    ///
    /// A missing or unparsable journal aborts with zero filesystem changes.
    /// Otherwise records are processed in reverse order of application;
    /// each record's I/O failure is reported and skipped so later records
    /// still run. The journal file is deleted afterwards, so a rolled-back
    /// transaction cannot be replayed; a failed delete is reported as a
    /// warning, not an error, since the mutations were already reversed.
    pub async fn execute_rollback(&self, journal_path: &Path) -> Result<RollbackReport, RollbackError> {
        let tx = self.journal.load(journal_path).await?;

        self.notifier.info(&format!(
            "Rolling back '{}' in module '{}'...",
            tx.method_name, tx.module
        ));

        let mut report = self.replay(&tx).await;

        match self.journal.delete(journal_path).await {
            Ok(()) => self.notifier.info("Rollback completed, journal consumed."),
            Err(e) => {
                let warning = format!(
                    "Could not remove journal {}: {}",
                    journal_path.display(),
                    e
                );
                self.notifier.warn(&warning);
                report.warnings.push(warning);
            }
        }
        Ok(report)
    }

    /// Reverses a transaction that never reached the journal
    ///
    /// Recovery path for a failed commit: the recorded changes exist only
    /// in memory, so they are replayed in reverse directly from there, with
    /// the same best-effort semantics as a journal-backed rollback.
    pub async fn revert_uncommitted(&self, tx: &Transaction) -> RollbackReport {
        self.notifier.info(&format!(
            "Reverting uncommitted changes for '{}' in module '{}'...",
            tx.method_name, tx.module
        ));
        self.replay(tx).await
    }

    async fn replay(&self, tx: &Transaction) -> RollbackReport {
        let mut report = RollbackReport::default();
        for record in tx.changes.iter().rev() {
            match self.revert_record(record).await {
                Ok(true) => report.reverted += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    let warning = format!(
                        "Could not revert {}: {}",
                        record.file_path.display(),
                        e
                    );
                    self.notifier.warn(&warning);
                    report.warnings.push(warning);
                }
            }
        }
        report
    }

    /// Lists committed transactions, newest first
    pub async fn available_rollbacks(&self) -> Result<Vec<(PathBuf, Transaction)>, RollbackError> {
        self.journal.list().await
    }

    /// Purges journals older than the threshold, by filesystem age
    pub async fn clean_old_rollbacks(&self, max_age_days: u32) -> Result<Vec<PathBuf>, RollbackError> {
        let removed = self.journal.clean_older_than(max_age_days).await?;
        for path in &removed {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                self.notifier.info(&format!("Expired journal removed: {}", name));
            }
        }
        Ok(removed)
    }

    /// Reverses a single record; Ok(false) means it was already undone
    async fn revert_record(&self, record: &ChangeRecord) -> Result<bool, RollbackError> {
        let path = &record.file_path;
        let exists = fs::try_exists(path).await.unwrap_or(false);

        match record.kind {
            ChangeKind::Created => {
                // Missing file is not an error; another step may have
                // removed it already.
                if exists {
                    fs::remove_file(path).await?;
                    self.notify_file("Deleted", path);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            ChangeKind::Modified => {
                match (&record.backup_content, exists) {
                    (Some(backup), true) => {
                        fs::write(path, backup).await?;
                        self.notify_file("Restored", path);
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
            ChangeKind::LineAdded => {
                let line = match &record.added_line {
                    Some(line) => line,
                    None => return Ok(false),
                };
                if !exists {
                    return Ok(false);
                }
                let content = fs::read_to_string(path).await?;
                match remove_line_once(&content, line) {
                    Some(updated) => {
                        fs::write(path, updated).await?;
                        self.notify_file("Line removed from", path);
                        Ok(true)
                    }
                    // The line may have been removed by a manual edit.
                    None => Ok(false),
                }
            }
        }
    }

    fn notify_file(&self, action: &str, path: &Path) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            self.notifier.info(&format!("  {} {}", action, name));
        }
    }
}

/// Removes the last line matching `added_line` under fuzzy normalization
///
/// Scans from the end of the file and removes at most one line whose
/// whitespace-stripped form matches, or is matched by, the stripped target.
/// The bidirectional containment can pick an unintended line in files with
/// repetitive patterns; that fuzziness is long-standing observable behavior
/// and is kept as-is. Returns None when nothing matched. The remaining
/// lines are rejoined with the file's dominant line ending, so removing a
/// line from a CRLF file restores it byte-for-byte.
pub(crate) fn remove_line_once(content: &str, added_line: &str) -> Option<String> {
    let eol = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<&str> = content.lines().collect();
    let position = lines
        .iter()
        .rposition(|line| lines_equivalent(line, added_line))?;

    lines.remove(position);
    let mut updated = lines.join(eol);
    if content.ends_with('\n') && !updated.is_empty() {
        updated.push_str(eol);
    }
    Some(updated)
}
