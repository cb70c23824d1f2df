//! Journal store: one transaction per file on disk
//!
//! Pure storage, no rollback logic. File names encode module, method,
//! operation, and timestamp so entries are unique and sort readably.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::debug;

use crate::error::RollbackError;
use crate::models::Transaction;

const JOURNAL_PREFIX: &str = "rollback_";
const JOURNAL_EXT: &str = "json";

/// Persists and retrieves transactions in a journal directory
#[derive(Debug, Clone)]
pub struct JournalStore {
    dir: PathBuf,
}

impl JournalStore {
    /// Creates a store over the given directory
    ///
    /// The directory is created lazily on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JournalStore { dir: dir.into() }
    }

    /// Deterministic journal path for a transaction
    ///
    /// Derived from module, method, operation, and the transaction's own
    /// `created_at`, so the path can be recomputed before or after saving.
    pub fn journal_path(&self, tx: &Transaction) -> PathBuf {
        let timestamp = tx.created_at.format("%Y%m%d_%H%M%S");
        let file_name = format!(
            "{}{}_{}_{}_{}.{}",
            JOURNAL_PREFIX, tx.module, tx.method_name, tx.operation, timestamp, JOURNAL_EXT
        );
        self.dir.join(file_name)
    }

    /// Serializes a transaction to its journal file
    ///
    /// Write failures surface to the caller; this is the durability point.
    pub async fn save(&self, tx: &Transaction) -> Result<PathBuf, RollbackError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RollbackError::CommitFailed(format!(
                "Failed to create journal directory {}: {}",
                self.dir.display(),
                e
            )))?;

        let path = self.journal_path(tx);
        let json = serde_json::to_string_pretty(tx)?;
        fs::write(&path, json)
            .await
            .map_err(|e| RollbackError::CommitFailed(format!(
                "Failed to write journal {}: {}",
                path.display(),
                e
            )))?;

        Ok(path)
    }

    /// Loads a transaction from a journal file
    ///
    /// A missing file maps to `JournalNotFound`; unparsable content maps to
    /// `Serialization`. No filesystem changes are made either way.
    pub async fn load(&self, path: &Path) -> Result<Transaction, RollbackError> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(RollbackError::JournalNotFound(path.to_path_buf()));
        }

        let json = fs::read_to_string(path).await?;
        let tx = serde_json::from_str(&json)?;
        Ok(tx)
    }

    /// Lists persisted transactions, newest first by `created_at`
    ///
    /// Corrupt or unparsable files are skipped; listing never aborts on a
    /// single bad entry.
    pub async fn list(&self) -> Result<Vec<(PathBuf, Transaction)>, RollbackError> {
        if !fs::try_exists(&self.dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.dir).await?;
        let mut journals = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !Self::is_journal_file(&path) {
                continue;
            }
            match self.load(&path).await {
                Ok(tx) => journals.push((path, tx)),
                Err(e) => {
                    debug!("Skipping unreadable journal {}: {}", path.display(), e);
                }
            }
        }

        journals.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));
        Ok(journals)
    }

    /// Deletes a journal file
    pub async fn delete(&self, path: &Path) -> Result<(), RollbackError> {
        fs::remove_file(path).await?;
        Ok(())
    }

    /// Deletes journal files older than `max_age_days`, returning their paths
    ///
    /// Age is judged by filesystem metadata, not the serialized `created_at`,
    /// so retention survives clock skew inside journal content. Creation
    /// time falls back to modification time on filesystems without it.
    pub async fn clean_older_than(&self, max_age_days: u32) -> Result<Vec<PathBuf>, RollbackError> {
        if !fs::try_exists(&self.dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let cutoff = SystemTime::now() - Duration::from_secs(u64::from(max_age_days) * 24 * 60 * 60);
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut removed = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !Self::is_journal_file(&path) {
                continue;
            }
            let metadata = match fs::metadata(&path).await {
                Ok(m) => m,
                Err(_) => continue,
            };
            let age_anchor = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or_else(|_| SystemTime::now());

            if age_anchor < cutoff {
                fs::remove_file(&path).await?;
                removed.push(path);
            }
        }

        Ok(removed)
    }

    fn is_journal_file(path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => return false,
        };
        name.starts_with(JOURNAL_PREFIX)
            && path.extension().and_then(|e| e.to_str()) == Some(JOURNAL_EXT)
    }
}
