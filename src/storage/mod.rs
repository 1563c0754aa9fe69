// src/storage/mod.rs

//! Sent-log persistence.
//!
//! Keeps a rolling JSON log of previously-notified repositories so a
//! scheduled run can answer "was this item sent recently?". Records older
//! than the retention window are pruned on every load; writes go through
//! a temp file plus rename so a crash cannot leave a partial log behind.
//!
//! Concurrent external access (two overlapping scheduled runs) is
//! deliberately last-write-wins; there is no file locking.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{NotificationLog, SentRecord, TrendingItem};
use crate::utils::log::Logger;

/// Records older than this many days are discarded on load.
pub const RETENTION_DAYS: i64 = 7;

/// Items notified within this many hours are suppressed from re-notification.
///
/// Kept independent from the retention window: an item sent two days ago
/// is eligible again even though its record is still retained.
pub const DEDUP_HOURS: i64 = 24;

/// Store for the persisted notification log.
pub struct SentLogStore {
    path: PathBuf,
    logger: Arc<Logger>,
}

impl SentLogStore {
    /// Create a store backed by the given JSON file path.
    pub fn new(path: impl Into<PathBuf>, logger: Arc<Logger>) -> Self {
        Self {
            path: path.into(),
            logger,
        }
    }

    /// Load the persisted log, pruning expired records.
    ///
    /// An absent or unparsable file is downgraded to a fresh empty log;
    /// corruption must never fail the caller.
    pub async fn load(&self) -> NotificationLog {
        let mut log = match self.read_log().await {
            Ok(Some(log)) => log,
            Ok(None) => {
                self.logger.info("No sent-log file found, starting fresh");
                NotificationLog::fresh()
            }
            Err(error) => {
                self.logger
                    .warn(&format!("Failed to load sent-log, starting fresh: {error}"));
                NotificationLog::fresh()
            }
        };

        let horizon = Utc::now() - Duration::days(RETENTION_DAYS);
        let before = log.sent_repositories.len();
        log.sent_repositories.retain(|record| record.sent_at > horizon);

        let pruned = before - log.sent_repositories.len();
        if pruned > 0 {
            self.logger
                .debug(&format!("Pruned {pruned} sent records older than {RETENTION_DAYS} days"));
        }

        log
    }

    /// Return the items whose identity has no sent record within the
    /// dedup window. Older records keep the item eligible again.
    pub fn filter_unsent(
        &self,
        items: &[TrendingItem],
        log: &NotificationLog,
    ) -> Vec<TrendingItem> {
        let horizon = Utc::now() - Duration::hours(DEDUP_HOURS);
        let recently_sent: std::collections::HashSet<&str> = log
            .sent_repositories
            .iter()
            .filter(|record| record.sent_at > horizon)
            .map(|record| record.full_name.as_str())
            .collect();

        items
            .iter()
            .filter(|item| !recently_sent.contains(item.full_name.as_str()))
            .cloned()
            .collect()
    }

    /// Append one sent record per item and persist the log.
    ///
    /// Re-loads the current file first (last-write-wins); a write failure
    /// propagates because the notifications already went out and losing
    /// the record risks duplicate sends on the next run.
    pub async fn record_sent(&self, items: &[TrendingItem]) -> Result<()> {
        let mut log = self.load().await;
        let now = Utc::now();

        log.sent_repositories
            .extend(items.iter().map(|item| SentRecord::from_item(item, now)));
        log.last_check = now;

        self.write_log(&log).await?;
        self.logger
            .info(&format!("Recorded {} sent repositories", items.len()));
        Ok(())
    }

    async fn read_log(&self) -> Result<Option<NotificationLog>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the log atomically (write to temp, then rename).
    async fn write_log(&self, log: &NotificationLog) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(log)
            .map_err(|e| AppError::persist(format!("serialize: {e}")))?;

        self.ensure_dir()
            .await
            .map_err(|e| AppError::persist(format!("create dir: {e}")))?;

        let tmp = self.path.with_extension("tmp");
        let write = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.flush().await?;
            drop(file);
            tokio::fs::rename(&tmp, &self.path).await
        };
        write
            .await
            .map_err(|e| AppError::persist(format!("write {:?}: {e}", self.path)))?;
        Ok(())
    }

    async fn ensure_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if parent != Path::new("") {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::log::LogLevel;
    use tempfile::TempDir;

    fn test_logger() -> Arc<Logger> {
        Arc::new(Logger::new(LogLevel::Error).quiet())
    }

    fn make_item(full_name: &str, rank: usize) -> TrendingItem {
        let (author, name) = full_name.split_once('/').unwrap();
        TrendingItem {
            full_name: full_name.to_string(),
            author: author.to_string(),
            name: name.to_string(),
            url: format!("https://github.com/{full_name}"),
            description: "desc".to_string(),
            language: "Rust".to_string(),
            stars: 100,
            stars_today: 10,
            rank,
        }
    }

    fn make_record(full_name: &str, hours_ago: i64) -> SentRecord {
        SentRecord {
            full_name: full_name.to_string(),
            stars: 100,
            stars_today: 10,
            sent_at: Utc::now() - Duration::hours(hours_ago),
            rank: 1,
        }
    }

    #[tokio::test]
    async fn load_missing_file_returns_fresh_log() {
        let tmp = TempDir::new().unwrap();
        let store = SentLogStore::new(tmp.path().join("sent.json"), test_logger());

        let log = store.load().await;
        assert!(log.sent_repositories.is_empty());
    }

    #[tokio::test]
    async fn load_corrupt_file_returns_fresh_log() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sent.json");
        tokio::fs::write(&path, b"{not json at all").await.unwrap();

        let store = SentLogStore::new(&path, test_logger());
        let log = store.load().await;
        assert!(log.sent_repositories.is_empty());
    }

    #[tokio::test]
    async fn load_prunes_records_past_retention() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sent.json");

        let log = NotificationLog {
            last_check: Utc::now(),
            sent_repositories: vec![
                make_record("old/one", (RETENTION_DAYS + 1) * 24),
                make_record("kept/two", 2 * 24),
                make_record("kept/three", 2),
            ],
        };
        tokio::fs::write(&path, serde_json::to_vec(&log).unwrap())
            .await
            .unwrap();

        let store = SentLogStore::new(&path, test_logger());
        let loaded = store.load().await;

        let names: Vec<&str> = loaded
            .sent_repositories
            .iter()
            .map(|r| r.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["kept/two", "kept/three"]);
    }

    #[tokio::test]
    async fn filter_excludes_items_sent_within_dedup_window() {
        let tmp = TempDir::new().unwrap();
        let store = SentLogStore::new(tmp.path().join("sent.json"), test_logger());

        let log = NotificationLog {
            last_check: Utc::now(),
            sent_repositories: vec![make_record("recent/repo", 2)],
        };

        let items = vec![make_item("recent/repo", 1), make_item("fresh/repo", 2)];
        let unsent = store.filter_unsent(&items, &log);

        assert_eq!(unsent.len(), 1);
        assert_eq!(unsent[0].full_name, "fresh/repo");
    }

    #[tokio::test]
    async fn filter_readmits_items_older_than_dedup_window() {
        let tmp = TempDir::new().unwrap();
        let store = SentLogStore::new(tmp.path().join("sent.json"), test_logger());

        // Sent 2 days ago: still retained, but eligible again.
        let log = NotificationLog {
            last_check: Utc::now(),
            sent_repositories: vec![make_record("stale/repo", 48)],
        };

        let items = vec![make_item("stale/repo", 1)];
        let unsent = store.filter_unsent(&items, &log);
        assert_eq!(unsent.len(), 1);
    }

    #[tokio::test]
    async fn record_sent_appends_and_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/sent.json");
        let store = SentLogStore::new(&path, test_logger());

        store
            .record_sent(&[make_item("a/one", 1), make_item("b/two", 2)])
            .await
            .unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.sent_repositories.len(), 2);
        assert_eq!(loaded.sent_repositories[0].full_name, "a/one");
        assert_eq!(loaded.sent_repositories[1].rank, 2);

        // No stray temp file after the rename.
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn record_sent_propagates_write_failure() {
        let tmp = TempDir::new().unwrap();
        // A plain file where the log's parent directory should be makes
        // every write attempt fail.
        let blocker = tmp.path().join("blocker");
        tokio::fs::write(&blocker, b"not a directory").await.unwrap();

        let store = SentLogStore::new(blocker.join("sent.json"), test_logger());
        let error = store.record_sent(&[make_item("a/one", 1)]).await.unwrap_err();

        assert!(matches!(error, AppError::PersistFailed(_)));
    }

    #[tokio::test]
    async fn record_sent_keeps_existing_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sent.json");
        let store = SentLogStore::new(&path, test_logger());

        store.record_sent(&[make_item("first/run", 1)]).await.unwrap();
        store.record_sent(&[make_item("second/run", 1)]).await.unwrap();

        let loaded = store.load().await;
        let names: Vec<&str> = loaded
            .sent_repositories
            .iter()
            .map(|r| r.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["first/run", "second/run"]);
    }
}
