//! Append-only CSV log of finished sessions.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::stats::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: String,
    pub name: String,
    pub article: String,
    pub reason: String,
    pub elapsed_secs: f64,
    pub typed: usize,
    pub total: usize,
    pub correct: usize,
    pub backspaces: u32,
    pub speed: u32,
    pub accuracy: f64,
}

impl HistoryRecord {
    pub fn from_snapshot(name: &str, snapshot: &Snapshot) -> Self {
        let date = snapshot
            .ended_at
            .unwrap_or_else(Local::now)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        Self {
            date,
            name: name.to_string(),
            article: snapshot.article.to_string(),
            reason: snapshot
                .end_reason
                .map(|r| r.to_string())
                .unwrap_or_default(),
            elapsed_secs: (snapshot.elapsed.as_secs_f64() * 100.0).round() / 100.0,
            typed: snapshot.typed_chars,
            total: snapshot.total_chars,
            correct: snapshot.correct_chars,
            backspaces: snapshot.backspace_count,
            speed: snapshot.speed(),
            accuracy: (snapshot.accuracy_rate() * 100.0).round() / 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::history_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &HistoryRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // A missing or empty log needs a header
        let needs_header = fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        debug!(path = %self.path.display(), "history record appended");
        Ok(())
    }

    /// All records, oldest first. A missing log is empty.
    pub fn read_all(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<HistoryRecord>, _>>()?;
        Ok(records)
    }

    pub fn recent(&self, n: usize) -> Result<Vec<HistoryRecord>> {
        let mut all = self.read_all()?;
        let skip = all.len().saturating_sub(n);
        Ok(all.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleId;
    use crate::session::EndReason;
    use std::time::Duration;
    use tempfile::tempdir;

    fn snapshot(typed: usize) -> Snapshot {
        Snapshot {
            article: ArticleId::new("Linux", "01_pipes.txt"),
            started_at: Some(Local::now()),
            ended_at: Some(Local::now()),
            elapsed: Duration::from_secs(60),
            typed_chars: typed,
            total_chars: 200,
            correct_chars: typed / 2,
            backspace_count: 3,
            end_reason: Some(EndReason::Manual),
        }
    }

    #[test]
    fn record_from_snapshot() {
        let record = HistoryRecord::from_snapshot("Ada", &snapshot(100));
        assert_eq!(record.article, "Linux - pipes");
        assert_eq!(record.reason, "manual");
        assert_eq!(record.speed, 100);
        assert_eq!(record.accuracy, 50.0);
        assert_eq!(record.elapsed_secs, 60.0);
    }

    #[test]
    fn append_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state/history.csv");
        let log = HistoryLog::with_path(&path);

        log.append(&HistoryRecord::from_snapshot("Ada", &snapshot(10)))
            .unwrap();
        log.append(&HistoryRecord::from_snapshot("Ada", &snapshot(20)))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("elapsed_secs").count(), 1);
        assert_eq!(contents.lines().count(), 3);

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].typed, 20);
    }

    #[test]
    fn empty_log_gets_a_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        fs::write(&path, "").unwrap();
        let log = HistoryLog::with_path(&path);

        log.append(&HistoryRecord::from_snapshot("Ada", &snapshot(10)))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("date,"));
        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].typed, 10);
    }

    #[test]
    fn recent_keeps_the_tail() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::with_path(dir.path().join("history.csv"));
        for typed in [1, 2, 3, 4] {
            log.append(&HistoryRecord::from_snapshot("", &snapshot(typed)))
                .unwrap();
        }
        let recent = log.recent(2).unwrap();
        assert_eq!(
            recent.iter().map(|r| r.typed).collect::<Vec<_>>(),
            vec![3, 4]
        );
    }

    #[test]
    fn missing_log_reads_empty() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::with_path(dir.path().join("none.csv"));
        assert!(log.read_all().unwrap().is_empty());
    }
}
