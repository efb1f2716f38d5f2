//! Append-only, size-bounded ledger of coverage snapshots, persisted as
//! a pretty-printed JSON array next to the report output.
//!
//! The ledger is rewritten wholesale on every run, through a temp file
//! that is atomically renamed over the old one: a crash mid-write leaves
//! the previous ledger byte-for-byte intact. A corrupt or unreadable
//! ledger degrades to an empty history and never blocks a report.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{GcovhtmlError, Result};
use crate::model::CoverageSnapshot;

/// Snapshots retained in the ledger; oldest evicted first.
pub const RETENTION: usize = 30;

/// Signed percentage-point deltas against the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub statement_delta: f64,
    pub branch_delta: f64,
}

/// Handle on the ledger file.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full ledger. Missing, unreadable, or invalid content is
    /// an empty history.
    #[must_use]
    pub fn load(&self) -> Vec<CoverageSnapshot> {
        let Ok(bytes) = std::fs::read(&self.path) else {
            return Vec::new();
        };
        serde_json::from_slice(&bytes).unwrap_or_default()
    }

    /// Append one snapshot, truncate to the most recent [`RETENTION`]
    /// entries, and atomically replace the ledger file. Returns the
    /// ledger as written.
    pub fn record(&self, snapshot: CoverageSnapshot) -> Result<Vec<CoverageSnapshot>> {
        let mut history = self.load();
        push_bounded(&mut history, snapshot);
        self.save(&history)?;
        Ok(history)
    }

    /// Atomically replace the ledger with `history`. A failed write
    /// leaves the prior ledger file untouched.
    pub fn save(&self, history: &[CoverageSnapshot]) -> Result<()> {
        let json = serde_json::to_string_pretty(history)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|e| GcovhtmlError::Ledger(e.to_string()))?;

        Ok(())
    }
}

/// Append and enforce the retention bound: oldest entries drop first.
pub fn push_bounded(history: &mut Vec<CoverageSnapshot>, snapshot: CoverageSnapshot) {
    history.push(snapshot);
    if history.len() > RETENTION {
        history.drain(..history.len() - RETENTION);
    }
}

/// Trend of the newest snapshot against its predecessor, or `None` with
/// fewer than two snapshots.
#[must_use]
pub fn trend(history: &[CoverageSnapshot]) -> Option<Trend> {
    let [.., previous, current] = history else {
        return None;
    };
    Some(Trend {
        statement_delta: current.overall_statement_percent - previous.overall_statement_percent,
        branch_delta: current.overall_branch_percent - previous.overall_branch_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(statement: f64, branch: f64) -> CoverageSnapshot {
        CoverageSnapshot {
            timestamp: "2026-01-01 00:00:00".to_string(),
            total_covered: 8,
            total_instrumented: 10,
            overall_statement_percent: statement,
            overall_branch_percent: branch,
            file_count: 1,
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, b"{not json").unwrap();
        let store = HistoryStore::new(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_record_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        store.record(snapshot(80.0, 40.0)).unwrap();
        let history = store.load();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].overall_statement_percent, 80.0);
    }

    #[test]
    fn test_retention_evicts_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        for i in 0..RETENTION as u32 + 5 {
            store.record(snapshot(f64::from(i), 0.0)).unwrap();
        }
        let history = store.load();
        assert_eq!(history.len(), RETENTION);
        assert_eq!(history[0].overall_statement_percent, 5.0);
        assert_eq!(
            history.last().unwrap().overall_statement_percent,
            (RETENTION + 4) as f64
        );
    }

    #[test]
    fn test_record_over_corrupt_ledger_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, b"\xff\xfe garbage").unwrap();
        let store = HistoryStore::new(&path);
        let history = store.record(snapshot(50.0, 50.0)).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_ledger_is_human_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        store.record(snapshot(80.0, 40.0)).unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with('['));
        assert!(text.contains('\n'), "expected indented output");
        assert!(text.contains("\"overall_branch_percent\""));
    }

    #[test]
    fn test_trend_requires_two_snapshots() {
        assert_eq!(trend(&[]), None);
        assert_eq!(trend(&[snapshot(80.0, 40.0)]), None);
    }

    #[test]
    fn test_trend_deltas() {
        let history = vec![snapshot(80.0, 40.0), snapshot(90.0, 35.0)];
        let t = trend(&history).unwrap();
        assert!((t.statement_delta - 10.0).abs() < 1e-9);
        assert!((t.branch_delta + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_uses_last_two_only() {
        let history = vec![snapshot(10.0, 0.0), snapshot(20.0, 0.0), snapshot(50.0, 0.0)];
        let t = trend(&history).unwrap();
        assert!((t.statement_delta - 30.0).abs() < 1e-9);
    }
}
