//! Uniform in-memory representation of one run's coverage data. The gcov
//! parser produces a `FileCoverageSummary` per annotation file; only the
//! numeric `CoverageSnapshot` survives the run, in the history ledger.

use serde::{Deserialize, Serialize};

/// Compute a coverage percentage, returning 0.0 when the total is zero.
#[must_use]
pub fn percent(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}

/// Classification of one annotation line, derived solely from the raw
/// text of its count field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionCount {
    /// `-` count field, a `====` boundary marker, or anything unrecognized.
    NotInstrumented,
    /// `#####` marker: instrumented, executed zero times.
    Uncovered,
    /// Plain digit count. `Hit(0)` is instrumented but not covered.
    Hit(u64),
}

impl ExecutionCount {
    #[must_use]
    pub fn is_instrumented(&self) -> bool {
        !matches!(self, ExecutionCount::NotInstrumented)
    }

    /// Covered requires a strictly positive execution count.
    #[must_use]
    pub fn is_covered(&self) -> bool {
        matches!(self, ExecutionCount::Hit(n) if *n > 0)
    }
}

/// One source line as reported by the instrumentation tool.
#[derive(Debug, Clone)]
pub struct CoverageLine {
    /// Zero-based position within the annotation file, used for anchoring.
    pub index: usize,
    /// Line number field, kept verbatim (gcov may repeat or interleave
    /// non-numeric values for multi-record constructs).
    pub source_line: String,
    pub count: ExecutionCount,
    /// Source text, rendered verbatim (escaped at the presentation layer).
    pub code: String,
}

/// Aggregate coverage for one annotation file.
#[derive(Debug, Clone, Default)]
pub struct FileCoverageSummary {
    /// Logical source name, `.gcov` suffix stripped.
    pub display_name: String,
    /// Original path (extension stripped), used for hierarchy placement.
    pub relative_path: String,
    pub statements_covered: u64,
    pub statements_instrumented: u64,
    pub branches_taken: u64,
    pub branches_instrumented: u64,
    /// Block-coverage proxy from a `blocks executed NN%` marker line.
    /// Only consulted when no branch records were scanned.
    pub block_percent: Option<f64>,
    pub lines: Vec<CoverageLine>,
}

impl FileCoverageSummary {
    #[must_use]
    pub fn statement_percent(&self) -> f64 {
        percent(self.statements_covered, self.statements_instrumented)
    }

    /// Scanned branch records override the block-coverage proxy.
    #[must_use]
    pub fn branch_percent(&self) -> f64 {
        if self.branches_instrumented > 0 {
            percent(self.branches_taken, self.branches_instrumented)
        } else {
            self.block_percent.unwrap_or(0.0)
        }
    }
}

/// One run's aggregate numbers, persisted in the history ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageSnapshot {
    pub timestamp: String,
    pub total_covered: u64,
    pub total_instrumented: u64,
    pub overall_statement_percent: f64,
    pub overall_branch_percent: f64,
    pub file_count: usize,
}

/// Run-wide totals across all included file summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTotals {
    pub statements_covered: u64,
    pub statements_instrumented: u64,
    pub branches_taken: u64,
    pub branches_instrumented: u64,
    pub file_count: usize,
}

impl RunTotals {
    #[must_use]
    pub fn statement_percent(&self) -> f64 {
        percent(self.statements_covered, self.statements_instrumented)
    }

    #[must_use]
    pub fn branch_percent(&self) -> f64 {
        percent(self.branches_taken, self.branches_instrumented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_zero_total() {
        assert_eq!(percent(0, 0), 0.0);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 2), 50.0);
        assert_eq!(percent(3, 3), 100.0);
    }

    #[test]
    fn test_execution_count_classification() {
        assert!(!ExecutionCount::NotInstrumented.is_instrumented());
        assert!(ExecutionCount::Uncovered.is_instrumented());
        assert!(!ExecutionCount::Uncovered.is_covered());
        assert!(ExecutionCount::Hit(0).is_instrumented());
        assert!(!ExecutionCount::Hit(0).is_covered());
        assert!(ExecutionCount::Hit(1).is_covered());
    }

    #[test]
    fn test_branch_percent_prefers_scanned_records() {
        let summary = FileCoverageSummary {
            branches_taken: 1,
            branches_instrumented: 4,
            block_percent: Some(90.0),
            ..Default::default()
        };
        assert_eq!(summary.branch_percent(), 25.0);
    }

    #[test]
    fn test_branch_percent_falls_back_to_block_proxy() {
        let summary = FileCoverageSummary {
            block_percent: Some(75.0),
            ..Default::default()
        };
        assert_eq!(summary.branch_percent(), 75.0);
    }

    #[test]
    fn test_branch_percent_undefined_is_zero() {
        let summary = FileCoverageSummary::default();
        assert_eq!(summary.branch_percent(), 0.0);
    }
}
