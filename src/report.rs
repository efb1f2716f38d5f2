//! Report assembly: run-wide totals, per-file rendering decisions, and
//! output artifact naming. The HTML itself lives in [`crate::html`].

use std::path::Path;

use chrono::Local;

use crate::model::{CoverageSnapshot, FileCoverageSummary, RunTotals};
use crate::tree::{self, TreeNode};

/// Files with more line records than this are flagged for chunked,
/// deferred rendering instead of one upfront `<pre>` block.
pub const LAZY_RENDER_THRESHOLD: usize = 1000;

/// Everything the presentation layer needs for one run.
#[derive(Debug)]
pub struct Report {
    pub totals: RunTotals,
    pub tree: TreeNode,
    /// Per-file report artifact names, parallel to the input summaries.
    pub report_files: Vec<String>,
}

/// Should this file render through the chunked lazy loader?
#[must_use]
pub fn defer_rendering(summary: &FileCoverageSummary) -> bool {
    summary.lines.len() > LAZY_RENDER_THRESHOLD
}

/// Per-file artifact name: the input path with its `.gcov` extension
/// replaced by `.html` and path separators flattened to `_`, so files
/// from different directories can't collide in the flat output dir.
#[must_use]
pub fn report_file_name(input: &Path) -> String {
    let s = input.to_string_lossy();
    let s = s.strip_suffix(".gcov").unwrap_or(&s);
    let flattened: String = s
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{flattened}.html")
}

/// Combine per-file summaries into run totals and the rendered tree.
#[must_use]
pub fn assemble(summaries: &[FileCoverageSummary], report_files: Vec<String>) -> Report {
    let mut totals = RunTotals {
        file_count: summaries.len(),
        ..Default::default()
    };
    for summary in summaries {
        totals.statements_covered += summary.statements_covered;
        totals.statements_instrumented += summary.statements_instrumented;
        totals.branches_taken += summary.branches_taken;
        totals.branches_instrumented += summary.branches_instrumented;
    }

    let tree = tree::build(summaries, &report_files);

    Report {
        totals,
        tree,
        report_files,
    }
}

/// Snapshot of this run's totals, stamped with the local wall clock.
#[must_use]
pub fn snapshot(totals: &RunTotals) -> CoverageSnapshot {
    snapshot_at(totals, Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
}

#[must_use]
pub fn snapshot_at(totals: &RunTotals, timestamp: String) -> CoverageSnapshot {
    CoverageSnapshot {
        timestamp,
        total_covered: totals.statements_covered,
        total_instrumented: totals.statements_instrumented,
        overall_statement_percent: totals.statement_percent(),
        overall_branch_percent: totals.branch_percent(),
        file_count: totals.file_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CoverageLine;
    use crate::model::ExecutionCount;

    fn summary_with_lines(n: usize) -> FileCoverageSummary {
        FileCoverageSummary {
            lines: (0..n)
                .map(|index| CoverageLine {
                    index,
                    source_line: index.to_string(),
                    count: ExecutionCount::Hit(1),
                    code: String::new(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defer_rendering_threshold() {
        assert!(!defer_rendering(&summary_with_lines(LAZY_RENDER_THRESHOLD)));
        assert!(defer_rendering(&summary_with_lines(LAZY_RENDER_THRESHOLD + 1)));
    }

    #[test]
    fn test_report_file_name_flattens_separators() {
        assert_eq!(
            report_file_name(Path::new("src/util/math.c.gcov")),
            "src_util_math.c.html"
        );
    }

    #[test]
    fn test_report_file_name_without_gcov_extension() {
        assert_eq!(report_file_name(Path::new("odd.txt")), "odd.txt.html");
    }

    #[test]
    fn test_assemble_sums_both_axes() {
        let a = FileCoverageSummary {
            statements_covered: 3,
            statements_instrumented: 4,
            branches_taken: 1,
            branches_instrumented: 2,
            ..Default::default()
        };
        let b = FileCoverageSummary {
            statements_covered: 1,
            statements_instrumented: 6,
            branches_taken: 0,
            branches_instrumented: 3,
            ..Default::default()
        };
        let report = assemble(&[a, b], vec!["a.html".into(), "b.html".into()]);
        assert_eq!(report.totals.statements_covered, 4);
        assert_eq!(report.totals.statements_instrumented, 10);
        assert_eq!(report.totals.branches_taken, 1);
        assert_eq!(report.totals.branches_instrumented, 5);
        assert_eq!(report.totals.file_count, 2);
        assert_eq!(report.totals.statement_percent(), 40.0);
    }

    #[test]
    fn test_snapshot_carries_totals() {
        let totals = RunTotals {
            statements_covered: 8,
            statements_instrumented: 10,
            branches_taken: 1,
            branches_instrumented: 4,
            file_count: 3,
        };
        let snap = snapshot_at(&totals, "2026-01-01 00:00:00".to_string());
        assert_eq!(snap.total_covered, 8);
        assert_eq!(snap.overall_statement_percent, 80.0);
        assert_eq!(snap.overall_branch_percent, 25.0);
        assert_eq!(snap.file_count, 3);
    }
}
