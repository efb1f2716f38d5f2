//! Parser for gcov's text annotation format (`gcov -b`).
//!
//! Reference: https://gcc.gnu.org/onlinedocs/gcc/Invoking-Gcov.html
//!
//! Format, one annotation line per source line:
//!   <count>:<line number>:<source text>
//!
//! Count field values:
//!   `-`        not instrumented (blank/comment/preprocessor line)
//!   `#####`    instrumented, executed zero times
//!   digits     executed that many times
//!   `====...`  source-boundary marker, excluded from counting
//!
//! With `-b`, gcov interleaves extra lines that don't match the
//! three-field shape: `branch N taken M` records after control-flow
//! statements, and a `blocks executed NN%` summary per function. Both
//! feed branch (C1) coverage; scanned branch records take priority over
//! the blocks-executed proxy.
//!
//! Parsing is tolerant by design: malformed lines are skipped, never
//! fatal, and unrecognized count fields classify as not-instrumented.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{CoverageLine, ExecutionCount, FileCoverageSummary};

/// Control-flow markers that introduce branch records in `-b` output.
const BRANCH_TRIGGERS: [&str; 4] = ["if (", "else", "while", "for"];

/// Parse the raw bytes of one annotation file. Never fails: malformed
/// input degrades to a summary with fewer (or zero) classified lines.
#[must_use]
pub fn parse(path: &Path, input: &[u8]) -> FileCoverageSummary {
    let text = String::from_utf8_lossy(input);
    let raw: Vec<&str> = text.lines().collect();

    let mut summary = FileCoverageSummary {
        display_name: display_name(path),
        relative_path: source_path(path),
        ..Default::default()
    };

    // Branch detection path 1: the first blocks-executed marker, if any.
    summary.block_percent = raw.iter().find_map(|line| blocks_executed_percent(line));

    for (index, line) in raw.iter().enumerate() {
        // At most three fields; source text may itself contain ':'.
        let mut fields = line.splitn(3, ':');
        let (count_field, line_field, code) =
            match (fields.next(), fields.next(), fields.next()) {
                (Some(count), Some(num), Some(code)) => (count.trim(), num.trim(), code),
                // Fewer than three fields: header, branch record, or noise.
                _ => continue,
            };

        let count = classify(count_field);
        if count.is_instrumented() {
            summary.statements_instrumented += 1;
            if count.is_covered() {
                summary.statements_covered += 1;
            }
        }

        // Branch detection path 2: branch records immediately follow a
        // control-flow statement. They lack the three-field shape, so the
        // main loop skips them on its own pass.
        if opens_branches(code) {
            let mut next = index + 1;
            while next < raw.len() && raw[next].trim_start().starts_with("branch") {
                let record = raw[next].trim();
                if record.contains("taken") {
                    summary.branches_instrumented += 1;
                    if !record.contains("taken 0") {
                        summary.branches_taken += 1;
                    }
                }
                next += 1;
            }
        }

        summary.lines.push(CoverageLine {
            index,
            source_line: line_field.to_string(),
            count,
            code: code.to_string(),
        });
    }

    summary
}

/// Classify a trimmed count field. Anything that is neither a recognized
/// marker nor a pure digit run is not-instrumented (fail-safe).
fn classify(count_field: &str) -> ExecutionCount {
    if count_field == "-" {
        return ExecutionCount::NotInstrumented;
    }
    if count_field.starts_with("====") {
        return ExecutionCount::NotInstrumented;
    }
    if count_field.contains("#####") {
        return ExecutionCount::Uncovered;
    }
    if !count_field.is_empty() && count_field.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = count_field.parse::<u64>() {
            return ExecutionCount::Hit(n);
        }
    }
    ExecutionCount::NotInstrumented
}

/// Does this source text introduce branch records in `-b` output?
fn opens_branches(code: &str) -> bool {
    code.trim().ends_with('{') || BRANCH_TRIGGERS.iter().any(|t| code.contains(t))
}

/// Extract the percentage from a `blocks executed NN%` marker line.
/// Returns `Some(0.0)` for a marker whose number doesn't parse, `None`
/// for lines without the marker.
fn blocks_executed_percent(line: &str) -> Option<f64> {
    if !line.contains("blocks executed") {
        return None;
    }
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"blocks executed\s+([0-9]+(?:\.[0-9]+)?)").expect("valid regex")
    });
    let parsed = re
        .captures(line)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    Some(parsed.unwrap_or(0.0))
}

/// Logical source name for display: file name with `.gcov` stripped.
#[must_use]
pub fn display_name(path: &Path) -> String {
    let base = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    base.strip_suffix(".gcov").unwrap_or(base).to_string()
}

/// Original path with the `.gcov` extension stripped, used for placing
/// the file in the report hierarchy.
#[must_use]
pub fn source_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    s.strip_suffix(".gcov").unwrap_or(&s).to_string()
}
