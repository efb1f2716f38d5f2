use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use gcovhtml::history::{self, HistoryStore};
use gcovhtml::model::FileCoverageSummary;
use gcovhtml::{discover, gcov, html, report};

const OUTPUT_DIR: &str = "coverage_html";
const INDEX_FILE: &str = "index.html";
const HISTORY_FILE: &str = "coverage_history.json";

/// gcovhtml — render gcov annotation files under the current directory
/// as a browsable HTML coverage report with history and trend.
#[derive(Parser)]
#[command(name = "gcovhtml", version, about)]
struct Cli {}

fn main() -> Result<()> {
    let _cli = Cli::parse();

    let output_dir = PathBuf::from(OUTPUT_DIR);

    // The ledger lives inside the output dir, which is about to be
    // wiped: load it first so the trend survives across runs.
    let store = HistoryStore::new(output_dir.join(HISTORY_FILE));
    let mut history = store.load();

    reset_output_dir(&output_dir)?;

    let inputs = discover::annotation_files(Path::new("."));
    if inputs.is_empty() {
        eprintln!("No .gcov files found under the current directory.");
        eprintln!("Run `gcov -b <your_file.c>` to produce annotation files first.");
        std::process::exit(1);
    }

    // Parse every file and write its page; only files with at least one
    // instrumented line make it into the index.
    let mut summaries: Vec<FileCoverageSummary> = Vec::new();
    let mut report_files: Vec<String> = Vec::new();
    for input in &inputs {
        let summary = match std::fs::read(input) {
            Ok(bytes) => gcov::parse(input, &bytes),
            Err(e) => {
                eprintln!("Warning: could not read {}: {e}", input.display());
                continue;
            }
        };

        let defer = report::defer_rendering(&summary);
        let report_file = report::report_file_name(input);
        let page = html::render_file_page(&summary, defer);
        std::fs::write(output_dir.join(&report_file), page)
            .with_context(|| format!("Failed to write {report_file}"))?;

        let lazy_note = if defer { " (lazy-load)" } else { "" };
        println!(
            "[OK] {} -> {} | C0: {:.1}% | C1: {:.1}%{}",
            input.display(),
            report_file,
            summary.statement_percent(),
            summary.branch_percent(),
            lazy_note,
        );

        if summary.statements_instrumented > 0 {
            summaries.push(summary);
            report_files.push(report_file);
        }
    }

    if summaries.is_empty() {
        println!("No valid coverage data found; index not generated.");
        return Ok(());
    }

    let report = report::assemble(&summaries, report_files);
    let snapshot = report::snapshot(&report.totals);
    let timestamp = snapshot.timestamp.clone();

    // Ledger write failures degrade to a warning; the report still
    // renders, with the trend computed from the in-memory history.
    history::push_bounded(&mut history, snapshot);
    if let Err(e) = store.save(&history) {
        eprintln!("Warning: could not update history ledger: {e}");
    }
    let trend = history::trend(&history);

    let index = html::render_index(&report.totals, &report.tree, trend, &timestamp);
    let index_path = output_dir.join(INDEX_FILE);
    std::fs::write(&index_path, index).context("Failed to write index.html")?;

    println!(
        "\nOverall C0: {:.1}% | C1: {:.1}% across {} files",
        report.totals.statement_percent(),
        report.totals.branch_percent(),
        report.totals.file_count,
    );
    println!("Open {} to view the report.", index_path.display());

    Ok(())
}

/// Delete and recreate the output directory. Destructive to prior
/// output on purpose: every run regenerates the whole bundle.
fn reset_output_dir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to clear {}", dir.display()));
        }
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(())
}
