//! Presentation layer: self-contained HTML pages with inline CSS/JS.
//!
//! Core logic decides *what* to show (totals, tree, per-file lazy flag);
//! this module only turns it into markup. Interactive behavior (search
//! filter, dark-mode toggle, next-uncovered navigation, chunked lazy
//! rendering) is plain inline JavaScript so the report works offline.

use std::fmt::Write as _;
use std::path::Path;

use crate::history::Trend;
use crate::model::{CoverageLine, ExecutionCount, FileCoverageSummary, RunTotals};
use crate::tree::TreeNode;

/// Lines appended per scroll step when a large file renders lazily.
pub const CHUNK_SIZE: usize = 100;

/// HTML-escape text so control characters in source code can't break
/// the page.
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a string for embedding in a JS template literal (the lazy
/// loader ships line markup inside backticks).
#[must_use]
pub fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// Badge class for a percentage: green ≥ 80, yellow ≥ 50, red below.
fn badge_class(percent: f64) -> &'static str {
    if percent >= 80.0 {
        "badge-success"
    } else if percent >= 50.0 {
        "badge-warning"
    } else {
        "badge-danger"
    }
}

/// Markup for one annotation line.
#[must_use]
pub fn render_line(line: &CoverageLine) -> String {
    let (css_class, prefix) = match &line.count {
        ExecutionCount::NotInstrumented => ("uninstrumented", String::new()),
        ExecutionCount::Uncovered => ("uncovered", "[MISS] ".to_string()),
        ExecutionCount::Hit(n) if *n > 0 => ("covered", format!("[{n}x] ")),
        ExecutionCount::Hit(_) => ("covered", String::new()),
    };
    format!(
        "<span class='{}' data-line='{}'><span class='line-num'>{}</span> {}{}</span>",
        css_class,
        line.index,
        escape(&line.source_line),
        prefix,
        escape(&line.code),
    )
}

/// Breadcrumb trail from the file's directory path.
fn breadcrumb(summary: &FileCoverageSummary) -> String {
    let mut parts = vec!["<a href='index.html'>Home</a>".to_string()];
    if let Some(parent) = Path::new(&summary.relative_path).parent() {
        for folder in parent.iter().filter_map(|s| s.to_str()) {
            if folder.is_empty() {
                continue;
            }
            parts.push(format!("<a href='#'>{}</a>", escape(folder)));
        }
    }
    parts.push(escape(&summary.display_name));
    parts.join(" &gt; ")
}

/// Render the page for one annotation file. `defer` switches large
/// files to the chunked lazy loader instead of an upfront `<pre>`.
#[must_use]
pub fn render_file_page(summary: &FileCoverageSummary, defer: bool) -> String {
    let name = escape(&summary.display_name);
    let c0 = summary.statement_percent();
    let c1 = summary.branch_percent();

    let mut page = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Coverage: {name}</title>
<style>{css}</style>
</head>
<body>
<div class="container">
<header>
<div class="actions">
<button class="btn btn-dark-mode" id="themeToggle">Dark Mode</button>
<button class="btn btn-next" id="nextUncovered">Next Uncovered</button>
</div>
<div class="breadcrumb">{breadcrumb}</div>
<h1>{name}</h1>
<div class="stats">
<div class="stat-card">
<div class="stat-title">C0 Coverage (Statement)</div>
<div class="stat-value">{c0:.1}%
<span class="badge {c0_badge}">{covered}/{instrumented}</span>
</div>
</div>
<div class="stat-card">
<div class="stat-title">C1 Coverage (Branch)</div>
<div class="stat-value">{c1:.1}%
<span class="badge {c1_badge}">{taken}/{branches}</span>
</div>
</div>
</div>
</header>
<a href="index.html" class="back-link">Back to Summary</a>
"#,
        name = name,
        css = FILE_CSS,
        breadcrumb = breadcrumb(summary),
        c0 = c0,
        c0_badge = badge_class(c0),
        covered = summary.statements_covered,
        instrumented = summary.statements_instrumented,
        c1 = c1,
        c1_badge = badge_class(c1),
        taken = summary.branches_taken,
        branches = summary.branches_instrumented,
    );

    if defer {
        page.push_str("<div id=\"coverage-container\"></div>\n");
        page.push_str("<div id=\"loader\">Loading more lines...</div>\n");
        page.push_str("<script>\nconst allLines = [\n");
        for line in &summary.lines {
            let _ = writeln!(page, "`{}`,", js_escape(&render_line(line)));
        }
        page.push_str("];\n");
        let _ = writeln!(page, "const chunkSize = {CHUNK_SIZE};");
        page.push_str(LAZY_JS);
        page.push_str("</script>\n");
    } else {
        page.push_str("<pre>\n");
        for line in &summary.lines {
            page.push_str(&render_line(line));
            page.push('\n');
        }
        page.push_str("</pre>\n<script>\n");
        page.push_str(EAGER_JS);
        page.push_str("</script>\n");
    }

    page.push_str("</div>\n</body>\n</html>\n");
    page
}

fn trend_markup(delta: f64) -> String {
    if delta == 0.0 {
        return String::new();
    }
    let (color, arrow) = if delta > 0.0 {
        ("green", "&#9650;")
    } else {
        ("red", "&#9660;")
    };
    format!(
        " <span style='color: {color};'>{arrow}{:.1}%</span>",
        delta.abs()
    )
}

fn render_tree_node(node: &TreeNode, level: usize, out: &mut String) {
    let TreeNode::Folder(children) = node else {
        return;
    };
    let indent = "  ".repeat(level);
    for key in node.render_order() {
        match &children[key] {
            TreeNode::Leaf(entry) => {
                let _ = writeln!(
                    out,
                    "{indent}<div class='file-entry'>\
                     <strong><a href='{href}'>{name}</a></strong><br/>\
                     <span class='pill pill-c0'>C0: {c0:.0}%</span>\
                     <span class='pill pill-c1'>C1: {c1:.0}%</span></div>",
                    href = escape(&entry.report_file),
                    name = escape(&entry.display_name),
                    c0 = entry.statement_percent,
                    c1 = entry.branch_percent,
                );
            }
            folder @ TreeNode::Folder(_) => {
                let _ = writeln!(out, "{indent}<details>");
                let _ = writeln!(out, "{indent}<summary>{}</summary>", escape(key));
                let _ = writeln!(out, "{indent}<div class='folder-body'>");
                render_tree_node(folder, level + 1, out);
                let _ = writeln!(out, "{indent}</div>");
                let _ = writeln!(out, "{indent}</details>");
            }
        }
    }
}

/// Render the index page: overall stat cards with trend arrows, search
/// box, and the collapsible project tree.
#[must_use]
pub fn render_index(
    totals: &RunTotals,
    tree: &TreeNode,
    trend: Option<Trend>,
    timestamp: &str,
) -> String {
    let c0 = totals.statement_percent();
    let c1 = totals.branch_percent();
    let (trend_c0, trend_c1) = match trend {
        Some(t) => (trend_markup(t.statement_delta), trend_markup(t.branch_delta)),
        None => (String::new(), String::new()),
    };

    let mut tree_html = String::new();
    render_tree_node(tree, 0, &mut tree_html);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Code Coverage Report</title>
<style>{css}</style>
</head>
<body>
<button class="btn-dark-mode" id="themeToggle">Dark Mode</button>
<div class="container">
<header>
<h1>Code Coverage Report</h1>
<p class="subtitle">C0 &amp; C1 Coverage Analysis</p>
</header>
<div class="controls">
<input type="text" id="searchInput" placeholder="Search files by name...">
</div>
<div class="stats-grid">
<div class="stat-card">
<div class="stat-title">Overall C0 Coverage</div>
<div class="stat-value">{c0:.1}%</div>
<div class="stat-subtitle">{covered} / {instrumented} lines{trend_c0}</div>
</div>
<div class="stat-card">
<div class="stat-title">Overall C1 Coverage</div>
<div class="stat-value">{c1:.1}%</div>
<div class="stat-subtitle">{taken} / {branches} branches{trend_c1}</div>
</div>
<div class="stat-card">
<div class="stat-title">Total Files</div>
<div class="stat-value">{files}</div>
<div class="stat-subtitle">Analyzed on {timestamp}</div>
</div>
</div>
<h2 class="section-title">Project Structure</h2>
<div id="fileTree">
{tree_html}
</div>
</div>
<script>{js}</script>
</body>
</html>
"#,
        css = INDEX_CSS,
        c0 = c0,
        covered = totals.statements_covered,
        instrumented = totals.statements_instrumented,
        trend_c0 = trend_c0,
        c1 = c1,
        taken = totals.branches_taken,
        branches = totals.branches_instrumented,
        trend_c1 = trend_c1,
        files = totals.file_count,
        timestamp = escape(timestamp),
        tree_html = tree_html,
        js = INDEX_JS,
    )
}

const FILE_CSS: &str = r#"
:root { --primary: #4361ee; --success: #06d6a0; --danger: #ef476f;
  --warning: #ffd166; --dark: #2b2d42; --gray: #adb5bd; --border: #e9ecef; }
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Segoe UI', Tahoma, sans-serif; line-height: 1.6;
  color: var(--dark); background: #fafafa; padding: 20px; }
.container { max-width: 1200px; margin: 0 auto; background: white;
  border-radius: 12px; box-shadow: 0 5px 15px rgba(0,0,0,0.05); overflow: hidden; }
header { background: linear-gradient(135deg, var(--primary), #3a0ca3);
  color: white; padding: 30px 40px; position: relative; }
.actions { position: absolute; top: 20px; right: 20px; display: flex; gap: 10px; }
.btn { padding: 8px 16px; border: none; border-radius: 6px; cursor: pointer;
  font-weight: 500; }
.btn-dark-mode { background: rgba(255,255,255,0.2); color: white; }
.btn-next { background: var(--warning); color: var(--dark); }
h1 { font-size: 2rem; margin-bottom: 10px; }
.breadcrumb { font-size: 0.9rem; opacity: 0.9; margin-bottom: 15px; }
.breadcrumb a { color: white; }
.stats { display: flex; gap: 30px; margin: 20px 0; flex-wrap: wrap; }
.stat-card { flex: 1; min-width: 200px; background: rgba(255,255,255,0.15);
  padding: 20px; border-radius: 10px; }
.stat-title { font-size: 0.9rem; opacity: 0.9; margin-bottom: 5px; }
.stat-value { font-size: 1.8rem; font-weight: 700; display: flex;
  align-items: center; gap: 10px; }
.badge { padding: 4px 12px; border-radius: 20px; font-weight: 600; font-size: 0.9rem; }
.badge-success { background: var(--success); color: white; }
.badge-warning { background: var(--warning); color: var(--dark); }
.badge-danger { background: var(--danger); color: white; }
.back-link { display: inline-block; margin: 20px; color: var(--primary);
  text-decoration: none; font-weight: 500; padding: 10px 20px;
  border: 2px solid var(--primary); border-radius: 6px; }
pre, #coverage-container { background: #2d2d2d; color: #f8f8f2; padding: 30px;
  font-family: 'Fira Code', 'Consolas', monospace; font-size: 14px;
  line-height: 1.5; overflow-x: auto; }
#coverage-container { max-height: 80vh; overflow-y: auto; }
.covered { color: #a6e22e; }
.uncovered { color: #f92672; background: rgba(249, 38, 114, 0.1); }
.uncovered.highlighted { outline: 1px solid var(--warning); }
.uninstrumented { color: #666; }
.line-num { color: #666; margin-right: 15px; user-select: none; }
#loader { text-align: center; padding: 20px; color: var(--gray); font-size: 0.9rem; }
body.dark-mode { background: #1a1a1a; color: #e0e0e0; }
body.dark-mode .container { background: #252525; }
body.dark-mode pre { background: #1e1e1e; }
"#;

const EAGER_JS: &str = r#"
const uncoveredSpans = Array.from(document.querySelectorAll('.uncovered'));
let currentIndex = -1;
document.getElementById('nextUncovered').addEventListener('click', () => {
    if (uncoveredSpans.length === 0) return;
    currentIndex = (currentIndex + 1) % uncoveredSpans.length;
    const target = uncoveredSpans[currentIndex];
    uncoveredSpans.forEach(el => el.classList.remove('highlighted'));
    target.classList.add('highlighted');
    target.scrollIntoView({ behavior: 'smooth', block: 'center' });
});
window.addEventListener('load', () => {
    const first = document.querySelector('.uncovered');
    if (first) {
        first.scrollIntoView({ behavior: 'smooth', block: 'center' });
        first.classList.add('highlighted');
        currentIndex = 0;
    }
});
const toggle = document.getElementById('themeToggle');
toggle.addEventListener('click', () => {
    document.body.classList.toggle('dark-mode');
    toggle.textContent = document.body.classList.contains('dark-mode') ? 'Light Mode' : 'Dark Mode';
});
"#;

const LAZY_JS: &str = r#"
const container = document.getElementById('coverage-container');
const loader = document.getElementById('loader');
let loadedCount = 0;
let uncoveredSpans = [];
let currentIndex = -1;
function loadChunk() {
    const fragment = document.createDocumentFragment();
    const end = Math.min(loadedCount + chunkSize, allLines.length);
    for (let i = loadedCount; i < end; i++) {
        const div = document.createElement('div');
        div.innerHTML = allLines[i];
        const span = div.firstChild;
        if (span.classList.contains('uncovered')) {
            uncoveredSpans.push(span);
        }
        fragment.appendChild(span);
    }
    container.appendChild(fragment);
    loadedCount = end;
    if (loadedCount >= allLines.length) {
        loader.style.display = 'none';
    }
}
loadChunk();
container.addEventListener('scroll', () => {
    if (container.scrollTop + container.clientHeight >= container.scrollHeight - 200) {
        if (loadedCount < allLines.length) loadChunk();
    }
});
document.getElementById('nextUncovered').addEventListener('click', () => {
    if (uncoveredSpans.length === 0) return;
    currentIndex = (currentIndex + 1) % uncoveredSpans.length;
    const target = uncoveredSpans[currentIndex];
    uncoveredSpans.forEach(el => el.classList.remove('highlighted'));
    target.classList.add('highlighted');
    target.scrollIntoView({ behavior: 'smooth', block: 'center' });
});
const toggle = document.getElementById('themeToggle');
toggle.addEventListener('click', () => {
    document.body.classList.toggle('dark-mode');
    toggle.textContent = document.body.classList.contains('dark-mode') ? 'Light Mode' : 'Dark Mode';
});
"#;

const INDEX_CSS: &str = r#"
:root { --primary: #4361ee; --success: #06d6a0; --danger: #ef476f;
  --warning: #ffd166; --dark: #2b2d42; --gray: #adb5bd; --border: #e9ecef; }
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Segoe UI', Tahoma, sans-serif; line-height: 1.6;
  color: var(--dark); background: #f5f7fa; padding: 20px; }
.container { max-width: 1200px; margin: 0 auto; background: white;
  border-radius: 16px; box-shadow: 0 10px 30px rgba(0,0,0,0.08); overflow: hidden; }
header { background: linear-gradient(135deg, #4361ee, #3a0ca3); color: white;
  padding: 40px; text-align: center; }
h1 { font-size: 2.5rem; font-weight: 800; margin-bottom: 10px; }
.subtitle { font-size: 1.1rem; opacity: 0.9; }
.controls { padding: 30px 40px; background: #f8f9fa; border-bottom: 1px solid var(--border); }
#searchInput { width: 100%; max-width: 500px; padding: 12px 20px;
  border: 2px solid var(--border); border-radius: 50px; font-size: 1rem; outline: none; }
#searchInput:focus { border-color: var(--primary); }
.stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
  gap: 30px; padding: 40px; }
.stat-card { background: white; border-radius: 16px; padding: 30px;
  box-shadow: 0 5px 15px rgba(0,0,0,0.05); border: 1px solid var(--border);
  text-align: center; }
.stat-title { font-size: 1.1rem; color: var(--gray); margin-bottom: 15px; }
.stat-value { font-size: 3rem; font-weight: 800; color: var(--primary); margin: 10px 0; }
.stat-subtitle { font-size: 0.9rem; color: var(--gray); }
.section-title { padding: 0 40px 20px; font-size: 1.5rem; font-weight: 700;
  border-bottom: 2px solid var(--border); margin: 40px 0 20px; }
#fileTree { padding: 0 40px 40px; }
#fileTree details { margin: 10px 0; }
#fileTree summary { padding: 10px 15px; background: #e9ecef; border-radius: 8px;
  cursor: pointer; font-weight: 600; }
.folder-body { margin-left: 20px; padding: 10px; border-left: 2px solid #dee2e6; }
.file-entry { margin: 10px 0; padding: 15px; border-radius: 8px; background: #f8f9fa;
  border-left: 4px solid var(--primary); }
.file-entry a { color: var(--primary); text-decoration: none; }
.pill { display: inline-block; margin: 5px 10px 0 0; padding: 3px 10px;
  border-radius: 12px; font-size: 0.85rem; }
.pill-c0 { background: var(--success); color: white; }
.pill-c1 { background: var(--warning); color: var(--dark); }
.btn-dark-mode { position: fixed; top: 20px; right: 20px; padding: 12px 24px;
  background: rgba(0,0,0,0.2); color: white; border: none; border-radius: 50px;
  cursor: pointer; font-weight: 600; }
body.dark-mode { background: #121212; color: #e0e0e0; }
body.dark-mode .container { background: #1e1e1e; }
body.dark-mode .stat-card { background: #2d2d2d; border-color: #3a3a3a; }
body.dark-mode .controls { background: #252525; border-color: #3a3a3a; }
"#;

const INDEX_JS: &str = r#"
const toggle = document.getElementById('themeToggle');
toggle.addEventListener('click', () => {
    document.body.classList.toggle('dark-mode');
    toggle.textContent = document.body.classList.contains('dark-mode') ? 'Light Mode' : 'Dark Mode';
});
document.getElementById('searchInput').addEventListener('input', function(e) {
    const term = e.target.value.toLowerCase();
    const items = document.querySelectorAll('#fileTree .file-entry, #fileTree details');
    items.forEach(item => {
        const text = item.textContent.toLowerCase();
        item.style.display = text.includes(term) ? '' : 'none';
    });
});
"#;
