//! Recursive discovery of `*.gcov` annotation files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extension of the annotation files we ingest.
pub const ANNOTATION_EXT: &str = "gcov";

/// Find all annotation files under `root`. Paths are returned relative
/// to `root` when possible; callers must not depend on their order.
/// Unreadable directory entries are skipped with a warning.
#[must_use]
pub fn annotation_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Warning: skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ANNOTATION_EXT) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        files.push(relative.to_path_buf());
    }
    files
}
