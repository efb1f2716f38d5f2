//! Directory-tree aggregation of per-file summaries for the index page.
//!
//! Files are placed by splitting their relative path into segments.
//! Name collisions are resolved by deterministic renaming, never by
//! overwriting: a later arrival at an occupied key gets a `_fileN`
//! suffix, and a leaf sitting where a folder must be created is renamed
//! aside the same way.

use std::collections::HashMap;
use std::path::{Component, Path};

use crate::model::FileCoverageSummary;

/// What the index page needs to render one file entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub display_name: String,
    /// Name of the per-file report artifact, relative to the output dir.
    pub report_file: String,
    pub statement_percent: f64,
    pub branch_percent: f64,
}

/// Hierarchy node: a synthetic folder or a per-file leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Folder(HashMap<String, TreeNode>),
    Leaf(FileEntry),
}

impl TreeNode {
    #[must_use]
    pub fn new_folder() -> Self {
        TreeNode::Folder(HashMap::new())
    }

    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder(_))
    }

    /// Child keys in render order: folders before leaves, ties broken by
    /// case-insensitive lexical order. Empty for leaves.
    #[must_use]
    pub fn render_order(&self) -> Vec<&String> {
        let TreeNode::Folder(children) = self else {
            return Vec::new();
        };
        let mut keys: Vec<&String> = children.keys().collect();
        keys.sort_by_key(|k| (!children[*k].is_folder(), k.to_lowercase()));
        keys
    }
}

/// Build the folder-rooted tree for one run. Input order only matters
/// for collision renaming (later arrivals get the suffix).
#[must_use]
pub fn build(summaries: &[FileCoverageSummary], report_files: &[String]) -> TreeNode {
    let mut root = TreeNode::new_folder();
    for (summary, report_file) in summaries.iter().zip(report_files) {
        insert(&mut root, summary, report_file);
    }
    root
}

fn insert(root: &mut TreeNode, summary: &FileCoverageSummary, report_file: &str) {
    let mut segments = path_segments(&summary.relative_path);
    if segments.is_empty() {
        segments.push(summary.display_name.clone());
    }

    let entry = FileEntry {
        display_name: summary.display_name.clone(),
        report_file: report_file.to_string(),
        statement_percent: summary.statement_percent(),
        branch_percent: summary.branch_percent(),
    };

    let (leaf_name, folders) = segments.split_last().expect("segments is non-empty");

    let mut node = root;
    for segment in folders {
        let TreeNode::Folder(children) = node else {
            unreachable!("walk only descends into folders");
        };
        // A leaf occupying a folder position is renamed aside, so both
        // the leaf and the new folder stay retrievable.
        if matches!(children.get(segment), Some(TreeNode::Leaf(_))) {
            let displaced = children.remove(segment).expect("checked above");
            children.insert(segment.clone(), TreeNode::new_folder());
            let renamed = free_key(children, segment);
            children.insert(renamed, displaced);
        }
        node = children
            .entry(segment.clone())
            .or_insert_with(TreeNode::new_folder);
    }

    let TreeNode::Folder(children) = node else {
        unreachable!("walk only descends into folders");
    };
    let key = free_key(children, leaf_name);
    children.insert(key, TreeNode::Leaf(entry));
}

/// First available key: `name`, then `name_file1`, `name_file2`, ...
fn free_key(children: &HashMap<String, TreeNode>, name: &str) -> String {
    if !children.contains_key(name) {
        return name.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{name}_file{counter}");
        if !children.contains_key(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Normal path segments only; empty or non-normal components (`.`, `..`,
/// root) from malformed input are dropped defensively.
fn path_segments(path: &str) -> Vec<String> {
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str().map(str::to_string),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, rel: &str) -> FileCoverageSummary {
        FileCoverageSummary {
            display_name: name.to_string(),
            relative_path: rel.to_string(),
            statements_covered: 1,
            statements_instrumented: 2,
            ..Default::default()
        }
    }

    fn build_one(pairs: &[(&str, &str)]) -> TreeNode {
        let summaries: Vec<_> = pairs.iter().map(|(n, r)| summary(n, r)).collect();
        let reports: Vec<_> = pairs.iter().map(|(n, _)| format!("{n}.html")).collect();
        build(&summaries, &reports)
    }

    fn children(node: &TreeNode) -> &HashMap<String, TreeNode> {
        match node {
            TreeNode::Folder(c) => c,
            TreeNode::Leaf(_) => panic!("expected folder"),
        }
    }

    #[test]
    fn test_two_files_under_one_folder() {
        let root = build_one(&[("b.c", "a/b.c"), ("d.c", "a/d.c")]);
        let top = children(&root);
        assert_eq!(top.len(), 1);
        let folder = children(&top["a"]);
        assert!(matches!(folder["b.c"], TreeNode::Leaf(_)));
        assert!(matches!(folder["d.c"], TreeNode::Leaf(_)));
    }

    #[test]
    fn test_leaf_collision_renames_later_arrival() {
        let root = build_one(&[("b.c", "a/b.c"), ("b.c", "a/b.c")]);
        let folder = children(&children(&root)["a"]);
        assert_eq!(folder.len(), 2);
        assert!(matches!(folder["b.c"], TreeNode::Leaf(_)));
        assert!(matches!(folder["b.c_file1"], TreeNode::Leaf(_)));
    }

    #[test]
    fn test_three_way_collision_counts_up() {
        let root = build_one(&[("b.c", "a/b.c"), ("b.c", "a/b.c"), ("b.c", "a/b.c")]);
        let folder = children(&children(&root)["a"]);
        assert_eq!(folder.len(), 3);
        assert!(folder.contains_key("b.c"));
        assert!(folder.contains_key("b.c_file1"));
        assert!(folder.contains_key("b.c_file2"));
    }

    #[test]
    fn test_leaf_landing_on_folder_is_renamed() {
        // "a/b" exists as a folder (from a/b/x.c); a file literally named
        // "b" under "a" must not clobber it.
        let root = build_one(&[("x.c", "a/b/x.c"), ("b", "a/b")]);
        let folder = children(&children(&root)["a"]);
        assert!(folder["b"].is_folder());
        assert!(matches!(folder["b_file1"], TreeNode::Leaf(_)));
    }

    #[test]
    fn test_folder_landing_on_leaf_displaces_leaf() {
        // Reverse order: "a/b" arrives as a leaf first, then a folder
        // "a/b/" is needed. The leaf is renamed aside, nothing is lost.
        let root = build_one(&[("b", "a/b"), ("x.c", "a/b/x.c")]);
        let folder = children(&children(&root)["a"]);
        assert!(folder["b"].is_folder());
        assert!(matches!(folder["b_file1"], TreeNode::Leaf(_)));
        assert!(matches!(children(&folder["b"])["x.c"], TreeNode::Leaf(_)));
    }

    #[test]
    fn test_empty_path_falls_back_to_display_name() {
        let root = build_one(&[("main.c", "")]);
        assert!(matches!(children(&root)["main.c"], TreeNode::Leaf(_)));
    }

    #[test]
    fn test_malformed_segments_skipped() {
        let root = build_one(&[("x.c", "a//./x.c")]);
        let folder = children(&children(&root)["a"]);
        assert!(matches!(folder["x.c"], TreeNode::Leaf(_)));
    }

    #[test]
    fn test_render_order_folders_first_case_insensitive() {
        let root = build_one(&[
            ("z.c", "z.c"),
            ("Apple.c", "Apple.c"),
            ("m.c", "sub/m.c"),
            ("n.c", "Zub/n.c"),
        ]);
        let order: Vec<&str> = root.render_order().iter().map(|s| s.as_str()).collect();
        assert_eq!(order, vec!["sub", "Zub", "Apple.c", "z.c"]);
    }

    #[test]
    fn test_leaf_entry_carries_percentages() {
        let root = build_one(&[("b.c", "a/b.c")]);
        let folder = children(&children(&root)["a"]);
        let TreeNode::Leaf(entry) = &folder["b.c"] else {
            panic!("expected leaf");
        };
        assert_eq!(entry.statement_percent, 50.0);
        assert_eq!(entry.report_file, "b.c.html");
    }
}
