//! Classifies rendered files of the two revisions as added, removed or changed.

use std::path::{Path, PathBuf};

use log::{debug, info};

use super::error::{CompareError, Result};
use super::labels::strip_labels_in_tree;
use super::result::{ComparisonResult, FileEntry};
use super::scan::{hash_tree, TreeHashes};
use crate::pipeline::{templates_dir, Revision};

/// Path sets produced by comparing two hash maps.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

/// Splits paths into added (source only), removed (destination only) and
/// changed (both, differing hash). Paths with equal hashes are dropped.
pub fn classify(source: &TreeHashes, destination: &TreeHashes) -> Classification {
    let mut result = Classification::default();

    for (path, hash) in source {
        match destination.get(path) {
            None => result.added.push(path.clone()),
            Some(other) if other != hash => result.changed.push(path.clone()),
            Some(_) => {}
        }
    }

    result.removed = destination
        .keys()
        .filter(|path| !source.contains_key(*path))
        .cloned()
        .collect();

    result
}

/// Builds a unified diff from `old` to `new` with `a/` and `b/` headers.
pub fn unified_diff(path: &str, old: &str, new: &str) -> String {
    let patch = diffy::create_patch(old, new).to_string();
    let body = patch
        .split_inclusive('\n')
        .skip_while(|line| line.starts_with("--- ") || line.starts_with("+++ "))
        .collect::<String>();
    format!("--- a/{path}\n+++ b/{path}\n{body}")
}

/// Compares the rendered `templates/src` and `templates/dst` trees of a workspace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    print_added: bool,
    print_removed: bool,
}

impl Reconciler {
    pub fn new(print_added: bool, print_removed: bool) -> Self {
        Self {
            print_added,
            print_removed,
        }
    }

    /// Runs the comparison.
    ///
    /// Unless `preserve_labels` is set, churn-only labels are stripped from
    /// the rendered files first. Both trees are then hashed concurrently.
    pub async fn execute(
        &self,
        workspace: &Path,
        preserve_labels: bool,
    ) -> Result<ComparisonResult> {
        let source_root = templates_dir(workspace, Revision::Source);
        let destination_root = templates_dir(workspace, Revision::Destination);

        if !preserve_labels {
            let templates = workspace.join("templates");
            tokio::task::spawn_blocking(move || strip_labels_in_tree(&templates)).await??;
        }

        let (source, destination) = tokio::try_join!(
            scan(source_root.clone()),
            scan(destination_root.clone())
        )?;
        debug!(
            "Scanned {} source and {} destination file(s)",
            source.len(),
            destination.len()
        );

        let classification = classify(&source, &destination);
        let result = self.build_result(classification, &source_root, &destination_root)?;

        info!(
            "{} added, {} removed, {} changed",
            result.added.len(),
            result.removed.len(),
            result.changed.len()
        );
        Ok(result)
    }

    fn build_result(
        &self,
        classification: Classification,
        source_root: &Path,
        destination_root: &Path,
    ) -> Result<ComparisonResult> {
        let mut result = ComparisonResult::default();

        for path in classification.added {
            result.added.push(if self.print_added {
                FileEntry::with_content(&path, read_text(&source_root.join(&path))?)
            } else {
                FileEntry::path_only(path)
            });
        }

        for path in classification.removed {
            result.removed.push(if self.print_removed {
                FileEntry::with_content(&path, read_text(&destination_root.join(&path))?)
            } else {
                FileEntry::path_only(path)
            });
        }

        for path in classification.changed {
            let old = read_text(&destination_root.join(&path))?;
            let new = read_text(&source_root.join(&path))?;
            let diff = unified_diff(&path, &old, &new);
            result.changed.push(FileEntry::with_content(path, diff));
        }

        Ok(result)
    }
}

async fn scan(root: PathBuf) -> Result<TreeHashes> {
    tokio::task::spawn_blocking(move || hash_tree(&root)).await?
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| CompareError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
