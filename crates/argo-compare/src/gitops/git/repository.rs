//! Git repository operations.

use std::path::{Path, PathBuf};
use std::process::Output;

use super::parse::{parse_diff_tree, parse_ls_tree};
use super::types::TreeChange;
use crate::gitops::error::{classify_rev_parse_error, GitOpsError, Result};
use crate::process::{format_output_error, run_in};

/// Default name of the remote that tracks target branches.
pub const DEFAULT_REMOTE: &str = "origin";

/// Read-only access to the object store of a git repository.
pub struct GitRepository {
    /// Path to the repository work tree.
    repo_path: PathBuf,
    /// Remote used to resolve target branches.
    remote: String,
}

impl GitRepository {
    /// Creates a new git repository handle.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    /// Opens the repository containing `start`.
    pub fn discover(start: &Path) -> Result<Self> {
        let output = run_in(start, "git", &["rev-parse", "--show-toplevel"])?;
        if !output.status.success() {
            return Err(GitOpsError::NotARepository(format_output_error(&output)));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self::new(root))
    }

    /// Returns the repository path.
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Checks if the directory is a git repository.
    pub fn is_git_repo(&self) -> bool {
        self.repo_path.join(".git").exists()
    }

    /// Returns the full remote-tracking reference for a branch.
    pub fn remote_branch_ref(&self, branch: &str) -> String {
        format!("refs/remotes/{}/{}", self.remote, branch)
    }

    /// Resolves any revision to a commit id.
    pub fn resolve_commit(&self, reference: &str) -> Result<String> {
        let spec = format!("{}^{{commit}}", reference);
        let output = self.run_git(&["rev-parse", "--verify", &spec])?;

        if !output.status.success() {
            return Err(classify_rev_parse_error(
                reference,
                &format_output_error(&output),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Resolves the current HEAD to a commit id.
    pub fn head_commit(&self) -> Result<String> {
        self.resolve_commit("HEAD")
    }

    /// Resolves `refs/remotes/<remote>/<branch>` to a commit id.
    pub fn remote_branch_commit(&self, branch: &str) -> Result<String> {
        self.resolve_commit(&self.remote_branch_ref(branch))
    }

    /// Returns the tree id of a commit.
    pub fn tree_of(&self, commit: &str) -> Result<String> {
        let spec = format!("{}^{{tree}}", commit);
        let output = self.run_git(&["rev-parse", "--verify", &spec])?;

        if !output.status.success() {
            return Err(classify_rev_parse_error(commit, &format_output_error(&output)));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Lists paths that differ between two trees, recursively.
    pub fn diff_trees(&self, old_tree: &str, new_tree: &str) -> Result<Vec<TreeChange>> {
        let output = self.run_git(&[
            "diff-tree",
            "-r",
            "-z",
            "--name-status",
            "--no-renames",
            old_tree,
            new_tree,
        ])?;

        if !output.status.success() {
            return Err(GitOpsError::GitOperation(format_output_error(&output)));
        }

        parse_diff_tree(&output.stdout)
    }

    /// Reads a file from a tree.
    ///
    /// Returns `Ok(None)` when the path does not exist in the tree.
    pub fn read_blob(&self, tree: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let output = self.run_git(&["--literal-pathspecs", "ls-tree", "-z", tree, "--", path])?;

        if !output.status.success() {
            return Err(GitOpsError::GitOperation(format_output_error(&output)));
        }

        let entries = parse_ls_tree(&output.stdout)?;
        let entry = match entries.into_iter().find(|e| e.path == path) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if !entry.is_blob() {
            return Err(GitOpsError::NotABlob {
                tree: tree.to_string(),
                path: path.to_string(),
            });
        }

        let output = self.run_git(&["cat-file", "blob", &entry.object_id])?;
        if !output.status.success() {
            return Err(GitOpsError::GitOperation(format_output_error(&output)));
        }

        Ok(Some(output.stdout))
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    /// Runs a git command in the repository directory.
    fn run_git(&self, args: &[&str]) -> Result<Output> {
        run_in(&self.repo_path, "git", args).map_err(|e| GitOpsError::GitOperation(e.to_string()))
    }
}
