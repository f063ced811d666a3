//! Git fixture for isolated test execution.
//!
//! `GitFixture` owns a temporary repository. Tests write manifests, commit
//! them and point `refs/remotes/origin/<branch>` at a commit, which is all the
//! resolver needs to compare HEAD against a target branch.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use argo_compare::{ChangeSetResolver, GitRepository};

/// A throwaway git repository.
pub struct GitFixture {
    temp_dir: TempDir,
}

impl GitFixture {
    /// Initializes an empty repository.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let fixture = Self { temp_dir };
        fixture.git(&["init", "-q"]);
        fixture
    }

    /// Returns the repository root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a file relative to the repository root, creating parents.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Removes a file relative to the repository root.
    pub fn remove(&self, relative: &str) {
        std::fs::remove_file(self.path().join(relative)).expect("Failed to remove file");
    }

    /// Stages everything and commits it.
    pub fn commit(&self, message: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "--allow-empty", "-m", message]);
    }

    /// Points `origin/<branch>` at the current HEAD.
    pub fn mark_remote(&self, branch: &str) {
        let reference = format!("refs/remotes/origin/{}", branch);
        self.git(&["update-ref", &reference, "HEAD"]);
    }

    pub fn repository(&self) -> GitRepository {
        GitRepository::new(self.path())
    }

    pub fn resolver(&self) -> ChangeSetResolver {
        ChangeSetResolver::new(self.repository())
    }

    /// Runs git in the repository and panics on failure.
    pub fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .current_dir(self.path())
            .args([
                "-c",
                "user.email=test@test.com",
                "-c",
                "user.name=Test",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "init.defaultBranch=main",
            ])
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

impl Default for GitFixture {
    fn default() -> Self {
        Self::new()
    }
}
