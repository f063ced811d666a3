//! Resolves which Application manifests changed between HEAD and a target branch.

use log::{debug, info, warn};
use serde::Serialize;

use super::error::{GitOpsError, ManifestDisposition, ManifestError, Result};
use super::git::repository::GitRepository;
use super::git::types::ChangeKind;
use super::resource::{is_manifest_path, Application};
use super::validation::parse_application;

/// A changed manifest that parsed into a valid Application.
#[derive(Debug, Clone)]
pub struct ChangedApplication {
    /// Repository-relative path.
    pub path: String,
    /// The application as of HEAD.
    pub application: Application,
}

/// A changed manifest that looked like YAML but failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidFile {
    pub path: String,
    pub reason: String,
}

impl InvalidFile {
    pub fn new(path: impl Into<String>, error: &ManifestError) -> Self {
        Self {
            path: path.into(),
            reason: error.to_string(),
        }
    }
}

impl std::fmt::Display for InvalidFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Result of resolving a change set.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// Valid, changed applications in diff order.
    pub applications: Vec<ChangedApplication>,
    /// Changed manifests that failed validation.
    pub invalid_files: Vec<InvalidFile>,
    /// Application manifests removed from HEAD. Never rendered.
    pub removed_files: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty() && self.invalid_files.is_empty()
    }
}

/// Classification of a single changed manifest.
#[derive(Debug)]
pub enum FileClassification {
    Application(Application),
    Invalid(ManifestError),
    NonApplication,
}

/// Classifies a manifest blob, failing only for configuration-fatal problems.
pub fn classify_manifest(path: &str, bytes: &[u8]) -> Result<FileClassification> {
    match parse_application(bytes) {
        Ok(app) => Ok(FileClassification::Application(app)),
        Err(err) => match err.disposition() {
            ManifestDisposition::Skip => Ok(FileClassification::NonApplication),
            ManifestDisposition::Invalid => Ok(FileClassification::Invalid(err)),
            ManifestDisposition::Fatal => Err(GitOpsError::Manifest {
                path: path.to_string(),
                source: err,
            }),
        },
    }
}

/// Computes change sets between HEAD and remote-tracking target branches.
pub struct ChangeSetResolver {
    repo: GitRepository,
}

impl ChangeSetResolver {
    pub fn new(repo: GitRepository) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &GitRepository {
        &self.repo
    }

    /// Lists changed Application manifests between HEAD and `origin/<target_branch>`.
    ///
    /// Paths in `ignore` are removed after classification and never appear in
    /// either result list.
    pub fn resolve(&self, target_branch: &str, ignore: &[String]) -> Result<ChangeSet> {
        let head_tree = self.repo.tree_of(&self.repo.head_commit()?)?;
        let target_tree = self.target_tree(target_branch)?;

        let changes = self.repo.diff_trees(&target_tree, &head_tree)?;
        debug!(
            "{} paths differ between HEAD and {}",
            changes.len(),
            self.repo.remote_branch_ref(target_branch)
        );

        let mut change_set = ChangeSet::default();

        for change in changes {
            let path = change.path().to_string();
            if !is_manifest_path(&path) {
                continue;
            }

            if change.kind() == ChangeKind::Removed {
                info!("Manifest '{}' was removed, nothing to render", path);
                change_set.removed_files.push(path);
                continue;
            }

            let bytes = match self.repo.read_blob(&head_tree, &path)? {
                Some(bytes) => bytes,
                None => {
                    return Err(GitOpsError::UnexpectedOutput(format!(
                        "'{}' is listed as changed but missing from HEAD",
                        path
                    )))
                }
            };

            match classify_manifest(&path, &bytes)? {
                FileClassification::Application(application) => {
                    debug!("Found changed application '{}' in {}", application.name(), path);
                    change_set
                        .applications
                        .push(ChangedApplication { path, application });
                }
                FileClassification::Invalid(err) => {
                    warn!("Skipping invalid manifest '{}': {}", path, err);
                    change_set.invalid_files.push(InvalidFile::new(path, &err));
                }
                FileClassification::NonApplication => {
                    debug!("Skipping '{}': not an Application", path);
                }
            }
        }

        apply_ignore_list(&mut change_set, ignore);

        info!(
            "Found {} changed application(s), {} invalid file(s)",
            change_set.applications.len(),
            change_set.invalid_files.len()
        );

        Ok(change_set)
    }

    /// Reads `path` as of the target branch.
    ///
    /// Returns `Ok(None)` when the file does not exist there, which means the
    /// application is new.
    pub fn content_at(&self, target_branch: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let target_tree = self.target_tree(target_branch)?;
        self.repo.read_blob(&target_tree, path)
    }

    fn target_tree(&self, target_branch: &str) -> Result<String> {
        let commit = self.repo.remote_branch_commit(target_branch)?;
        self.repo.tree_of(&commit)
    }
}

fn apply_ignore_list(change_set: &mut ChangeSet, ignore: &[String]) {
    if ignore.is_empty() {
        return;
    }

    change_set.applications.retain(|app| {
        let keep = !ignore.contains(&app.path);
        if !keep {
            info!("Ignoring '{}'", app.path);
        }
        keep
    });
    change_set
        .invalid_files
        .retain(|file| !ignore.contains(&file.path));
    change_set.removed_files.retain(|path| !ignore.contains(path));
}
