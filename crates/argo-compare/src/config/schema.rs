use std::path::{Path, PathBuf};
use std::sync::Arc;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Where comparison results are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    #[default]
    Console,
    GitLab,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Console => write!(f, "console"),
            OutputKind::GitLab => write!(f, "gitlab"),
        }
    }
}

impl std::str::FromStr for OutputKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(OutputKind::Console),
            "gitlab" => Ok(OutputKind::GitLab),
            _ => Err(ConfigError::UnknownOutput(s.to_string())),
        }
    }
}

/// Credentials for one chart repository.
#[derive(Debug)]
pub struct RepoCredentials {
    /// Repository URL, matched exactly against `repoURL`.
    pub url: String,
    pub username: String,
    pub password: SecretString,
}

/// The credential set available to chart fetches.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    entries: Arc<Vec<RepoCredentials>>,
}

impl CredentialStore {
    pub fn new(entries: Vec<RepoCredentials>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Finds credentials by exact repository URL.
    pub fn find(&self, repo_url: &str) -> Option<&RepoCredentials> {
        self.entries.iter().find(|c| c.url == repo_url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a comparison run needs, passed explicitly to the engine.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Branch on the remote to compare HEAD against.
    pub target_branch: String,
    /// Repository-relative paths excluded from the change set.
    pub ignore: Vec<String>,
    /// Restricts the run to a single changed manifest.
    pub file: Option<String>,
    /// Directory holding downloaded chart archives.
    pub cache_dir: PathBuf,
    /// Base directory for per-application workspaces. Defaults to the OS temp dir.
    pub tmp_dir: Option<PathBuf>,
    /// Keep Helm-injected labels when hashing rendered files.
    pub preserve_helm_labels: bool,
    /// Show content of rendered files that only exist in HEAD.
    pub print_added_manifests: bool,
    /// Show content of rendered files that only exist in the target branch.
    pub print_removed_manifests: bool,
    /// Program fed each diff on stdin instead of printing it.
    pub external_diff_tool: Option<String>,
    pub output: OutputKind,
    pub credentials: CredentialStore,
}

impl RunConfig {
    /// Creates a config with defaults for everything but the branch and cache.
    pub fn new(target_branch: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_branch: target_branch.into(),
            ignore: Vec::new(),
            file: None,
            cache_dir: cache_dir.into(),
            tmp_dir: None,
            preserve_helm_labels: false,
            print_added_manifests: false,
            print_removed_manifests: false,
            external_diff_tool: None,
            output: OutputKind::Console,
            credentials: CredentialStore::default(),
        }
    }

    /// Rejects incomplete configuration and prepares required directories.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_branch.trim().is_empty() {
            return Err(ConfigError::MissingTargetBranch);
        }

        if self.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingCacheDir);
        }

        ensure_directory(&self.cache_dir)?;
        if let Some(tmp_dir) = &self.tmp_dir {
            ensure_directory(tmp_dir)?;
        }

        Ok(())
    }

    /// Returns the base directory for workspaces.
    pub fn workspace_base(&self) -> PathBuf {
        self.tmp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn ensure_directory(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|e| ConfigError::CreateDirectory {
        path: path.to_path_buf(),
        source: e,
    })
}
