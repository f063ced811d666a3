//! GitOps-specific error types.

use thiserror::Error;

/// Errors that can occur while reading the repository or resolving changes.
#[derive(Error, Debug)]
pub enum GitOpsError {
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Failed to resolve reference '{reference}': {message}")]
    RefNotFound { reference: String, message: String },

    #[error("Git operation failed: {0}")]
    GitOperation(String),

    #[error("Unexpected git output: {0}")]
    UnexpectedOutput(String),

    #[error("Path '{path}' in tree {tree} is not a file")]
    NotABlob { tree: String, path: String },

    #[error("Invalid manifest '{path}': {source}")]
    Manifest {
        path: String,
        #[source]
        source: ManifestError,
    },
}

/// Outcome of validating a single manifest blob.
///
/// Variants fall into three groups, see [`ManifestError::disposition`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("file is empty")]
    Empty,

    #[error("not an Application (kind '{kind}')")]
    NotApplication { kind: String },

    #[error("failed to decode YAML: {0}")]
    Decode(String),

    #[error("both 'source' and 'sources' are set")]
    ConflictingSources,

    #[error("unsupported configuration: neither 'source' nor 'sources' is set")]
    MissingSource,

    #[error("unsupported configuration: source '{repo_url}' has no chart name")]
    EmptyChartName { repo_url: String },
}

/// How the resolver treats a [`ManifestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestDisposition {
    /// Not an Application at all; dropped silently.
    Skip,
    /// Recorded in the invalid-files list, processing continues.
    Invalid,
    /// Aborts the whole run before any rendering.
    Fatal,
}

impl ManifestError {
    pub fn disposition(&self) -> ManifestDisposition {
        match self {
            ManifestError::NotApplication { .. } => ManifestDisposition::Skip,
            ManifestError::ConflictingSources => ManifestDisposition::Fatal,
            ManifestError::Empty
            | ManifestError::Decode(_)
            | ManifestError::MissingSource
            | ManifestError::EmptyChartName { .. } => ManifestDisposition::Invalid,
        }
    }
}

impl From<std::io::Error> for GitOpsError {
    fn from(err: std::io::Error) -> Self {
        GitOpsError::GitOperation(err.to_string())
    }
}

/// Classifies a failed `rev-parse` into a missing-reference error when possible.
pub fn classify_rev_parse_error(reference: &str, stderr: &str) -> GitOpsError {
    let lower = stderr.to_lowercase();

    if lower.contains("not a git repository") {
        return GitOpsError::NotARepository(stderr.trim().to_string());
    }

    if lower.contains("unknown revision")
        || lower.contains("needed a single revision")
        || lower.contains("bad revision")
        || lower.contains("ambiguous argument")
    {
        return GitOpsError::RefNotFound {
            reference: reference.to_string(),
            message: stderr.trim().to_string(),
        };
    }

    GitOpsError::GitOperation(stderr.trim().to_string())
}

/// Result type for GitOps operations.
pub type Result<T> = std::result::Result<T, GitOpsError>;
