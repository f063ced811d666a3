use std::path::PathBuf;
use thiserror::Error;

use crate::compare::CompareError;
use crate::gitops::{GitOpsError, InvalidFile};
use crate::output::OutputError;
use crate::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum ArgoCompareError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Repository error: {0}")]
    GitOps(#[from] GitOpsError),

    #[error("Render pipeline failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Comparison failed: {0}")]
    Compare(#[from] CompareError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Failed to create workspace in '{path}': {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} file(s) were invalid", .0.len())]
    InvalidFiles(Vec<InvalidFile>),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Target branch must not be empty")]
    MissingTargetBranch,

    #[error("Chart cache directory is not configured")]
    MissingCacheDir,

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid repository credentials in '{variable}': {message}")]
    InvalidCredentials { variable: String, message: String },

    #[error("Unknown output '{0}', expected 'console' or 'gitlab'")]
    UnknownOutput(String),
}

pub type Result<T> = std::result::Result<T, ArgoCompareError>;
