use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No cached archive for chart '{chart}' version '{revision}' in '{directory}'")]
    NotFound {
        chart: String,
        revision: String,
        directory: PathBuf,
    },

    #[error(
        "Ambiguous cache state for chart '{chart}' version '{revision}': {} archives match ({})",
        .matches.len(),
        .matches.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
    )]
    Ambiguous {
        chart: String,
        revision: String,
        matches: Vec<PathBuf>,
    },

    #[error("Invalid archive name pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Failed to create cache directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read cache directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write archive '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid archive file name '{0}'")]
    InvalidFileName(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
