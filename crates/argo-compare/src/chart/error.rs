use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch chart '{chart}' version '{revision}' from '{repo}': {message}")]
    Fetch {
        repo: String,
        chart: String,
        revision: String,
        message: String,
    },

    #[error("Fetch of chart '{chart}' produced no archive in '{directory}'")]
    NoArchive { chart: String, directory: PathBuf },

    #[error("Failed to extract archive '{archive}': {source}")]
    Extract {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Chart '{chart}' not found in extracted archive at '{directory}'")]
    ChartDirMissing { chart: String, directory: PathBuf },

    #[error("Rendering release '{release}' failed: {stderr}")]
    Render { release: String, stderr: String },

    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ChartError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChartError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
