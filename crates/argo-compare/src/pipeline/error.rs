use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Chart '{chart}' has neither values nor valuesObject")]
    ValuesMissing { chart: String },

    #[error("Failed to serialize valuesObject for chart '{chart}': {source}")]
    SerializeValues {
        chart: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Chart error: {0}")]
    Chart(#[from] crate::chart::ChartError),

    #[error("Chart cache error: {0}")]
    Cache(#[from] crate::storage::CacheError),

    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
