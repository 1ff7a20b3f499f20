use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("dataset '{dataset}' not found at {}", path.display())]
    DatasetNotFound { dataset: String, path: PathBuf },

    #[error("dataset '{dataset}' does not match its schema: {detail}")]
    SchemaMismatch { dataset: String, detail: String },

    #[error("table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("failed to write {}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid financial event: {0}")]
    InvalidEvent(String),
}

impl PipelineError {
    pub fn schema(dataset: &str, detail: impl Into<String>) -> Self {
        PipelineError::SchemaMismatch {
            dataset: dataset.to_string(),
            detail: detail.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        PipelineError::WriteError {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
