use crate::model::FileStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("settings error: {0}")]
    Settings(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("name generation failed: {0}")]
    Generation(String),
    #[error("rename failed: {0}")]
    Rename(String),
    #[error("no free name found for {target} after {attempts} attempts")]
    CollisionExhausted { target: String, attempts: usize },
    #[error("cannot {operation} a file in state {status:?}")]
    InvalidTransition {
        operation: &'static str,
        status: FileStatus,
    },
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}
