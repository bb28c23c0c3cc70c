use std::path::PathBuf;

use thiserror::Error;

use crate::model::codec::ModelError;
use crate::model::PredictError;

/// Broad failure classes reported to the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    InputNotFound,
    ModelLoad,
    Data,
    Validation,
    Prediction,
}

/// Every way a prediction run can fail.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Argument(String),

    #[error("input CSV not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error(
        "unable to load model: attempted paths: {}. Exception: {source}",
        format_paths(.attempted)
    )]
    ModelLoad {
        attempted: Vec<PathBuf>,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    Data(#[from] anyhow::Error),

    #[error("no rows after removing incomplete rows")]
    NoCompleteRows,

    #[error(transparent)]
    Prediction(#[from] PredictError),

    #[error("unexpected class code {0}: no label is mapped to it")]
    UnknownClass(i64),
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::Argument(_) => ErrorKind::Argument,
            RunError::InputNotFound(_) => ErrorKind::InputNotFound,
            RunError::ModelLoad { .. } => ErrorKind::ModelLoad,
            RunError::Data(_) => ErrorKind::Data,
            RunError::NoCompleteRows => ErrorKind::Validation,
            RunError::Prediction(_) | RunError::UnknownClass(_) => ErrorKind::Prediction,
        }
    }

    /// One-line message for the error envelope. Data errors flatten their
    /// context chain so the underlying reason is visible.
    pub fn message(&self) -> String {
        match self {
            RunError::Data(inner) => format!("{inner:#}"),
            other => other.to_string(),
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    let quoted: Vec<String> = paths.iter().map(|p| format!("'{}'", p.display())).collect();
    format!("[{}]", quoted.join(", "))
}
