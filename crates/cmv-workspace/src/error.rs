//! Error types for the workspace service layer.

use std::path::PathBuf;

use cmv_core::{CoreError, ViewId};
use cmv_views::{ValidationError, ViewError};

/// Workspace error type wrapping the view, dataset and I/O failures that
/// reach the CLI.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("View not found: {0}")]
    ViewNotFound(ViewId),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Failed to read file: {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
