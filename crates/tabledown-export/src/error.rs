//! Export and settings errors.

use std::io;
use std::path::PathBuf;

use tabledown::TurndownError;

/// Why an export did not happen.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No active document")]
    NoActiveDocument,

    #[error("The active view is not in preview mode")]
    NotInPreviewMode,

    #[error("Invalid output path {path:?}: {reason}")]
    InvalidOutputPath { path: String, reason: &'static str },

    #[error("Failed to write {path}: {source}")]
    Persistence {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Conversion(#[from] TurndownError),
}

impl ExportError {
    /// The view was not in a state the command can run in. Nothing was touched.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ExportError::NoActiveDocument | ExportError::NotInPreviewMode)
    }
}

/// Failure loading or saving [`ExportSettings`](crate::ExportSettings)
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Cannot access settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
