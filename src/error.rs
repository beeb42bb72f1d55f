use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

/// Result alias used by every hook.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Everything that can go wrong between loading a model and encoding a response.
///
/// The adapter never recovers locally: each variant is surfaced to the host.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The model artifact could not be read from disk.
    #[error("failed to load model artifact {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact was read but is corrupt or internally inconsistent.
    #[error("invalid model artifact: {0}")]
    InvalidModel(String),

    #[error("{0}")]
    UnsupportedContentType(String),

    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// A column required by the preprocessor is absent from the request headers.
    #[error("column not found in request headers: '{0}'")]
    MissingColumn(String),

    /// Column labels must be unique, or projection would be ambiguous.
    #[error("header '{0}' appears more than once in the request")]
    DuplicateHeader(String),

    #[error("row {row} has {found} values but {expected} headers were given")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column '{column}', row {row}: {reason}")]
    InvalidFeature {
        column: String,
        row: usize,
        reason: String,
    },

    #[error("feature table error: {0}")]
    Arrow(#[from] ArrowError),
}

impl AdapterError {
    pub(crate) fn invalid_model(msg: impl Into<String>) -> Self {
        AdapterError::InvalidModel(msg.into())
    }

    pub(crate) fn invalid_feature(column: &str, row: usize, reason: impl Into<String>) -> Self {
        AdapterError::InvalidFeature {
            column: column.to_string(),
            row,
            reason: reason.into(),
        }
    }
}
