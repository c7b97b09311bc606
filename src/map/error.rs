use thiserror::Error;

/// Errors raised at the boundary of the query engine (dataset and settings loading).
///
/// The engine itself never fails: unknown ramps, empty results and malformed
/// record values all degrade to defaults.
#[derive(Debug, Error)]
pub enum MapError {
    /// Reading a dataset or settings file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The dataset is structurally invalid (not a FeatureCollection, etc.)
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration error (invalid settings file shape, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Type alias for Results using MapError
pub type Result<T> = std::result::Result<T, MapError>;
