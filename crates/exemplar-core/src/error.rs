use thiserror::Error;

/// Top-level error type for the Exemplar clustering engine.
///
/// Every variant except `Io` and `Serialization` is a configuration error:
/// the engine raises it before any matrix is allocated, so a failed call
/// never leaves a partial result behind.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExemplarError {
    #[error("Damping must lie in [0.5, 1.0), got {0}")]
    InvalidDamping(f64),

    #[error("Vector {index} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Precomputed matrix row {row} has {found} columns, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Metric requires feature vectors but none were supplied")]
    MissingVectors,

    #[error("Precomputed metric requires a similarity matrix")]
    MissingMatrix,

    #[error("Non-finite value at ({row}, {col})")]
    NonFinite { row: usize, col: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExemplarError {
    /// Whether this error was raised while validating inputs or parameters
    /// (as opposed to reading or writing files).
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Serialization(_))
    }
}

impl From<toml::de::Error> for ExemplarError {
    fn from(err: toml::de::Error) -> Self {
        ExemplarError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ExemplarError {
    fn from(err: toml::ser::Error) -> Self {
        ExemplarError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ExemplarError {
    fn from(err: serde_json::Error) -> Self {
        ExemplarError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Exemplar operations.
pub type Result<T> = std::result::Result<T, ExemplarError>;
