//! Error types

/// Errors raised while configuring a table or reading an export back.
///
/// Filtering, sorting, windowing and exporting never fail on bad field
/// data; those paths degrade to the placeholder instead. Only the
/// configuration surface and the export parser return this type.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Two columns in one registry share a key.
    #[error("Duplicate column key '{key}'")]
    DuplicateColumn { key: String },

    /// A column definition cannot be used.
    #[error("Invalid column '{key}': {reason}")]
    InvalidColumn { key: String, reason: String },

    /// The table configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An export being read back does not match the column registry.
    #[error("Export does not match columns: expected {expected:?}, got {actual:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl GridError {
    /// Creates a new invalid column error.
    pub fn invalid_column(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidColumn {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result alias for fallible grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
