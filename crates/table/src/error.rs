use thiserror::Error;

/// Result type for table operations
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors that can occur while normalizing a raw export
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A row carries more cells than the header declares columns
    #[error("Row {row} has {found} cells but the header declares {expected} columns")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Unknown canonical field name (config or CLI input)
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Invalid normalizer configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TableError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
