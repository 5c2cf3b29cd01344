use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the food-orders pipeline.
#[derive(Error, Debug)]
pub enum EtlError {
    /// An input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input path or pattern matched no files.
    #[error("No input files match {0}")]
    InputNotFound(String),

    /// The input URI uses a scheme this build cannot read.
    #[error("Unsupported input scheme: {0}")]
    UnsupportedScheme(String),

    /// A row has fewer comma-separated fields than the stage requires.
    #[error("Malformed row at {location}: expected at least {required} fields, found {found}")]
    MalformedRow {
        location: String,
        found: usize,
        required: usize,
    },

    /// A JSON document (warehouse metadata or row file) could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The warehouse failed to read or write its storage.
    #[error("Warehouse I/O error at {path}: {source}")]
    Warehouse {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A dataset or table already exists where a fresh one was required.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The destination table does not exist and creation is not allowed.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The destination table already holds rows and the write requires it empty.
    #[error("Table is not empty: {0}")]
    TableNotEmpty(String),

    /// The destination table exists with a schema other than the order schema.
    #[error("Schema mismatch for table {0}")]
    SchemaMismatch(String),

    /// The run was cancelled before the named step started.
    #[error("Run interrupted before {0}")]
    Interrupted(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EtlError {
    /// Shorthand for a [`EtlError::MalformedRow`].
    pub fn malformed(location: impl Into<String>, found: usize, required: usize) -> Self {
        EtlError::MalformedRow {
            location: location.into(),
            found,
            required,
        }
    }
}

/// Convenience alias used throughout the food-orders crates.
pub type Result<T> = std::result::Result<T, EtlError>;
