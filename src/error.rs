//! Error types for tlc-ingest
//!
//! The pipeline has a closed set of failure kinds, one per phase that can
//! fail: configuration (validation), connectivity (network or database
//! reachability), schema (table initialization), and ingestion (a chunk
//! append). All public APIs return `Result<T, Error>` where Error is
//! defined here.

use thiserror::Error;

/// The main error type for tlc-ingest
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected arguments: year, month, or chunk size out of range, or a
    /// credential the connection string cannot carry.
    #[error("Configuration error: {message}")]
    Config {
        /// What was rejected and why
        message: String,
    },

    /// The database could not be reached, the dataset could not be
    /// downloaded, or the payload is not a readable dataset.
    #[error("Connectivity error: {message}")]
    Connectivity {
        /// What could not be reached
        message: String,
    },

    /// Creating the destination table from the first chunk failed.
    #[error("Table initialization failed for '{table}': {message}")]
    Schema {
        /// Destination table name
        table: String,
        /// What went wrong
        message: String,
    },

    /// Appending a chunk after the first failed. Chunks committed before
    /// this one stay committed; later chunks were never attempted.
    #[error("Ingestion failed at chunk {chunk}: {message}")]
    Ingestion {
        /// 1-based index of the failing chunk
        chunk: usize,
        /// What went wrong
        message: String,
    },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connectivity error
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    /// Create a schema error for the given table
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an ingestion error for the given 1-based chunk index
    pub fn ingestion(chunk: usize, message: impl Into<String>) -> Self {
        Self::Ingestion {
            chunk,
            message: message.into(),
        }
    }
}

/// Result type alias for tlc-ingest
pub type Result<T> = std::result::Result<T, Error>;
