// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # tlc-ingest
//!
//! Batch loader for the NYC TLC yellow-taxi trip records: downloads one
//! monthly parquet file over HTTPS and writes it into a PostgreSQL table
//! in fixed-size row chunks.
//!
//! ## Behavior
//!
//! - The run validates its arguments before any network work.
//! - The first chunk replaces the destination table; every later chunk is
//!   appended in its own transaction.
//! - A failure stops the run where it is. Chunks committed before the
//!   failure stay committed, later chunks are never read.
//!
//! ## Pipeline
//!
//! ```text
//! CLI args ──▶ validate ──▶ connect ──▶ download ──▶ chunk ──▶ write
//!   (cli)      (config)   (database)    (fetch)    (dataset)  (ingest)
//!                                                      │
//!                                              schema: Arrow types
//!                                              mapped to Postgres once,
//!                                              from the first chunk
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the pipeline
pub mod error;

/// Run configuration and validation
pub mod config;

/// Dataset and database endpoint builders
pub mod endpoint;

/// HTTP download of the monthly dataset
pub mod fetch;

/// Chunked parquet reading
pub mod dataset;

/// Arrow-to-PostgreSQL column typing
pub mod schema;

/// PostgreSQL sink
pub mod database;

/// The chunk-by-chunk ingestion loop
pub mod ingest;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{DatabaseConfig, IngestConfig};
pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
