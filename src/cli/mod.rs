//! CLI module
//!
//! Argument parsing plus the runner that drives a single ingestion:
//! validate, connect, download, create the table, append chunks.

mod commands;
mod runner;

pub use commands::{Cli, LogLevel};
pub use runner::Runner;
