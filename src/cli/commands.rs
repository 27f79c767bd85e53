//! CLI arguments and environment fallbacks
//!
//! Every option has a built-in default; the five `--db-*` options also
//! fall back to `DB_*` environment variables, with an explicit flag
//! winning over the environment.

use crate::config::{DatabaseConfig, IngestConfig};
use clap::{Parser, ValueEnum};

const EXAMPLES: &str = "\
Examples:
  # Ingest January 2021 into a local postgres with the defaults
  tlc-ingest --year 2021 --month 1

  # Credentials from the environment
  DB_USER=loader DB_PASSWORD=secret tlc-ingest --year 2019 --month 6 --db-name warehouse

  # Smaller transactions
  tlc-ingest --year 2021 --month 1 --chunk-size 50000
";

/// Ingest one month of NYC yellow-taxi trip data into PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "tlc-ingest")]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
pub struct Cli {
    /// Dataset year
    #[arg(long, default_value_t = 2021)]
    pub year: i32,

    /// Dataset month (1-12)
    #[arg(long, default_value_t = 1)]
    pub month: u32,

    /// Rows per chunk, and per transaction
    #[arg(long, default_value_t = 100_000, allow_negative_numbers = true)]
    pub chunk_size: i64,

    /// Destination table name
    #[arg(long, default_value = "yellow_taxi_data")]
    pub table_name: String,

    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value = "5432")]
    pub db_port: String,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "root")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "root")]
    pub db_password: String,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "ny_taxi")]
    pub db_name: String,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info, ignore_case = true)]
    pub log_level: LogLevel,
}

impl Cli {
    /// Collect the resolved options into one run configuration.
    pub fn to_config(&self) -> IngestConfig {
        IngestConfig {
            year: self.year,
            month: self.month,
            chunk_size: self.chunk_size,
            table_name: self.table_name.clone(),
            database: DatabaseConfig {
                host: self.db_host.clone(),
                port: self.db_port.clone(),
                user: self.db_user.clone(),
                password: self.db_password.clone(),
                database: self.db_name.clone(),
            },
        }
    }
}

/// Log verbosity accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Everything, including per-chunk detail
    Debug,
    /// Run milestones (default)
    Info,
    /// Problems that did not stop the run
    Warning,
    /// Failures only
    Error,
}

impl LogLevel {
    /// Directive understood by the tracing filter
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}
