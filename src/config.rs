//! Runtime configuration for an ingestion run
//!
//! The CLI layer resolves every option (explicit flag, environment
//! fallback, built-in default) into one immutable [`IngestConfig`] that
//! the rest of the pipeline receives by reference. Validation happens
//! here, before any network or database work.

use crate::error::{Error, Result};

/// First year of the monthly yellow-taxi series
pub const MIN_YEAR: i32 = 2009;

/// Last year accepted for ingestion
pub const MAX_YEAR: i32 = 2025;

/// Characters a connection string cannot carry in its credential parts
const URL_UNSAFE: [char; 3] = ['@', ':', '/'];

/// Connection settings for the destination database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,
    /// Database port, kept as text since it is only interpolated
    pub port: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Database name
    pub database: String,
}

/// Settings for one ingestion run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Dataset year
    pub year: i32,
    /// Dataset month (1-12)
    pub month: u32,
    /// Rows per chunk; signed so a negative argument reaches the
    /// validator instead of dying at the parser
    pub chunk_size: i64,
    /// Destination table name
    pub table_name: String,
    /// Destination database
    pub database: DatabaseConfig,
}

impl IngestConfig {
    /// Check the run parameters before any work starts.
    ///
    /// Boundary values are accepted: years 2009 and 2025, months 1 and 12,
    /// and a chunk size of one row are all valid.
    pub fn validate(&self) -> Result<()> {
        if self.year < MIN_YEAR || self.year > MAX_YEAR {
            return Err(Error::config(format!(
                "year {} is out of range ({MIN_YEAR}-{MAX_YEAR})",
                self.year
            )));
        }

        if self.month < 1 || self.month > 12 {
            return Err(Error::config(format!(
                "month {} is out of range (1-12)",
                self.month
            )));
        }

        if self.chunk_size <= 0 {
            return Err(Error::config("chunk size must be a positive number of rows"));
        }

        // The connection string interpolates credentials verbatim, so
        // reject values it cannot represent instead of producing a URL
        // that points somewhere else.
        if self.database.user.contains(URL_UNSAFE) {
            return Err(Error::config(
                "database user must not contain '@', ':' or '/'",
            ));
        }
        if self.database.password.contains(URL_UNSAFE) {
            return Err(Error::config(
                "database password must not contain '@', ':' or '/'",
            ));
        }

        Ok(())
    }
}
