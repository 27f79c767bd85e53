//! Destination table typing
//!
//! Maps the dataset's Arrow schema onto PostgreSQL column types once,
//! from the first chunk, and reuses that mapping to coerce every chunk
//! before it is written.
//!
//! # Rules
//!
//! - **Datetime columns**: the pickup and dropoff timestamps become
//!   `TIMESTAMP` whatever the file stores them as (parquet timestamps or
//!   plain strings)
//! - **Numeric widening**: small integers widen to `INTEGER`, 64-bit and
//!   unsigned ones to `BIGINT`
//! - **Unsupported types**: nested or otherwise unmappable columns fail
//!   table planning up front

mod plan;

pub use plan::{ColumnPlan, PgType, TablePlan, DATETIME_COLUMNS};
