//! PostgreSQL output
//!
//! [`TableSink`] is the seam between chunk production and the database.
//! The production implementation is [`PostgresSink`]: one sqlx connection,
//! one transaction per chunk.

mod sink;

pub use sink::{PostgresSink, TableSink};
