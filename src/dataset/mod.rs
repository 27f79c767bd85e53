//! Chunked reading of a parquet payload
//!
//! The downloaded file is held in memory as [`bytes::Bytes`]; the parquet
//! footer gives the exact row count before any data is decoded, and the
//! reader re-slices record batches so every produced chunk except the
//! last holds exactly `chunk_size` rows regardless of the file's
//! row-group layout.

mod reader;

pub use reader::{DatasetReader, RowChunk};
