//! HTTP download of the monthly dataset
//!
//! One GET per run: the payload is fetched fully into memory and handed
//! to the dataset reader. Failures of any kind here (bad URL, refused
//! connection, non-2xx status, interrupted body) are connectivity
//! errors.

mod client;

pub use client::{DatasetClient, DatasetClientConfig};
