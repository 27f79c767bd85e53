//! Progress bar for the chunk loop
//!
//! Sized from the parquet footer's row count so the bar knows its length
//! before the first chunk is written.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar stepping once per committed chunk
pub fn create_chunk_progress(total_chunks: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_chunks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} chunks ({eta})")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
