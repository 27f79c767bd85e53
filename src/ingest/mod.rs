//! Ingestion loop
//!
//! Drives chunks from a [`DatasetReader`] into a [`TableSink`]. The first
//! chunk travels with table creation in a single transaction; every chunk
//! after it is appended in its own transaction. The loop stops at the
//! first failure, leaving earlier chunks committed and later chunks
//! unread.

mod progress;

use crate::database::TableSink;
use crate::dataset::{DatasetReader, RowChunk};
use crate::error::Result;
use crate::schema::TablePlan;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Rows written across all chunks
    pub rows_written: u64,
    /// Chunks written, counting the one that rode table creation
    pub chunks_written: u64,
    /// Wall-clock time for the whole loop
    pub elapsed: Duration,
}

/// Stream every chunk of `reader` into `sink` under `plan`.
///
/// The destination table is created (replacing any previous one) even
/// when the dataset has no rows at all.
pub async fn run<S: TableSink>(
    sink: &mut S,
    reader: &mut DatasetReader,
    plan: &TablePlan,
) -> Result<IngestReport> {
    let start = Instant::now();

    info!(
        total_rows = reader.total_rows(),
        expected_chunks = reader.expected_chunks(),
        "starting ingestion"
    );
    let pb = progress::create_chunk_progress(
        reader.expected_chunks(),
        &format!("Ingesting into {}", plan.table()),
    );

    let mut rows_written = 0u64;
    let mut chunks_written = 0u64;

    let first = match reader.next().transpose()? {
        Some(chunk) => Some(coerced(plan, chunk)?),
        None => None,
    };
    let had_first = first.is_some();
    rows_written += sink.create_table(plan, first.as_ref()).await?;
    if had_first {
        chunks_written += 1;
        pb.inc(1);
    }

    while let Some(chunk) = reader.next().transpose()? {
        let chunk = coerced(plan, chunk)?;
        rows_written += sink.append(plan, &chunk).await?;
        chunks_written += 1;
        pb.inc(1);
        debug!(chunk = chunk.index, rows_written, "chunk committed");
    }

    pb.finish_and_clear();

    let report = IngestReport {
        rows_written,
        chunks_written,
        elapsed: start.elapsed(),
    };

    info!(
        rows = report.rows_written,
        chunks = report.chunks_written,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "ingestion complete"
    );

    Ok(report)
}

/// Apply the plan's column coercions, keeping the chunk's index.
fn coerced(plan: &TablePlan, chunk: RowChunk) -> Result<RowChunk> {
    Ok(RowChunk {
        index: chunk.index,
        batch: plan.coerce(&chunk.batch)?,
    })
}
