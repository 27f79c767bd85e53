//! Exact-size chunk reader over an in-memory parquet file

use crate::error::{Error, Result};
use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use std::fmt;

/// An ordered slice of the dataset
#[derive(Debug, Clone)]
pub struct RowChunk {
    /// 1-based position of this chunk within the run
    pub index: usize,
    /// The rows in this chunk
    pub batch: RecordBatch,
}

impl RowChunk {
    /// Number of rows in this chunk
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }
}

/// Streaming reader that yields [`RowChunk`]s of exactly `chunk_size`
/// rows, except possibly the final chunk.
///
/// The underlying parquet reader is asked for `chunk_size` rows per
/// batch, but may come up short at row-group boundaries. Short batches
/// are buffered and re-sliced so interior chunks are never short.
pub struct DatasetReader {
    reader: ParquetRecordBatchReader,
    schema: SchemaRef,
    chunk_size: usize,
    total_rows: u64,
    pending: Vec<RecordBatch>,
    pending_rows: usize,
    next_index: usize,
    done: bool,
}

impl DatasetReader {
    /// Open a parquet payload for chunked reading.
    ///
    /// A payload that is not a readable parquet file is a connectivity
    /// error: the remote sent something other than the dataset.
    pub fn open(payload: Bytes, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk size must be a positive number of rows"));
        }

        let builder = ParquetRecordBatchReaderBuilder::try_new(payload).map_err(|e| {
            Error::connectivity(format!("payload is not a readable parquet file: {e}"))
        })?;

        let total_rows = builder.metadata().file_metadata().num_rows().max(0) as u64;
        let schema = builder.schema().clone();

        let reader = builder
            .with_batch_size(chunk_size)
            .build()
            .map_err(|e| Error::connectivity(format!("failed to open parquet payload: {e}")))?;

        Ok(Self {
            reader,
            schema,
            chunk_size,
            total_rows,
            pending: Vec::new(),
            pending_rows: 0,
            next_index: 1,
            done: false,
        })
    }

    /// Arrow schema of the file
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Total rows in the file, read from the parquet footer
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Number of chunks this file will produce
    pub fn expected_chunks(&self) -> u64 {
        self.total_rows.div_ceil(self.chunk_size as u64)
    }

    /// Take `take` rows off the front of the pending buffer.
    fn take_rows(&mut self, take: usize) -> Result<RecordBatch> {
        // Common case: the reader produced one batch of exactly the
        // right size and nothing is carried over.
        if self.pending.len() == 1 && self.pending[0].num_rows() == take {
            self.pending_rows -= take;
            if let Some(batch) = self.pending.pop() {
                return Ok(batch);
            }
        }

        let merged = concat_batches(&self.schema, &self.pending).map_err(|e| {
            Error::ingestion(self.next_index, format!("failed to assemble chunk: {e}"))
        })?;

        let chunk = merged.slice(0, take);
        let rest = merged.slice(take, merged.num_rows() - take);

        self.pending.clear();
        self.pending_rows = rest.num_rows();
        if self.pending_rows > 0 {
            self.pending.push(rest);
        }

        Ok(chunk)
    }
}

// The inner parquet reader has no Debug, so spell out the useful fields.
impl fmt::Debug for DatasetReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetReader")
            .field("chunk_size", &self.chunk_size)
            .field("total_rows", &self.total_rows)
            .field("next_index", &self.next_index)
            .field("pending_rows", &self.pending_rows)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Iterator for DatasetReader {
    type Item = Result<RowChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Buffer batches until a full chunk is available or input ends.
        while self.pending_rows < self.chunk_size {
            match self.reader.next() {
                Some(Ok(batch)) => {
                    self.pending_rows += batch.num_rows();
                    self.pending.push(batch);
                }
                Some(Err(e)) => {
                    // An undecodable page means the payload itself is bad,
                    // the same class of failure as a non-parquet download.
                    self.done = true;
                    return Some(Err(Error::connectivity(format!(
                        "failed to decode rows for chunk {}: {e}",
                        self.next_index
                    ))));
                }
                None => break,
            }
        }

        if self.pending_rows == 0 {
            self.done = true;
            return None;
        }

        let take = self.pending_rows.min(self.chunk_size);
        let batch = match self.take_rows(take) {
            Ok(batch) => batch,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let index = self.next_index;
        self.next_index += 1;
        Some(Ok(RowChunk { index, batch }))
    }
}
