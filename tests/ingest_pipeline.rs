//! Integration tests using a mock HTTP server
//!
//! Exercises the full flow short of a live database: download the monthly
//! parquet file, chunk it, plan the destination table, and drive every
//! chunk into a recording sink.

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use std::sync::Arc;
use tlc_ingest::database::TableSink;
use tlc_ingest::dataset::{DatasetReader, RowChunk};
use tlc_ingest::endpoint;
use tlc_ingest::error::{Error, Result};
use tlc_ingest::fetch::DatasetClient;
use tlc_ingest::ingest;
use tlc_ingest::schema::{PgType, TablePlan};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

/// A small yellow-taxi file shaped like the early monthly releases, with
/// the datetime columns stored as strings.
fn yellow_taxi_payload(rows: usize) -> Bytes {
    let schema = Arc::new(Schema::new(vec![
        Field::new("VendorID", DataType::Int64, true),
        Field::new("tpep_pickup_datetime", DataType::Utf8, true),
        Field::new("tpep_dropoff_datetime", DataType::Utf8, true),
        Field::new("passenger_count", DataType::Int64, true),
        Field::new("fare_amount", DataType::Float64, true),
    ]));

    let vendors = Int64Array::from_iter_values((0..rows).map(|i| 1 + (i % 2) as i64));
    let pickups = StringArray::from_iter_values(
        (0..rows).map(|i| format!("2021-01-01 {:02}:{:02}:00", i % 24, i % 60)),
    );
    let dropoffs = StringArray::from_iter_values(
        (0..rows).map(|i| format!("2021-01-01 {:02}:{:02}:30", i % 24, i % 60)),
    );
    let passengers = Int64Array::from_iter_values((0..rows).map(|i| 1 + (i % 4) as i64));
    let fares = Float64Array::from_iter_values((0..rows).map(|i| 5.0 + i as f64 * 0.25));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(vendors),
            Arc::new(pickups),
            Arc::new(dropoffs),
            Arc::new(passengers),
            Arc::new(fares),
        ],
    )
    .unwrap();

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    Bytes::from(buf)
}

/// Sink that records what would have been written
#[derive(Default)]
struct CollectingSink {
    created_types: Option<Vec<(String, PgType)>>,
    first_schema: Option<SchemaRef>,
    chunk_rows: Vec<(usize, usize)>,
}

#[async_trait]
impl TableSink for CollectingSink {
    async fn create_table(&mut self, plan: &TablePlan, first: Option<&RowChunk>) -> Result<u64> {
        assert!(self.created_types.is_none(), "create_table called twice");
        self.created_types = Some(
            plan.columns()
                .iter()
                .map(|c| (c.name.clone(), c.pg_type))
                .collect(),
        );

        let Some(chunk) = first else { return Ok(0) };
        self.first_schema = Some(chunk.batch.schema());
        self.chunk_rows.push((chunk.index, chunk.num_rows()));
        Ok(chunk.num_rows() as u64)
    }

    async fn append(&mut self, _plan: &TablePlan, chunk: &RowChunk) -> Result<u64> {
        self.chunk_rows.push((chunk.index, chunk.num_rows()));
        Ok(chunk.num_rows() as u64)
    }
}

async fn serve_parquet(server: &MockServer, url_path: &str, payload: Bytes) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "binary/octet-stream")
                .set_body_bytes(payload.to_vec()),
        )
        .mount(server)
        .await;
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_full_pipeline_downloads_chunks_and_writes() {
    let mock_server = MockServer::start().await;
    serve_parquet(
        &mock_server,
        "/trip-data/yellow_tripdata_2021-01.parquet",
        yellow_taxi_payload(250),
    )
    .await;

    let client = DatasetClient::new();
    let payload = client
        .download(&format!(
            "{}/trip-data/yellow_tripdata_2021-01.parquet",
            mock_server.uri()
        ))
        .await
        .unwrap();

    let mut reader = DatasetReader::open(payload, 100).unwrap();
    assert_eq!(reader.total_rows(), 250);
    assert_eq!(reader.expected_chunks(), 3);

    let plan = TablePlan::from_schema("yellow_taxi_data", reader.schema().as_ref()).unwrap();
    let mut sink = CollectingSink::default();

    let report = ingest::run(&mut sink, &mut reader, &plan).await.unwrap();

    assert_eq!(report.rows_written, 250);
    assert_eq!(report.chunks_written, 3);
    assert_eq!(sink.chunk_rows, vec![(1, 100), (2, 100), (3, 50)]);

    // The plan types every column, forcing the two datetime columns.
    let created = sink.created_types.unwrap();
    assert_eq!(
        created,
        vec![
            ("VendorID".to_string(), PgType::BigInt),
            ("tpep_pickup_datetime".to_string(), PgType::Timestamp),
            ("tpep_dropoff_datetime".to_string(), PgType::Timestamp),
            ("passenger_count".to_string(), PgType::BigInt),
            ("fare_amount".to_string(), PgType::DoublePrecision),
        ]
    );

    // Chunks arrive at the sink already cast to the planned Arrow types.
    let first_schema = sink.first_schema.unwrap();
    assert_eq!(
        first_schema.field(1).data_type(),
        &DataType::Timestamp(TimeUnit::Microsecond, None)
    );
    assert_eq!(
        first_schema.field(2).data_type(),
        &DataType::Timestamp(TimeUnit::Microsecond, None)
    );
}

#[tokio::test]
async fn test_missing_month_is_a_connectivity_error() {
    let mock_server = MockServer::start().await;
    serve_parquet(
        &mock_server,
        "/trip-data/yellow_tripdata_2021-01.parquet",
        yellow_taxi_payload(10),
    )
    .await;

    // February was never published on this server.
    let client = DatasetClient::new();
    let err = client
        .download(&format!(
            "{}/trip-data/yellow_tripdata_2021-02.parquet",
            mock_server.uri()
        ))
        .await
        .unwrap_err();

    match err {
        Error::Connectivity { message } => {
            assert!(message.contains("404"), "message: {message}");
        }
        other => panic!("expected connectivity error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_parquet_body_fails_before_any_write() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trip-data/yellow_tripdata_2021-01.parquet"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a parquet file</html>"))
        .mount(&mock_server)
        .await;

    let client = DatasetClient::new();
    let payload = client
        .download(&format!(
            "{}/trip-data/yellow_tripdata_2021-01.parquet",
            mock_server.uri()
        ))
        .await
        .unwrap();

    let err = DatasetReader::open(payload, 100_000).unwrap_err();
    assert!(
        matches!(err, Error::Connectivity { .. }),
        "got {err:?}"
    );
}

#[test]
fn test_dataset_url_matches_the_served_layout() {
    // The real endpoint and the mock serve the same path shape.
    let url = endpoint::dataset_url(2021, 1);
    assert!(url.ends_with("/trip-data/yellow_tripdata_2021-01.parquet"));
}
