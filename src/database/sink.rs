//! sqlx-backed PostgreSQL sink
//!
//! Writes planned chunks with multi-row INSERT statements, sub-batched so
//! each statement stays under the server's bind parameter cap. The first
//! chunk shares a transaction with DROP/CREATE; every later chunk gets its
//! own transaction, so a failure mid-run leaves earlier chunks committed.

use crate::config::DatabaseConfig;
use crate::dataset::RowChunk;
use crate::endpoint;
use crate::error::{Error, Result};
use crate::schema::{PgType, TablePlan};
use arrow::array::{
    Array, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray, TimestampMicrosecondArray,
};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder, Transaction};
use tracing::{debug, info};

/// Postgres caps a single statement at 65535 bind parameters.
const MAX_BIND_PARAMS: usize = 65_535;

/// Destination for planned chunks.
///
/// `create_table` runs exactly once, before any append, and replaces
/// whatever table existed under the plan's name. Later chunks go through
/// `append`, each in its own transaction.
#[async_trait]
pub trait TableSink: Send {
    /// Replace the destination table and write the first chunk, if any.
    /// Returns the number of rows written.
    async fn create_table(&mut self, plan: &TablePlan, first: Option<&RowChunk>) -> Result<u64>;

    /// Append one chunk. Returns the number of rows written.
    async fn append(&mut self, plan: &TablePlan, chunk: &RowChunk) -> Result<u64>;
}

/// [`TableSink`] writing through a single sqlx Postgres connection
pub struct PostgresSink {
    conn: PgConnection,
}

impl PostgresSink {
    /// Connect and verify the server answers before any work starts.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = endpoint::database_url(config);

        let mut conn = PgConnection::connect(&url).await.map_err(|e| {
            Error::connectivity(format!(
                "could not connect to postgres at {}:{}: {e}",
                config.host, config.port
            ))
        })?;

        conn.ping()
            .await
            .map_err(|e| Error::connectivity(format!("database did not answer a ping: {e}")))?;

        info!(
            host = %config.host,
            port = %config.port,
            database = %config.database,
            "database connection established"
        );

        Ok(Self { conn })
    }

    /// Close the connection cleanly. Failures are logged, not returned;
    /// every chunk is already committed by the time this runs.
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            debug!("connection close failed: {e}");
        }
    }
}

#[async_trait]
impl TableSink for PostgresSink {
    async fn create_table(&mut self, plan: &TablePlan, first: Option<&RowChunk>) -> Result<u64> {
        let table = plan.table();
        let ddl = create_table_ddl(plan);
        debug!(table, %ddl, "creating destination table");

        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| Error::schema(table, format!("failed to open transaction: {e}")))?;

        let drop_ddl = format!("DROP TABLE IF EXISTS {}", quote_ident(table));
        sqlx::query(&drop_ddl)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::schema(table, format!("failed to drop existing table: {e}")))?;

        sqlx::query(&ddl)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::schema(table, e.to_string()))?;

        let mut rows = 0;
        if let Some(chunk) = first {
            rows = insert_chunk(&mut tx, plan, &chunk.batch)
                .await
                .map_err(|e| Error::schema(table, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::schema(table, format!("failed to commit: {e}")))?;

        info!(table, rows, "table created");
        Ok(rows)
    }

    async fn append(&mut self, plan: &TablePlan, chunk: &RowChunk) -> Result<u64> {
        let mut tx = self.conn.begin().await.map_err(|e| {
            Error::ingestion(chunk.index, format!("failed to open transaction: {e}"))
        })?;

        let rows = insert_chunk(&mut tx, plan, &chunk.batch)
            .await
            .map_err(|e| Error::ingestion(chunk.index, e))?;

        tx.commit()
            .await
            .map_err(|e| Error::ingestion(chunk.index, format!("failed to commit: {e}")))?;

        debug!(chunk = chunk.index, rows, "chunk appended");
        Ok(rows)
    }
}

/// Typed view over one Arrow column for row-by-row binding
enum ColumnValues<'a> {
    BigInt(&'a Int64Array),
    Integer(&'a Int32Array),
    DoublePrecision(&'a Float64Array),
    Real(&'a Float32Array),
    Text(&'a StringArray),
    Boolean(&'a BooleanArray),
    Timestamp(&'a TimestampMicrosecondArray),
    Date(&'a Date32Array),
}

/// Write one chunk into the open transaction, splitting it into as many
/// INSERT statements as the bind parameter cap requires.
///
/// Errors come back as plain strings so each caller can attach its own
/// phase (schema for the first chunk, ingestion for the rest).
async fn insert_chunk(
    tx: &mut Transaction<'_, Postgres>,
    plan: &TablePlan,
    batch: &RecordBatch,
) -> std::result::Result<u64, String> {
    if batch.num_rows() == 0 {
        return Ok(0);
    }

    let columns = column_accessors(plan, batch)?;
    let prefix = insert_prefix(plan);
    let per_statement = rows_per_statement(plan.columns().len());

    let mut written = 0u64;
    let mut start = 0;
    while start < batch.num_rows() {
        let end = (start + per_statement).min(batch.num_rows());

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(&prefix);
        builder.push_values(start..end, |mut row, i| {
            for column in &columns {
                match column {
                    ColumnValues::BigInt(a) => {
                        row.push_bind((!a.is_null(i)).then(|| a.value(i)));
                    }
                    ColumnValues::Integer(a) => {
                        row.push_bind((!a.is_null(i)).then(|| a.value(i)));
                    }
                    ColumnValues::DoublePrecision(a) => {
                        row.push_bind((!a.is_null(i)).then(|| a.value(i)));
                    }
                    ColumnValues::Real(a) => {
                        row.push_bind((!a.is_null(i)).then(|| a.value(i)));
                    }
                    ColumnValues::Text(a) => {
                        row.push_bind((!a.is_null(i)).then(|| a.value(i)));
                    }
                    ColumnValues::Boolean(a) => {
                        row.push_bind((!a.is_null(i)).then(|| a.value(i)));
                    }
                    ColumnValues::Timestamp(a) => {
                        let value: Option<NaiveDateTime> = if a.is_null(i) {
                            None
                        } else {
                            a.value_as_datetime(i)
                        };
                        row.push_bind(value);
                    }
                    ColumnValues::Date(a) => {
                        let value: Option<NaiveDate> =
                            if a.is_null(i) { None } else { a.value_as_date(i) };
                        row.push_bind(value);
                    }
                }
            }
        });

        let result = builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|e| e.to_string())?;
        written += result.rows_affected();
        start = end;
    }

    Ok(written)
}

/// Downcast every column of a coerced batch to its planned array type.
fn column_accessors<'a>(
    plan: &TablePlan,
    batch: &'a RecordBatch,
) -> std::result::Result<Vec<ColumnValues<'a>>, String> {
    plan.columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let array = batch.column(i).as_ref();
            let values = match column.pg_type {
                PgType::BigInt => ColumnValues::BigInt(downcast(array, &column.name)?),
                PgType::Integer => ColumnValues::Integer(downcast(array, &column.name)?),
                PgType::DoublePrecision => {
                    ColumnValues::DoublePrecision(downcast(array, &column.name)?)
                }
                PgType::Real => ColumnValues::Real(downcast(array, &column.name)?),
                PgType::Text => ColumnValues::Text(downcast(array, &column.name)?),
                PgType::Boolean => ColumnValues::Boolean(downcast(array, &column.name)?),
                PgType::Timestamp => ColumnValues::Timestamp(downcast(array, &column.name)?),
                PgType::Date => ColumnValues::Date(downcast(array, &column.name)?),
            };
            Ok(values)
        })
        .collect()
}

fn downcast<'a, T: 'static>(
    array: &'a dyn Array,
    name: &str,
) -> std::result::Result<&'a T, String> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| format!("column '{name}' does not hold its planned array type"))
}

/// Double-quote an identifier, doubling any embedded quote.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// CREATE TABLE statement for the plan's columns, in order.
fn create_table_ddl(plan: &TablePlan) -> String {
    let columns: Vec<String> = plan
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.pg_type.ddl()))
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        quote_ident(plan.table()),
        columns.join(", ")
    )
}

/// INSERT prefix shared by every statement for the table. The trailing
/// space matters: `push_values` appends the VALUES clause directly.
fn insert_prefix(plan: &TablePlan) -> String {
    let columns: Vec<String> = plan
        .columns()
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect();
    format!(
        "INSERT INTO {} ({}) ",
        quote_ident(plan.table()),
        columns.join(", ")
    )
}

/// Rows per INSERT statement for a table of the given width.
fn rows_per_statement(column_count: usize) -> usize {
    (MAX_BIND_PARAMS / column_count.max(1)).max(1)
}
