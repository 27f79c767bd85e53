//! Table plan: column-by-column mapping from Arrow to PostgreSQL

use crate::error::{Error, Result};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Columns always stored as timestamps, whatever the source file says
pub const DATETIME_COLUMNS: [&str; 2] = ["tpep_pickup_datetime", "tpep_dropoff_datetime"];

/// PostgreSQL column type used in the generated DDL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgType {
    /// 64-bit integer
    BigInt,
    /// 32-bit integer
    Integer,
    /// 64-bit float
    DoublePrecision,
    /// 32-bit float
    Real,
    /// Unbounded text
    Text,
    /// Boolean
    Boolean,
    /// Timestamp without time zone
    Timestamp,
    /// Calendar date
    Date,
}

impl PgType {
    /// SQL spelling used in CREATE TABLE
    pub fn ddl(self) -> &'static str {
        match self {
            Self::BigInt => "BIGINT",
            Self::Integer => "INTEGER",
            Self::DoublePrecision => "DOUBLE PRECISION",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::Timestamp => "TIMESTAMP",
            Self::Date => "DATE",
        }
    }

    /// Canonical Arrow type every chunk is cast to before binding
    pub fn arrow_type(self) -> DataType {
        match self {
            Self::BigInt => DataType::Int64,
            Self::Integer => DataType::Int32,
            Self::DoublePrecision => DataType::Float64,
            Self::Real => DataType::Float32,
            Self::Text => DataType::Utf8,
            Self::Boolean => DataType::Boolean,
            Self::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
            Self::Date => DataType::Date32,
        }
    }

    /// Destination type for an Arrow source type, or None if the column
    /// cannot be stored.
    fn from_arrow(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::UInt8
            | DataType::UInt16 => Some(Self::Integer),
            DataType::Int64 | DataType::UInt32 | DataType::UInt64 => Some(Self::BigInt),
            DataType::Float16 | DataType::Float32 => Some(Self::Real),
            DataType::Float64 => Some(Self::DoublePrecision),
            DataType::Utf8 | DataType::LargeUtf8 => Some(Self::Text),
            DataType::Boolean => Some(Self::Boolean),
            DataType::Timestamp(_, _) => Some(Self::Timestamp),
            DataType::Date32 | DataType::Date64 => Some(Self::Date),
            _ => None,
        }
    }
}

/// One destination column
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    /// Column name, carried over from the file
    pub name: String,
    /// Destination type
    pub pg_type: PgType,
}

/// Column typing computed once from the dataset schema and reused for
/// the whole run
#[derive(Debug, Clone)]
pub struct TablePlan {
    table: String,
    columns: Vec<ColumnPlan>,
    target: SchemaRef,
}

impl TablePlan {
    /// Derive the plan for `table` from the dataset's Arrow schema.
    pub fn from_schema(table: &str, schema: &Schema) -> Result<Self> {
        let mut columns = Vec::with_capacity(schema.fields().len());

        for field in schema.fields() {
            let pg_type = if DATETIME_COLUMNS.contains(&field.name().as_str()) {
                PgType::Timestamp
            } else {
                PgType::from_arrow(field.data_type()).ok_or_else(|| {
                    Error::schema(
                        table,
                        format!(
                            "column '{}' has unsupported type {:?}",
                            field.name(),
                            field.data_type()
                        ),
                    )
                })?
            };
            columns.push(ColumnPlan {
                name: field.name().clone(),
                pg_type,
            });
        }

        let fields: Vec<Field> = columns
            .iter()
            .map(|c| Field::new(&c.name, c.pg_type.arrow_type(), true))
            .collect();

        Ok(Self {
            table: table.to_string(),
            columns,
            target: Arc::new(Schema::new(fields)),
        })
    }

    /// Destination table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Planned columns in table order
    pub fn columns(&self) -> &[ColumnPlan] {
        &self.columns
    }

    /// Arrow schema every chunk is cast to before binding
    pub fn target_schema(&self) -> SchemaRef {
        self.target.clone()
    }

    /// Cast a chunk's columns to the plan's canonical types.
    ///
    /// Casting is lenient the way the source data demands: a datetime
    /// string that does not parse becomes NULL rather than failing the
    /// run. A column whose type cannot be cast at all is a schema error.
    pub fn coerce(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mut arrays = Vec::with_capacity(self.columns.len());

        for (i, column) in self.columns.iter().enumerate() {
            let source = batch.column(i);
            let want = column.pg_type.arrow_type();

            if source.data_type() == &want {
                arrays.push(source.clone());
                continue;
            }

            let converted = cast(source.as_ref(), &want).map_err(|e| {
                Error::schema(
                    &self.table,
                    format!(
                        "cannot convert column '{}' from {:?} to {:?}: {e}",
                        column.name,
                        source.data_type(),
                        want
                    ),
                )
            })?;
            arrays.push(converted);
        }

        RecordBatch::try_new(self.target.clone(), arrays)
            .map_err(|e| Error::schema(&self.table, format!("failed to rebuild chunk: {e}")))
    }
}
