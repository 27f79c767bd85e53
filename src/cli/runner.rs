//! CLI runner, executes one ingestion run end to end

use crate::cli::commands::Cli;
use crate::database::PostgresSink;
use crate::dataset::DatasetReader;
use crate::endpoint;
use crate::error::Result;
use crate::fetch::DatasetClient;
use crate::ingest;
use crate::schema::TablePlan;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Validate, connect, download, and ingest one month of trip data.
    pub async fn run(&self) -> Result<()> {
        let config = self.cli.to_config();
        config.validate()?;

        info!("{} v{}", crate::NAME, crate::VERSION);
        info!(
            year = config.year,
            month = config.month,
            chunk_size = config.chunk_size,
            table = %config.table_name,
            "run parameters"
        );

        // Reach the database before pulling the dataset; a bad password
        // should not cost a full download first.
        info!(
            url = %endpoint::masked_database_url(&config.database),
            "connecting to database"
        );
        let mut sink = PostgresSink::connect(&config.database).await?;

        let client = DatasetClient::new();
        let payload = client
            .download(&endpoint::dataset_url(config.year, config.month))
            .await?;

        let mut reader = DatasetReader::open(payload, config.chunk_size as usize)?;
        let plan = TablePlan::from_schema(&config.table_name, reader.schema().as_ref())?;

        let report = ingest::run(&mut sink, &mut reader, &plan).await?;
        sink.close().await;

        println!(
            "Total rows inserted: {} in {:.1}s",
            format_count(report.rows_written),
            report.elapsed.as_secs_f64()
        );

        Ok(())
    }
}

/// Thousands-separated count for the final summary line
fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
