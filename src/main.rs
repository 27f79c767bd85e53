//! tlc-ingest CLI
//!
//! Downloads one month of NYC yellow-taxi trip data and loads it into
//! PostgreSQL. Exits 0 on success, 1 on any failure.

use clap::Parser;
use tlc_ingest::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise --log-level decides.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.as_directive())),
        )
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
