//! TxGate - Transaction admission service entry point
//!
//! Reads inbound transaction records as JSON lines on stdin and writes
//! decision records as JSON lines on stdout. Keyed broker transports plug
//! in through the `RecordSource` / `RecordSink` traits instead.

use clap::Parser;
use std::io::BufReader;
use std::path::PathBuf;
use txgate_service::{pipeline, ServiceConfig};
use txgate_stream::jsonl::{JsonLinesSink, JsonLinesSource};

#[derive(Parser)]
#[command(name = "txgate")]
#[command(about = "Transaction admission control service", long_about = None)]
struct Cli {
    /// Path to the JSON config file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };

    tracing::info!(
        inbound = %config.inbound_topic,
        outbound = %config.outbound_topic,
        window_ms = config.admission.window_ms,
        max_transactions = config.admission.max_transactions,
        "starting admission service"
    );

    let source = JsonLinesSource::new(BufReader::new(std::io::stdin()), config.consumer.batch_size);
    let sink = JsonLinesSink::new(std::io::stdout());

    let stats = pipeline::run(config, source, sink).await?;

    tracing::info!(
        processed = stats.processed,
        skipped_malformed = stats.skipped_malformed,
        skipped_failed = stats.skipped_failed,
        "admission service stopped"
    );
    Ok(())
}
