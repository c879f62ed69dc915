use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use shiptrack_core::{generate_report, ReportConfig, RunSummary};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Per-shipment transit performance report", long_about = None)]
struct Cli {
    /// Tracking export (JSON array of tracking responses)
    input: PathBuf,
    /// Destination CSV file
    output: PathBuf,
    /// Optional TOML file overriding report settings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => ReportConfig::from_path(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => ReportConfig::default(),
    };

    info!(input = %cli.input.display(), output = %cli.output.display(), "generating transit report");

    let summary = generate_report(&cli.input, &cli.output, &config).with_context(|| {
        format!(
            "failed to build report from '{}' into '{}'",
            cli.input.display(),
            cli.output.display()
        )
    })?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Tracking records"), Cell::new(summary.record_count)]);
    table.add_row(vec![Cell::new("Shipments"), Cell::new(summary.shipment_count)]);
    table.add_row(vec![Cell::new("Rows written"), Cell::new(summary.row_count)]);
    table.add_row(vec![Cell::new("Skipped shipments"), Cell::new(summary.skipped.len())]);
    table.add_row(vec![Cell::new("Input hash"), Cell::new(&summary.input_hash)]);
    println!("{table}");

    for skipped in &summary.skipped {
        println!(
            "  skipped record {} shipment {} ({}): {}",
            skipped.record_index,
            skipped.shipment_index,
            skipped.tracking_number.as_deref().unwrap_or("no tracking number"),
            skipped.reason
        );
    }
}
