use std::fs;
use std::path::Path;

use blake3::Hasher;
use shiptrack_parser::TrackingDocument;
use tracing::{debug, info, warn};

use crate::config::{InvalidTimestampPolicy, ReportConfig};
use crate::error::{PipelineError, Result};
use crate::metrics::{MetricsExtractor, MetricsRow};
use crate::report::write_report_file;

/// A shipment left out of the report because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedShipment {
    pub record_index: usize,
    pub shipment_index: usize,
    pub tracking_number: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub rows: Vec<MetricsRow>,
    pub skipped: Vec<SkippedShipment>,
    pub record_count: usize,
    pub shipment_count: usize,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub input_hash: String,
    pub record_count: usize,
    pub shipment_count: usize,
    pub row_count: usize,
    pub skipped: Vec<SkippedShipment>,
}

/// Derives one row per shipment, in document order.
pub fn build_report(document: &TrackingDocument, config: &ReportConfig) -> Result<BatchReport> {
    let extractor = MetricsExtractor::new(config);
    let mut batch = BatchReport {
        record_count: document.records().len(),
        ..BatchReport::default()
    };

    for source in document.shipments() {
        batch.shipment_count += 1;

        let shipment = match source.load() {
            Ok(shipment) => shipment,
            Err(err) if config.on_invalid_timestamp == InvalidTimestampPolicy::Skip => {
                let skipped = SkippedShipment {
                    record_index: source.record_index,
                    shipment_index: source.shipment_index,
                    tracking_number: source.tracking_number(),
                    reason: err.to_string(),
                };
                warn!(
                    record_index = skipped.record_index,
                    shipment_index = skipped.shipment_index,
                    tracking_number = skipped.tracking_number.as_deref().unwrap_or_default(),
                    reason = %skipped.reason,
                    "skipping unreadable shipment"
                );
                batch.skipped.push(skipped);
                continue;
            }
            Err(source_err) => {
                return Err(PipelineError::Shipment {
                    record_index: source.record_index,
                    shipment_index: source.shipment_index,
                    source: source_err,
                });
            }
        };

        let row = extractor.extract(&shipment);
        debug!(
            tracking_number = row.tracking_number.as_deref().unwrap_or_default(),
            events = row.total_events_count,
            "derived shipment metrics"
        );
        batch.rows.push(row);
    }

    Ok(batch)
}

/// Reads a tracking export, derives the metrics report and writes it as CSV.
pub fn generate_report(input: &Path, output: &Path, config: &ReportConfig) -> Result<RunSummary> {
    let contents = fs::read(input).map_err(|source| PipelineError::Input {
        path: input.to_path_buf(),
        source,
    })?;
    let input_hash = compute_hash(&contents);

    let text = std::str::from_utf8(&contents).map_err(|err| {
        PipelineError::Validation(format!(
            "input '{}' is not valid UTF-8: {err}",
            input.display()
        ))
    })?;
    let document = TrackingDocument::from_json(text)?;
    let batch = build_report(&document, config)?;

    write_report_file(output, &batch.rows, config)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        input_hash = %input_hash,
        records = batch.record_count,
        shipments = batch.shipment_count,
        rows = batch.rows.len(),
        skipped = batch.skipped.len(),
        "transit report written"
    );

    Ok(RunSummary {
        input_hash,
        record_count: batch.record_count,
        shipment_count: batch.shipment_count,
        row_count: batch.rows.len(),
        skipped: batch.skipped,
    })
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
