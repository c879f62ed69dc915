use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use shiptrack_parser::Timestamp;

use crate::config::ReportConfig;
use crate::error::{PipelineError, Result};
use crate::metrics::MetricsRow;

pub const REPORT_COLUMNS: [&str; 21] = [
    "tracking_number",
    "service_type",
    "carrier_code",
    "package_weight_kg",
    "packaging_type",
    "origin_city",
    "origin_state",
    "destination_city",
    "destination_state",
    "pickup_datetime_ist",
    "delivery_datetime_ist",
    "total_transit_hours",
    "num_facilities_visited",
    "num_in_transit_events",
    "time_in_inter_facility_transit_hours",
    "avg_hours_per_facility",
    "is_express_service",
    "delivery_location_type",
    "num_out_for_delivery_attempts",
    "first_attempt_delivery",
    "total_events_count",
];

/// Writes the header and one CSV line per row. Unknown values become empty
/// cells.
pub fn write_report<W: Write>(
    writer: W,
    rows: &[MetricsRow],
    config: &ReportConfig,
) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(REPORT_COLUMNS)?;

    for row in rows {
        csv_writer.write_record(&row_cells(row, &config.timestamp_format)?)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Serializes the full report in memory and writes it in one call, so a
/// failed run never leaves a truncated file behind.
pub fn write_report_file(path: &Path, rows: &[MetricsRow], config: &ReportConfig) -> Result<()> {
    let mut buffer = Vec::new();
    write_report(&mut buffer, rows, config)?;
    fs::write(path, buffer).map_err(|source| PipelineError::Output {
        path: path.to_path_buf(),
        source,
    })
}

fn row_cells(row: &MetricsRow, timestamp_format: &str) -> Result<[String; 21]> {
    Ok([
        text(&row.tracking_number),
        text(&row.service_type),
        text(&row.carrier_code),
        text(&row.package_weight_kg),
        text(&row.packaging_type),
        text(&row.origin_city),
        text(&row.origin_state),
        text(&row.destination_city),
        text(&row.destination_state),
        timestamp(row.pickup_datetime, timestamp_format)?,
        timestamp(row.delivery_datetime, timestamp_format)?,
        hours(row.total_transit_hours),
        row.num_facilities_visited.to_string(),
        row.num_in_transit_events.to_string(),
        hours(row.inter_facility_transit_hours),
        hours(row.avg_hours_per_facility),
        flag(row.is_express_service),
        text(&row.delivery_location_type),
        row.num_out_for_delivery_attempts.to_string(),
        flag(row.first_attempt_delivery),
        row.total_events_count.to_string(),
    ])
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn timestamp(value: Option<Timestamp>, format: &str) -> Result<String> {
    let Some(value) = value else {
        return Ok(String::new());
    };
    let mut rendered = String::new();
    write!(rendered, "{}", value.format(format)).map_err(|_| {
        PipelineError::Validation(format!("timestamp_format '{format}' cannot be rendered"))
    })?;
    Ok(rendered)
}

// Integral values keep a trailing ".0" so the column reads as decimal.
fn hours(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() && value.fract() == 0.0 => format!("{value:.1}"),
        Some(value) => value.to_string(),
        None => String::new(),
    }
}

fn flag(value: bool) -> String {
    let rendered = if value { "True" } else { "False" };
    rendered.to_string()
}
