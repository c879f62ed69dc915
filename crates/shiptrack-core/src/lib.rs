pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod report;

pub use config::{EventCodes, InvalidTimestampPolicy, ReportConfig, ZeroTransitPolicy};
pub use error::{PipelineError, Result};
pub use metrics::{MetricsExtractor, MetricsRow};
pub use pipeline::{build_report, generate_report, BatchReport, RunSummary, SkippedShipment};
pub use report::{write_report, write_report_file, REPORT_COLUMNS};
