// crates/shiptrack-core/src/error.rs

use std::path::PathBuf;

use shiptrack_parser::ParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read input '{}': {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report to '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tracking document error: {0}")]
    Parser(#[from] ParserError),

    #[error("Shipment {shipment_index} of record {record_index} could not be read: {source}")]
    Shipment {
        record_index: usize,
        shipment_index: usize,
        #[source]
        source: ParserError,
    },

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration file is invalid: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
