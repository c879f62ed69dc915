//! Report configuration.
//!
//! Every field has a default, so an absent config file and an empty one
//! behave the same. The defaults reproduce the established report layout.

use std::fs;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventCodes {
    pub pickup: String,
    pub delivered: String,
    pub in_transit: String,
    pub out_for_delivery: String,
}

impl Default for EventCodes {
    fn default() -> Self {
        Self {
            pickup: "PU".to_string(),
            delivered: "DL".to_string(),
            in_transit: "IT".to_string(),
            out_for_delivery: "OD".to_string(),
        }
    }
}

impl EventCodes {
    fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("pickup", self.pickup.as_str()),
            ("delivered", self.delivered.as_str()),
            ("in_transit", self.in_transit.as_str()),
            ("out_for_delivery", self.out_for_delivery.as_str()),
        ]
        .into_iter()
    }
}

/// How a total transit time of exactly zero feeds `avg_hours_per_facility`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroTransitPolicy {
    /// Zero hours leaves the average unknown, matching historical reports.
    #[default]
    Unknown,
    /// Zero hours is a real measurement and averages to zero.
    Zero,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidTimestampPolicy {
    /// Drop the offending shipment and keep going.
    #[default]
    Skip,
    /// Stop the whole run at the first unreadable shipment.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub event_codes: EventCodes,
    /// Case-sensitive substring of `arrivalLocation` marking a facility scan.
    pub facility_marker: String,
    /// Matched case-insensitively against the service type.
    pub express_keywords: Vec<String>,
    pub zero_transit: ZeroTransitPolicy,
    pub on_invalid_timestamp: InvalidTimestampPolicy,
    /// strftime layout for the pickup and delivery columns.
    pub timestamp_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            event_codes: EventCodes::default(),
            facility_marker: "FACILITY".to_string(),
            express_keywords: vec!["EXPRESS".to_string(), "PRIORITY".to_string()],
            zero_transit: ZeroTransitPolicy::default(),
            on_invalid_timestamp: InvalidTimestampPolicy::default(),
            timestamp_format: "%Y-%m-%d %H:%M:%S%.f".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ReportConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| PipelineError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.facility_marker.is_empty() {
            return Err(PipelineError::Validation(
                "facility_marker must not be empty".to_string(),
            ));
        }

        if let Some((name, _)) = self.event_codes.iter().find(|(_, code)| code.trim().is_empty()) {
            return Err(PipelineError::Validation(format!(
                "event_codes.{name} must not be empty"
            )));
        }

        if self.express_keywords.iter().any(|keyword| keyword.trim().is_empty()) {
            return Err(PipelineError::Validation(
                "express_keywords must not contain empty entries".to_string(),
            ));
        }

        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(PipelineError::Validation(format!(
                "timestamp_format '{}' is not a valid strftime layout",
                self.timestamp_format
            )));
        }

        Ok(())
    }
}
