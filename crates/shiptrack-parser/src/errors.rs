use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("tracking document is not valid JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized timestamp '{raw}': {reason}")]
    InvalidTimestamp { raw: String, reason: String },

    #[error("epoch value '{raw}' is not an integer millisecond count")]
    InvalidEpoch { raw: String },
}

impl ParserError {
    pub(crate) fn invalid_timestamp(raw: &str, reason: impl Into<String>) -> Self {
        ParserError::InvalidTimestamp {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}
