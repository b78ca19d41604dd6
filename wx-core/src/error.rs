/// Error types for the weather trend pipeline
use thiserror::Error;

/// Message shown to the user for any fetch failure; details go to the log.
pub const FETCH_FAILURE_MESSAGE: &str = "Failed to fetch weather data. Please try again later.";

/// Main error type for weather trend operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrendError {
    /// Network failure, non-2xx status, or a GraphQL error payload
    #[error("Failed to fetch weather data: {0}")]
    Fetch(String),

    /// A metric has observed points but the service sent no regression for it
    #[error("No regression result for metric {metric} in {location}")]
    MissingRegression { location: String, metric: String },

    /// The response could be decoded but does not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Timestamp could not be parsed into a calendar day
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    /// Request parameters outside the accepted bounds
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The rendering surface rejected the traces
    #[error("Render failed: {0}")]
    Render(String),
}

impl TrendError {
    /// True for failures caused by the shape of the upstream data rather
    /// than by transport or user input.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            TrendError::MissingRegression { .. } | TrendError::MalformedResponse(_)
        )
    }

    /// Text suitable for showing in the dashboard.
    pub fn user_message(&self) -> String {
        match self {
            TrendError::Fetch(_) => FETCH_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Type alias for Results using TrendError
pub type Result<T> = std::result::Result<T, TrendError>;
