//! Error types for the listing query engine.

use std::time::Duration;
use thiserror::Error;

/// Message shown when the fetch collaborator gave us nothing better.
pub const GENERIC_FETCH_ERROR: &str = "Failed to load properties. Please try again.";

/// Rejected filter or pagination input.
///
/// Raised at the input layer; a rejected update never reaches the query.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("'{value}' is not a valid number for {field}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("'{city}' is not a city in {region}")]
    UnknownCity { region: String, city: String },

    #[error("select a region before choosing a city")]
    CityWithoutRegion,

    #[error("minimum price {min} is above maximum price {max}")]
    PriceRange { min: u64, max: u64 },

    #[error("unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("{0}")]
    InvalidChoice(String),

    #[error("page must be 1 or greater")]
    InvalidPage,
}

/// Failures from the fetch collaborator.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection failed or the request could not be sent
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the configured deadline
    #[error("Request timed out after {}", describe_duration(.0))]
    Timeout(Duration),

    /// Non-2xx response; `message` is the server's own text when it sent one
    #[error("API error ({status})")]
    Api { status: u16, message: Option<String> },

    /// Response body was not a `{ properties, total }` document
    #[error("Parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Text suitable for the inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.trim().to_string(),
            FetchError::Network(message) if !message.trim().is_empty() => message.trim().to_string(),
            FetchError::Timeout(after) => {
                format!("The request timed out after {}.", describe_duration(after))
            }
            _ => GENERIC_FETCH_ERROR.to_string(),
        }
    }
}

/// Whole seconds when the duration has no fractional part, else milliseconds
fn describe_duration(d: &Duration) -> String {
    if d.subsec_millis() == 0 && d.as_secs() > 0 {
        format!("{} seconds", d.as_secs())
    } else {
        format!("{} ms", d.as_millis())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message_is_surfaced() {
        let err = FetchError::Api {
            status: 500,
            message: Some("Database unavailable".into()),
        };
        assert_eq!(err.user_message(), "Database unavailable");
    }

    #[test]
    fn test_missing_message_falls_back() {
        let err = FetchError::Api {
            status: 502,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_FETCH_ERROR);
        assert_eq!(FetchError::Network("  ".into()).user_message(), GENERIC_FETCH_ERROR);
        assert_eq!(FetchError::Parse("eof".into()).user_message(), GENERIC_FETCH_ERROR);
    }

    #[test]
    fn test_timeout_message_keeps_sub_second_precision() {
        assert_eq!(
            FetchError::Timeout(Duration::from_millis(500)).user_message(),
            "The request timed out after 500 ms."
        );
        assert_eq!(
            FetchError::Timeout(Duration::from_secs(10)).user_message(),
            "The request timed out after 10 seconds."
        );
        assert_eq!(
            FetchError::Timeout(Duration::from_millis(1500)).to_string(),
            "Request timed out after 1500 ms"
        );
    }
}
