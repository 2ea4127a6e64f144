//! Error type definitions for the EPG aggregator
//!
//! Source failures are expected and recovered from by the aggregation loop,
//! so they live in their own enum. Everything that can stop the binary is an
//! [`AppError`].

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Filesystem errors while writing the guide
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file parse errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::de::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised by a single EPG source fetch
///
/// None of these abort a run: the aggregator logs them and moves on to the
/// next source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Connection-level failures
    #[error("Network error: {url} - {message}")]
    Network { url: String, message: String },

    /// Non-success HTTP responses
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Parsing errors for source data
    #[error("Parse error: {source_type} - {message}")]
    ParseError { source_type: String, message: String },

    /// Invalid or missing source configuration
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfig { field: String, message: String },

    /// The source answered but produced no usable channels
    #[error("No data: {source_name} returned no channels")]
    NoData { source_name: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a network error
    pub fn network<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error<S: Into<String>, M: Into<String>>(source_type: S, message: M) -> Self {
        Self::ParseError {
            source_type: source_type.into(),
            message: message.into(),
        }
    }

    /// Create a no-data error
    pub fn no_data<S: Into<String>>(source_name: S) -> Self {
        Self::NoData {
            source_name: source_name.into(),
        }
    }

    /// Whether a retry of the same request could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(SourceError::timeout("http://a").is_transient());
        assert!(SourceError::Http { status: 503, message: "down".into() }.is_transient());
        assert!(SourceError::Http { status: 429, message: "slow".into() }.is_transient());
        assert!(!SourceError::Http { status: 404, message: "gone".into() }.is_transient());
        assert!(!SourceError::parse_error("cctv", "bad json").is_transient());
    }

    #[test]
    fn test_source_error_converts_into_app_error() {
        let err: AppError = SourceError::no_data("tvsou").into();
        assert_eq!(err.to_string(), "Source error: No data: tvsou returned no channels");
    }
}
