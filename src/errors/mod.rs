//! Centralized error handling for the EPG aggregator
//!
//! # Error Categories
//!
//! - **Source Errors**: a single source could not be fetched or parsed; the
//!   aggregation loop recovers from these
//! - **Configuration Errors**: invalid config file or catalog; fatal for the CLI
//! - **I/O Errors**: writing the XMLTV artifact

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
