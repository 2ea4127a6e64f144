//! Utility functions for the EPG aggregator
//!
//! - `utils::channel_similarity` for fuzzy channel-name scoring
//! - `utils::html` for listing-page scraping helpers
//! - `utils::time` for program clocks and guide dates

pub mod channel_similarity;
pub mod html;
pub mod time;
