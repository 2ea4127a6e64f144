pub mod aggregator;
pub mod channels;
pub mod config;
pub mod errors;
pub mod models;
pub mod output;
pub mod sources;
pub mod utils;
