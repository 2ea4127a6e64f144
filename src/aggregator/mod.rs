//! Aggregation core: per-channel state, merging, scoring and the source loop

pub mod evaluator;
pub mod merger;
pub mod orchestrator;
pub mod state;

pub use evaluator::success_rate;
pub use merger::merge_programs;
pub use orchestrator::{
    AggregationOutcome, Aggregator, RunState, SourceReport, SourceStatus, StopReason,
};
pub use state::AggregationState;
