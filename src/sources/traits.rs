//! Source trait definitions
//!
//! Every upstream guide provider is an [`EpgSource`]. The aggregator only sees
//! the trait: a name for logs, a staging policy, and a fetch that yields raw,
//! unmatched channel names with their programs.

use async_trait::async_trait;
use crate::errors::SourceResult;
use crate::models::RawSchedule;

/// Which part of the catalog a fetch should target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Everything the source offers
    All,
    /// Only provincial satellite channels
    NonCctv,
    /// Only CCTV channels
    CctvOnly,
}

/// How the aggregator schedules a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceStaging {
    /// One fetch in [`FetchMode::All`]
    Single,
    /// Fetch non-CCTV channels first; fetch CCTV channels only to backfill
    /// what higher-priority sources left empty
    CctvDeferred,
}

#[async_trait]
pub trait EpgSource: Send + Sync {
    /// Stable name used in configuration and logs
    fn name(&self) -> &str;

    fn staging(&self) -> SourceStaging {
        SourceStaging::Single
    }

    /// Fetch the schedule for `mode`
    ///
    /// An `Err` means the whole fetch produced nothing usable; partial
    /// per-channel failures are logged by the source and left out of the map.
    async fn fetch(&self, mode: FetchMode) -> SourceResult<RawSchedule>;
}
