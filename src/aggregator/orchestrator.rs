//! Multi-source aggregation loop
//!
//! Sources are consulted strictly one after another in priority order. After
//! each source the success rate is recomputed and the run stops as soon as it
//! reaches the configured threshold; later sources are never invoked.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::evaluator::success_rate;
use super::state::AggregationState;
use crate::channels::{ChannelCatalog, ChannelMatcher};
use crate::errors::SourceResult;
use crate::models::{RawProgram, RawSchedule};
use crate::sources::{EpgSource, FetchMode, SourceStaging};
use crate::utils::time::canonical_clock;

/// Why a run finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    ThresholdMet,
    SourcesExhausted,
}

/// Lifecycle of an [`Aggregator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running { source_index: usize },
    Stopped(StopReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum SourceStatus {
    Completed,
    Failed(String),
}

/// What one source contributed
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub status: SourceStatus,
    /// Raw channel names the source returned, over all phases
    pub channels_returned: usize,
    /// Names resolved to a catalog channel and merged
    pub channels_matched: usize,
    /// Names the matcher could not resolve
    pub channels_unmatched: usize,
    /// Names resolved but outside the phase's target channels
    pub channels_skipped: usize,
    /// Program entries dropped while sanitizing
    pub programs_dropped: usize,
    pub success_rate_after: f64,
}

impl SourceReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            status: SourceStatus::Completed,
            channels_returned: 0,
            channels_matched: 0,
            channels_unmatched: 0,
            channels_skipped: 0,
            programs_dropped: 0,
            success_rate_after: 0.0,
        }
    }
}

/// Result of a finished run
#[derive(Debug, Clone)]
pub struct AggregationOutcome {
    pub state: AggregationState,
    pub success_rate: f64,
    pub stop_reason: StopReason,
    pub reports: Vec<SourceReport>,
}

/// Which catalog channels a fetched schedule may contribute to
enum MergeTarget {
    Any,
    NonCctv,
    /// CCTV channels that were empty when the backfill phase began
    CctvBackfill(HashSet<String>),
}

impl MergeTarget {
    fn accepts(&self, catalog: &ChannelCatalog, channel_id: &str) -> bool {
        match self {
            Self::Any => true,
            Self::NonCctv => !catalog.is_cctv(channel_id),
            Self::CctvBackfill(empty) => empty.contains(channel_id),
        }
    }
}

pub struct Aggregator {
    matcher: ChannelMatcher,
    success_threshold: f64,
    run_state: RunState,
}

impl Aggregator {
    pub fn new(matcher: ChannelMatcher, success_threshold: f64) -> Self {
        Self {
            matcher,
            success_threshold,
            run_state: RunState::NotStarted,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    fn catalog(&self) -> &ChannelCatalog {
        self.matcher.catalog()
    }

    /// Consult `sources` in order until the threshold is met or they run out
    ///
    /// Always returns a complete state: source failures only lower the rate.
    pub async fn run(&mut self, sources: &[Arc<dyn EpgSource>]) -> AggregationOutcome {
        let mut state = AggregationState::new(self.catalog());
        let total = self.catalog().len();
        let mut rate = 0.0;
        let mut reports = Vec::with_capacity(sources.len());
        let mut stop_reason = StopReason::SourcesExhausted;

        if state.is_empty() {
            warn!("Channel catalog is empty, the guide will have no channels");
        }
        info!(
            "Starting aggregation over {} sources for {} channels (threshold {:.2}%)",
            sources.len(),
            total,
            self.success_threshold
        );

        for (source_index, source) in sources.iter().enumerate() {
            self.run_state = RunState::Running { source_index };
            info!(
                "Fetching from source '{}' ({}/{})",
                source.name(),
                source_index + 1,
                sources.len()
            );

            let mut report = match source.staging() {
                SourceStaging::Single => self.run_single(source.as_ref(), &mut state).await,
                SourceStaging::CctvDeferred => self.run_deferred(source.as_ref(), &mut state).await,
            };

            rate = success_rate(&state, total);
            report.success_rate_after = rate;
            info!(
                "Source '{}' done: {} matched, {} unmatched, success rate {:.2}%",
                source.name(),
                report.channels_matched,
                report.channels_unmatched,
                rate
            );
            reports.push(report);

            if rate >= self.success_threshold {
                info!(
                    "Success rate {:.2}% reached threshold {:.2}%, skipping remaining sources",
                    rate, self.success_threshold
                );
                stop_reason = StopReason::ThresholdMet;
                break;
            }
        }

        self.run_state = RunState::Stopped(stop_reason);

        if rate < self.success_threshold {
            warn!(
                "Aggregation finished below threshold: {:.2}% < {:.2}% ({} of {} channels filled)",
                rate,
                self.success_threshold,
                state.filled_count(),
                total
            );
        }

        AggregationOutcome {
            state,
            success_rate: rate,
            stop_reason,
            reports,
        }
    }

    async fn run_single(&self, source: &dyn EpgSource, state: &mut AggregationState) -> SourceReport {
        let mut report = SourceReport::new(source.name());
        let fetched = source.fetch(FetchMode::All).await;
        if let Err(reason) = self.absorb(fetched, MergeTarget::Any, state, &mut report) {
            report.status = SourceStatus::Failed(reason);
        }
        report
    }

    async fn run_deferred(&self, source: &dyn EpgSource, state: &mut AggregationState) -> SourceReport {
        let mut report = SourceReport::new(source.name());

        let fetched = source.fetch(FetchMode::NonCctv).await;
        let non_cctv = self.absorb(fetched, MergeTarget::NonCctv, state, &mut report);

        let cctv_total = self.catalog().cctv_count();
        let cctv_filled = state.filled_count_where(|id| self.catalog().is_cctv(id));
        if cctv_filled >= cctv_total {
            debug!(
                "All {} CCTV channels already filled, skipping CCTV fetch of '{}'",
                cctv_total,
                source.name()
            );
            if let Err(reason) = non_cctv {
                report.status = SourceStatus::Failed(reason);
            }
            return report;
        }

        let empty: HashSet<String> = self
            .catalog()
            .iter()
            .filter(|c| c.is_cctv() && !state.has_programs(&c.id))
            .map(|c| c.id.clone())
            .collect();
        info!(
            "{} of {} CCTV channels filled, backfilling {} from '{}'",
            cctv_filled,
            cctv_total,
            empty.len(),
            source.name()
        );

        let fetched = source.fetch(FetchMode::CctvOnly).await;
        let cctv = self.absorb(fetched, MergeTarget::CctvBackfill(empty), state, &mut report);

        if let (Err(first), Err(second)) = (non_cctv, cctv) {
            report.status = SourceStatus::Failed(format!("{}; {}", first, second));
        }
        report
    }

    /// Match and merge one fetch result; `Err` carries the failure reason
    fn absorb(
        &self,
        fetched: SourceResult<RawSchedule>,
        target: MergeTarget,
        state: &mut AggregationState,
        report: &mut SourceReport,
    ) -> Result<(), String> {
        let schedule = match fetched {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!("Source '{}' failed: {}", report.source, e);
                return Err(e.to_string());
            }
        };

        report.channels_returned += schedule.len();

        for (raw_name, programs) in schedule {
            let Some(channel_id) = self.matcher.match_channel(&raw_name) else {
                debug!("No catalog channel for '{}' from '{}'", raw_name, report.source);
                report.channels_unmatched += 1;
                continue;
            };

            if !target.accepts(self.catalog(), channel_id) {
                debug!(
                    "Ignoring '{}' ({}) from '{}' in this phase",
                    raw_name, channel_id, report.source
                );
                report.channels_skipped += 1;
                continue;
            }

            let (programs, dropped) = sanitize_programs(programs, &raw_name);
            report.programs_dropped += dropped;
            if programs.is_empty() {
                continue;
            }

            debug!(
                "Merging {} programs for '{}' into {}",
                programs.len(),
                raw_name,
                channel_id
            );
            state.merge_into(channel_id, programs);
            report.channels_matched += 1;
        }

        Ok(())
    }
}

/// Canonicalize times and drop entries that cannot be placed in the guide
///
/// The result is unique by `(time, title)` and sorted by time, so it can seed
/// an empty channel directly.
fn sanitize_programs(programs: Vec<RawProgram>, channel: &str) -> (Vec<RawProgram>, usize) {
    let total = programs.len();
    let mut seen = HashSet::new();
    let mut kept: Vec<RawProgram> = programs
        .into_iter()
        .filter_map(|mut program| {
            program.title = program.title.trim().to_string();
            if program.title.is_empty() {
                debug!("Dropping untitled program at '{}' on '{}'", program.time, channel);
                return None;
            }
            match canonical_clock(&program.time) {
                Ok(time) => {
                    program.time = time;
                    program.end_time = program
                        .end_time
                        .as_deref()
                        .and_then(|end| canonical_clock(end).ok());
                    Some(program)
                }
                Err(e) => {
                    debug!("Dropping program '{}' on '{}': {}", program.title, channel, e);
                    None
                }
            }
        })
        .filter(|program| seen.insert((program.time.clone(), program.title.clone())))
        .collect();
    kept.sort_by(|a, b| a.time.cmp(&b.time));
    let dropped = total - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_programs() {
        let (kept, dropped) = sanitize_programs(
            vec![
                RawProgram::new("8:00", " 早间新闻 ").with_end_time("9:00"),
                RawProgram::new("全天", "轮播"),
                RawProgram::new("10:00", "   "),
                RawProgram::new("24:30", "午夜剧场"),
                RawProgram::new("08:00", "早间新闻"),
            ],
            "test",
        );
        assert_eq!(dropped, 3);
        assert_eq!(
            kept,
            vec![
                RawProgram::new("00:30", "午夜剧场"),
                RawProgram::new("08:00", "早间新闻").with_end_time("09:00"),
            ]
        );
    }

    #[test]
    fn test_merge_targets() {
        let catalog = ChannelCatalog::builtin();
        assert!(MergeTarget::Any.accepts(&catalog, "CCTV1"));
        assert!(!MergeTarget::NonCctv.accepts(&catalog, "CCTV1"));
        assert!(MergeTarget::NonCctv.accepts(&catalog, "HunanTV"));

        let backfill = MergeTarget::CctvBackfill(["CCTV2".to_string()].into_iter().collect());
        assert!(backfill.accepts(&catalog, "CCTV2"));
        assert!(!backfill.accepts(&catalog, "CCTV1"));
        assert!(!backfill.accepts(&catalog, "HunanTV"));
    }
}
