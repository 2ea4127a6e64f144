use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use epg_aggregator::aggregator::{Aggregator, RunState, SourceStatus, StopReason};
use epg_aggregator::channels::{
    AliasTable, ChannelCatalog, ChannelMatcher, MatchingOptions, NameNormalizer,
};
use epg_aggregator::config::OutputConfig;
use epg_aggregator::errors::{SourceError, SourceResult};
use epg_aggregator::models::{RawProgram, RawSchedule};
use epg_aggregator::output::{write_artifact, XmltvGenerator};
use epg_aggregator::sources::{EpgSource, FetchMode, SourceStaging};

/// In-memory source replaying canned responses and recording every fetch
struct ScriptedSource {
    name: String,
    staging: SourceStaging,
    responses: HashMap<FetchMode, Result<RawSchedule, String>>,
    calls: Arc<Mutex<Vec<FetchMode>>>,
}

impl ScriptedSource {
    fn new(name: &str, staging: SourceStaging) -> Self {
        Self {
            name: name.to_string(),
            staging,
            responses: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn respond(mut self, mode: FetchMode, schedule: RawSchedule) -> Self {
        self.responses.insert(mode, Ok(schedule));
        self
    }

    fn fail(mut self, mode: FetchMode, reason: &str) -> Self {
        self.responses.insert(mode, Err(reason.to_string()));
        self
    }

    fn calls(&self) -> Arc<Mutex<Vec<FetchMode>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl EpgSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn staging(&self) -> SourceStaging {
        self.staging
    }

    async fn fetch(&self, mode: FetchMode) -> SourceResult<RawSchedule> {
        self.calls.lock().unwrap().push(mode);
        match self.responses.get(&mode) {
            Some(Ok(schedule)) => Ok(schedule.clone()),
            Some(Err(reason)) => Err(SourceError::network(format!("scripted://{}", self.name), reason.clone())),
            None => Ok(RawSchedule::new()),
        }
    }
}

fn cctv_catalog() -> ChannelCatalog {
    ChannelCatalog::new(ChannelCatalog::builtin().iter().filter(|c| c.is_cctv()).cloned().collect())
        .unwrap()
}

fn matcher_for(catalog: ChannelCatalog) -> ChannelMatcher {
    ChannelMatcher::new(
        Arc::new(catalog),
        NameNormalizer::new(AliasTable::builtin()),
        MatchingOptions::default(),
    )
}

/// One program per display name
fn schedule_for<'a, I>(names: I) -> RawSchedule
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .map(|name| (name.to_string(), vec![RawProgram::new("08:00", format!("{} 早间节目", name))]))
        .collect()
}

fn display_names(catalog: &ChannelCatalog) -> Vec<String> {
    catalog.iter().map(|c| c.name.clone()).collect()
}

fn boxed(sources: Vec<ScriptedSource>) -> Vec<Arc<dyn EpgSource>> {
    sources
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn EpgSource>)
        .collect()
}

#[tokio::test]
async fn test_stops_once_second_source_completes_catalog() {
    let catalog = cctv_catalog();
    assert_eq!(catalog.len(), 18);
    let names = display_names(&catalog);

    let first = ScriptedSource::new("first", SourceStaging::Single)
        .respond(FetchMode::All, schedule_for(names[..15].iter().map(String::as_str)));
    let second = ScriptedSource::new("second", SourceStaging::Single)
        .respond(FetchMode::All, schedule_for(names[15..].iter().map(String::as_str)));
    let third = ScriptedSource::new("third", SourceStaging::Single)
        .respond(FetchMode::All, schedule_for(names.iter().map(String::as_str)));
    let third_calls = third.calls();

    let mut aggregator = Aggregator::new(matcher_for(catalog), 90.0);
    let outcome = aggregator.run(&boxed(vec![first, second, third])).await;

    assert_eq!(outcome.reports.len(), 2);
    assert_eq!(outcome.reports[0].success_rate_after, 83.33);
    assert_eq!(outcome.reports[1].success_rate_after, 100.0);
    assert_eq!(outcome.success_rate, 100.0);
    assert_eq!(outcome.stop_reason, StopReason::ThresholdMet);
    assert_eq!(aggregator.run_state(), RunState::Stopped(StopReason::ThresholdMet));
    assert!(third_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_threshold_checked_after_every_source() {
    let catalog = cctv_catalog();
    let names = display_names(&catalog);

    let first = ScriptedSource::new("first", SourceStaging::Single)
        .respond(FetchMode::All, schedule_for(names[..15].iter().map(String::as_str)));
    let second = ScriptedSource::new("second", SourceStaging::Single)
        .respond(FetchMode::All, schedule_for(names[15..].iter().map(String::as_str)));
    let second_calls = second.calls();

    let mut aggregator = Aggregator::new(matcher_for(catalog), 80.0);
    let outcome = aggregator.run(&boxed(vec![first, second])).await;

    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.success_rate, 83.33);
    assert_eq!(outcome.stop_reason, StopReason::ThresholdMet);
    assert!(second_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_all_sources_failing_still_yields_complete_guide() {
    let catalog = ChannelCatalog::builtin();
    let total = catalog.len();

    let sources = boxed(vec![
        ScriptedSource::new("cctv", SourceStaging::Single).fail(FetchMode::All, "connection refused"),
        ScriptedSource::new("tvmao", SourceStaging::CctvDeferred)
            .fail(FetchMode::NonCctv, "HTTP 503")
            .fail(FetchMode::CctvOnly, "HTTP 503"),
        ScriptedSource::new("tvsou", SourceStaging::Single).fail(FetchMode::All, "timed out"),
    ]);

    let mut aggregator = Aggregator::new(matcher_for(catalog), 80.0);
    let outcome = aggregator.run(&sources).await;

    assert_eq!(outcome.success_rate, 0.0);
    assert_eq!(outcome.stop_reason, StopReason::SourcesExhausted);
    assert_eq!(outcome.state.len(), total);
    assert!(outcome.state.iter().all(|r| r.programs.is_empty()));
    assert_eq!(outcome.reports.len(), 3);
    assert!(outcome
        .reports
        .iter()
        .all(|r| matches!(r.status, SourceStatus::Failed(_))));

    let generator = XmltvGenerator::new(
        chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        chrono_tz::Asia::Shanghai,
        "EPG Aggregator",
        "",
    );
    let xml = generator.generate(outcome.state.results()).unwrap();
    assert_eq!(xml.matches("<channel ").count(), total);
    assert_eq!(xml.matches("<programme ").count(), 0);

    let dir = TempDir::new().unwrap();
    let output = OutputConfig {
        dir: dir.path().to_path_buf(),
        ..OutputConfig::default()
    };
    let written = write_artifact(&xml, &output).unwrap();
    assert!(written.gzip_path.exists());
    assert!(written.gzip_bytes > 0);
}

#[tokio::test]
async fn test_deferred_source_backfills_only_empty_cctv_channels() {
    let catalog = ChannelCatalog::builtin();
    let cctv: Vec<String> = catalog.iter().filter(|c| c.is_cctv()).map(|c| c.name.clone()).collect();
    let satellite: Vec<String> = catalog.iter().filter(|c| !c.is_cctv()).map(|c| c.name.clone()).collect();

    let primary = ScriptedSource::new("primary", SourceStaging::Single)
        .respond(FetchMode::All, schedule_for(cctv[..16].iter().map(String::as_str)));

    let mut non_cctv = schedule_for(satellite.iter().map(String::as_str));
    non_cctv.insert("CCTV-1 综合".to_string(), vec![RawProgram::new("06:00", "朝闻天下")]);
    let mut cctv_only = schedule_for(cctv[16..].iter().map(String::as_str));
    cctv_only.insert("央视一套".to_string(), vec![RawProgram::new("07:00", "新闻直播间")]);

    let deferred = ScriptedSource::new("deferred", SourceStaging::CctvDeferred)
        .respond(FetchMode::NonCctv, non_cctv)
        .respond(FetchMode::CctvOnly, cctv_only);
    let deferred_calls = deferred.calls();

    let mut aggregator = Aggregator::new(matcher_for(catalog), 100.0);
    let outcome = aggregator.run(&boxed(vec![primary, deferred])).await;

    assert_eq!(
        *deferred_calls.lock().unwrap(),
        vec![FetchMode::NonCctv, FetchMode::CctvOnly]
    );
    assert_eq!(outcome.success_rate, 100.0);
    assert_eq!(outcome.stop_reason, StopReason::ThresholdMet);

    // CCTV1 was filled by the primary source; neither phase may touch it
    let cctv1 = outcome.state.get("CCTV1").unwrap();
    assert_eq!(cctv1.programs.len(), 1);
    assert_eq!(cctv1.programs[0].time, "08:00");

    let report = &outcome.reports[1];
    assert_eq!(report.status, SourceStatus::Completed);
    assert_eq!(report.channels_skipped, 2);
    assert_eq!(report.channels_matched, satellite.len() + 2);
}

#[tokio::test]
async fn test_deferred_source_skips_cctv_fetch_when_complete() {
    let catalog = ChannelCatalog::builtin();
    let cctv: Vec<String> = catalog.iter().filter(|c| c.is_cctv()).map(|c| c.name.clone()).collect();

    let primary = ScriptedSource::new("primary", SourceStaging::Single)
        .respond(FetchMode::All, schedule_for(cctv.iter().map(String::as_str)));
    let deferred = ScriptedSource::new("deferred", SourceStaging::CctvDeferred)
        .respond(FetchMode::NonCctv, schedule_for(["湖南卫视高清", "浙江卫视"]));
    let deferred_calls = deferred.calls();

    let mut aggregator = Aggregator::new(matcher_for(catalog), 100.0);
    let outcome = aggregator.run(&boxed(vec![primary, deferred])).await;

    assert_eq!(*deferred_calls.lock().unwrap(), vec![FetchMode::NonCctv]);
    assert!(outcome.state.has_programs("HunanTV"));
    assert!(outcome.state.has_programs("ZhejiangTV"));
    assert_eq!(outcome.stop_reason, StopReason::SourcesExhausted);
}

#[tokio::test]
async fn test_empty_source_list() {
    let mut aggregator = Aggregator::new(matcher_for(cctv_catalog()), 80.0);
    let outcome = aggregator.run(&[]).await;

    assert_eq!(outcome.success_rate, 0.0);
    assert_eq!(outcome.stop_reason, StopReason::SourcesExhausted);
    assert!(outcome.reports.is_empty());
    assert_eq!(outcome.state.len(), 18);
}
