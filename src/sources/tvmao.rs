//! tvmao listing-page source
//!
//! Listings are split into two-hour pages per weekday,
//! `<prefix>w<weekday>-h<slot>.html`, one table row per channel with one cell
//! per program (`title HH:MM-HH:MM`). CCTV and satellite channels live under
//! different prefixes. The CCTV pages are slow, so this source is staged
//! behind the dedicated CCTV source.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info, warn};

use super::http::SourceHttpClient;
use super::traits::{EpgSource, FetchMode, SourceStaging};
use crate::channels::NameNormalizer;
use crate::config::{EndpointsConfig, HttpConfig};
use crate::errors::{AppResult, SourceError, SourceResult};
use crate::models::{RawProgram, RawSchedule};
use crate::utils::html::{normalize_ws, table_rows};
use crate::utils::time::weekday_number;

pub const SOURCE_NAME: &str = "tvmao";

const SLOT_HOURS: std::ops::Range<u32> = 0..24;
const SLOT_STEP: usize = 2;

fn range_regex() -> &'static Regex {
    static RANGE: OnceLock<Regex> = OnceLock::new();
    RANGE.get_or_init(|| Regex::new(r"(\d{2}:\d{2})-(\d{2}:\d{2})").expect("valid range regex"))
}

fn trailing_range_regex() -> &'static Regex {
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    TRAILING.get_or_init(|| {
        Regex::new(r"\s*\d{2}:\d{2}-\d{2}:\d{2}\s*$").expect("valid trailing range regex")
    })
}

pub struct TvmaoSource {
    http: SourceHttpClient,
    referer: Option<String>,
    cctv_prefix: Option<String>,
    satellite_prefix: Option<String>,
    max_programs: usize,
    weekday: u32,
    normalizer: NameNormalizer,
}

impl TvmaoSource {
    pub fn new(
        http: &HttpConfig,
        endpoints: &EndpointsConfig,
        normalizer: NameNormalizer,
        date: NaiveDate,
    ) -> AppResult<Self> {
        let client = match endpoints.tvmao_referer.as_deref() {
            Some(referer) => SourceHttpClient::with_referer(http, referer)?,
            None => SourceHttpClient::new(http)?,
        };

        Ok(Self {
            http: client,
            referer: endpoints.tvmao_referer.clone(),
            cctv_prefix: endpoints.tvmao_cctv_prefix.clone(),
            satellite_prefix: endpoints.tvmao_satellite_prefix.clone(),
            max_programs: endpoints.max_programs_per_channel,
            weekday: weekday_number(date),
            normalizer,
        })
    }

    fn prefixes(&self, mode: FetchMode) -> Vec<(&'static str, Option<&str>)> {
        let cctv = ("cctv", self.cctv_prefix.as_deref());
        let satellite = ("satellite", self.satellite_prefix.as_deref());
        match mode {
            FetchMode::All => vec![cctv, satellite],
            FetchMode::NonCctv => vec![satellite],
            FetchMode::CctvOnly => vec![cctv],
        }
    }
}

#[async_trait]
impl EpgSource for TvmaoSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn staging(&self) -> SourceStaging {
        SourceStaging::CctvDeferred
    }

    async fn fetch(&self, mode: FetchMode) -> SourceResult<RawSchedule> {
        if self.referer.is_none() {
            return Err(SourceError::invalid_config(
                "endpoints.tvmao_referer",
                "TM_REFERER is not set",
            ));
        }

        let mut urls = Vec::new();
        for (group, prefix) in self.prefixes(mode) {
            match prefix {
                Some(prefix) => urls.extend(page_urls(prefix, self.weekday)),
                None => warn!("tvmao {} prefix is not configured, skipping", group),
            }
        }
        if urls.is_empty() {
            return Err(SourceError::invalid_config(
                "endpoints.tvmao_*_prefix",
                format!("no listing prefix configured for {:?}", mode),
            ));
        }

        let mut entries = Vec::new();
        for (position, url) in urls.iter().enumerate() {
            if position > 0 {
                self.http.pace().await;
            }
            let page = match self.http.get_text(url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("tvmao page {} failed: {}", url, e);
                    continue;
                }
            };
            let page_entries = parse_listing_page(&page, &self.normalizer);
            debug!("tvmao page {} yielded {} programs", url, page_entries.len());
            entries.extend(page_entries);
        }

        let schedule = build_schedule(entries, self.max_programs);
        if schedule.is_empty() {
            return Err(SourceError::no_data(SOURCE_NAME));
        }
        info!("tvmao returned schedules for {} channels", schedule.len());
        Ok(schedule)
    }
}

/// Two-hour page URLs for one weekday
pub fn page_urls(prefix: &str, weekday: u32) -> Vec<String> {
    SLOT_HOURS
        .step_by(SLOT_STEP)
        .map(|slot| format!("{}w{}-h{}.html", prefix, weekday, slot))
        .collect()
}

/// `(normalized channel name, program)` pairs of one listing page
///
/// Only the first row of each channel is read; `CCTV-1` and `CCTV1` rows
/// count as the same channel.
pub fn parse_listing_page(html: &str, normalizer: &NameNormalizer) -> Vec<(String, RawProgram)> {
    let mut seen_channels = HashSet::new();
    let mut entries = Vec::new();

    for cells in table_rows(html) {
        if cells.len() < 2 {
            continue;
        }
        let raw_channel = cells[0].trim();
        if raw_channel.is_empty() {
            continue;
        }
        let channel = normalizer.normalize(raw_channel);
        if !seen_channels.insert(channel.clone()) {
            continue;
        }

        for cell in &cells[1..] {
            let Some(range) = range_regex().captures(cell) else {
                continue;
            };
            let title = normalize_ws(&trailing_range_regex().replace(cell, ""));
            if title.is_empty() {
                continue;
            }
            entries.push((
                channel.clone(),
                RawProgram::new(&range[1], title).with_end_time(&range[2]),
            ));
        }
    }

    entries
}

/// Group page entries by channel and consolidate each channel's programs
pub fn build_schedule<I>(entries: I, max_programs: usize) -> RawSchedule
where
    I: IntoIterator<Item = (String, RawProgram)>,
{
    let mut collected: HashMap<String, Vec<RawProgram>> = HashMap::new();
    for (channel, program) in entries {
        collected.entry(channel).or_default().push(program);
    }

    collected
        .into_iter()
        .map(|(channel, programs)| {
            let programs = consolidate(programs, max_programs);
            if programs.len() == max_programs {
                debug!("tvmao channel {} capped at {} programs", channel, max_programs);
            }
            (channel, programs)
        })
        .filter(|(_, programs)| !programs.is_empty())
        .collect()
}

/// Dedupe by (time, title), sort, keep the first program per start time, cap
pub fn consolidate(programs: Vec<RawProgram>, max_programs: usize) -> Vec<RawProgram> {
    let mut seen = HashSet::new();
    let mut unique: Vec<RawProgram> = programs
        .into_iter()
        .filter(|p| seen.insert((p.time.clone(), p.title.clone())))
        .collect();
    unique.sort_by(|a, b| a.time.cmp(&b.time));
    unique.dedup_by(|later, earlier| later.time == earlier.time);
    unique.truncate(max_programs);
    unique
}
