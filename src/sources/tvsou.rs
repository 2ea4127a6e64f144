//! tvsou source
//!
//! Two index pages (CCTV and satellite) link to one schedule page per
//! channel; each schedule page is a `time | title` table.

use std::collections::HashSet;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};
use url::Url;

use super::http::SourceHttpClient;
use super::traits::{EpgSource, FetchMode};
use crate::errors::{SourceError, SourceResult};
use crate::models::{RawProgram, RawSchedule};
use crate::utils::html::{links, table_rows};

pub const SOURCE_NAME: &str = "tvsou";

const GROUP_LABELS: &[&str] = &["央视", "卫视"];

const CCTV_KEYWORDS: &[&str] = &["CCTV", "央视", "中央电视台"];

const SATELLITE_KEYWORDS: &[&str] = &[
    "卫视", "东方", "浙江", "湖南", "江苏", "广东", "北京", "安徽", "山东", "河南", "湖北",
    "四川", "重庆", "天津", "江西", "福建", "云南", "贵州", "黑龙江", "吉林", "辽宁", "内蒙古",
    "山西", "陕西", "甘肃", "青海", "宁夏", "新疆", "西藏", "广西", "海南",
];

fn weekday_label_regex() -> &'static Regex {
    static WEEKDAY: OnceLock<Regex> = OnceLock::new();
    WEEKDAY.get_or_init(|| {
        Regex::new(r"^(周一|周二|周三|周四|周五|周六|周日)").expect("valid weekday regex")
    })
}

/// A channel schedule page found on an index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLink {
    pub name: String,
    pub url: String,
}

pub struct TvsouSource {
    http: SourceHttpClient,
    cctv_index_url: String,
    satellite_index_url: String,
}

impl TvsouSource {
    pub fn new(http: SourceHttpClient, cctv_index_url: String, satellite_index_url: String) -> Self {
        Self {
            http,
            cctv_index_url,
            satellite_index_url,
        }
    }

    fn index_urls(&self, mode: FetchMode) -> Vec<&str> {
        match mode {
            FetchMode::All => vec![
                self.cctv_index_url.as_str(),
                self.satellite_index_url.as_str(),
            ],
            FetchMode::NonCctv => vec![self.satellite_index_url.as_str()],
            FetchMode::CctvOnly => vec![self.cctv_index_url.as_str()],
        }
    }

    async fn fetch_index(&self, index_url: &str, schedule: &mut RawSchedule) -> SourceResult<()> {
        let base = Url::parse(index_url).map_err(|e| {
            SourceError::invalid_config("endpoints.tvsou_*_url", format!("{}: {}", index_url, e))
        })?;
        let index = self.http.get_text(index_url).await?;
        let channels = parse_index_page(&index, &base);
        debug!("tvsou index {} lists {} channels", index_url, channels.len());

        for channel in channels {
            if !is_cctv_or_satellite(&channel.name) {
                debug!("tvsou: skipping non CCTV/satellite channel {}", channel.name);
                continue;
            }
            self.http.pace().await;
            match self.http.get_text(&channel.url).await {
                Ok(page) => {
                    let programs = parse_channel_page(&page);
                    if programs.is_empty() {
                        warn!("tvsou: no programs found for {}", channel.name);
                    } else {
                        debug!("tvsou: {} programs for {}", programs.len(), channel.name);
                        schedule.insert(channel.name, programs);
                    }
                }
                Err(e) => warn!("tvsou: fetching {} failed: {}", channel.url, e),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EpgSource for TvsouSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self, mode: FetchMode) -> SourceResult<RawSchedule> {
        let mut schedule = RawSchedule::new();
        for index_url in self.index_urls(mode) {
            if let Err(e) = self.fetch_index(index_url, &mut schedule).await {
                warn!("tvsou index {} failed: {}", index_url, e);
            }
        }

        if schedule.is_empty() {
            return Err(SourceError::no_data(SOURCE_NAME));
        }
        info!("tvsou returned schedules for {} channels", schedule.len());
        Ok(schedule)
    }
}

/// Channel links of an index page, deduplicated by URL, in page order
///
/// Hrefs are resolved against `index_url`, the page they were found on.
pub fn parse_index_page(html: &str, index_url: &Url) -> Vec<ChannelLink> {
    let mut seen = HashSet::new();
    links(html)
        .into_iter()
        .filter(|link| {
            link.href.contains("/epg/")
                && (link.href.contains("yangshi") || link.href.contains("weishi"))
                && !link.href.contains("_w")
        })
        .filter(|link| {
            !link.text.is_empty()
                && !GROUP_LABELS.contains(&link.text.as_str())
                && !weekday_label_regex().is_match(&link.text)
        })
        .filter_map(|link| match index_url.join(&link.href) {
            Ok(url) => Some(ChannelLink {
                name: link.text,
                url: url.to_string(),
            }),
            Err(e) => {
                debug!("tvsou: ignoring unresolvable link {}: {}", link.href, e);
                None
            }
        })
        .filter(|channel| seen.insert(channel.url.clone()))
        .collect()
}

/// Programs of a channel page: rows whose first cell looks like a time
pub fn parse_channel_page(html: &str) -> Vec<RawProgram> {
    let mut seen = HashSet::new();
    table_rows(html)
        .into_iter()
        .filter(|cells| cells.len() >= 2)
        .filter(|cells| cells[0].contains(':') && !cells[1].is_empty())
        .map(|cells| RawProgram::new(cells[0].clone(), cells[1].clone()))
        .filter(|program| seen.insert((program.time.clone(), program.title.clone())))
        .collect()
}

/// Whether a tvsou channel name looks like a CCTV or provincial satellite channel
pub fn is_cctv_or_satellite(name: &str) -> bool {
    CCTV_KEYWORDS
        .iter()
        .chain(SATELLITE_KEYWORDS)
        .any(|keyword| name.contains(keyword))
}
