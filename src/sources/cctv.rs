//! CCTV schedule API source
//!
//! The API answers one channel per request with a JSONP body shaped like
//! `cb({"data": {"<code>": {"list": [{"title", "startTime", "endTime"}]}}})`,
//! times in unix seconds. Error responses carry an `errcode` field instead.

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::http::SourceHttpClient;
use super::traits::{EpgSource, FetchMode};
use crate::errors::{SourceError, SourceResult};
use crate::models::{RawProgram, RawSchedule};
use crate::utils::time::unix_to_clock;

pub const SOURCE_NAME: &str = "cctv";

/// API channel codes and the names reported for them
///
/// The regional CCTV-4 feeds (`cctveurope`, `cctvamerica`) are left out: their
/// names would fold onto CCTV-4 during matching.
const API_CHANNELS: &[(&str, &str)] = &[
    ("cctv1", "CCTV-1 综合"),
    ("cctv2", "CCTV-2 财经"),
    ("cctv3", "CCTV-3 综艺"),
    ("cctv4", "CCTV-4 中文国际"),
    ("cctv5", "CCTV-5 体育"),
    ("cctv5plus", "CCTV-5+ 体育赛事"),
    ("cctv6", "CCTV-6 电影"),
    ("cctv7", "CCTV-7 国防军事"),
    ("cctv8", "CCTV-8 电视剧"),
    ("cctvjilu", "CCTV-9 纪录"),
    ("cctv10", "CCTV-10 科教"),
    ("cctv11", "CCTV-11 戏曲"),
    ("cctv12", "CCTV-12 社会与法"),
    ("cctv13", "CCTV-13 新闻"),
    ("cctvchild", "CCTV-14 少儿"),
    ("cctv15", "CCTV-15 音乐"),
    ("cctv16", "CCTV-16 奥林匹克"),
    ("cctv17", "CCTV-17 农业农村"),
];

pub struct CctvApiSource {
    http: SourceHttpClient,
    url_template: Option<String>,
    date: NaiveDate,
    tz: Tz,
}

impl CctvApiSource {
    pub fn new(
        http: SourceHttpClient,
        url_template: Option<String>,
        date: NaiveDate,
        tz: Tz,
    ) -> Self {
        Self {
            http,
            url_template,
            date,
            tz,
        }
    }

    fn channel_url(template: &str, code: &str, date: NaiveDate) -> String {
        template
            .replace("{channel_id}", code)
            .replace("{date_str}", &date.format("%Y%m%d").to_string())
    }

    async fn fetch_channel(&self, template: &str, code: &str) -> SourceResult<Vec<RawProgram>> {
        let url = Self::channel_url(template, code, self.date);
        let body = self.http.get_text(&url).await?;
        parse_schedule(&body, self.tz)
    }
}

#[async_trait]
impl EpgSource for CctvApiSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self, mode: FetchMode) -> SourceResult<RawSchedule> {
        if mode == FetchMode::NonCctv {
            return Ok(RawSchedule::new());
        }

        let template = self.url_template.as_deref().ok_or_else(|| {
            SourceError::invalid_config("endpoints.cctv_api_url", "CCTV_API_URL is not set")
        })?;

        let mut schedule = RawSchedule::new();
        for (position, (code, name)) in API_CHANNELS.iter().enumerate() {
            if position > 0 {
                self.http.pace().await;
            }
            match self.fetch_channel(template, code).await {
                Ok(programs) if programs.is_empty() => {
                    debug!("CCTV API returned no programs for {}", code);
                }
                Ok(programs) => {
                    debug!("CCTV API returned {} programs for {}", programs.len(), code);
                    schedule.insert((*name).to_string(), programs);
                }
                Err(e) => warn!("CCTV API fetch for {} failed: {}", code, e),
            }
        }

        if schedule.is_empty() {
            return Err(SourceError::no_data(SOURCE_NAME));
        }
        info!("CCTV API returned schedules for {} channels", schedule.len());
        Ok(schedule)
    }
}

/// Payload between the first `(` and the last `)` of a JSONP body
pub fn strip_jsonp(body: &str) -> SourceResult<&str> {
    let start = body.find('(');
    let end = body.rfind(')');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&body[start + 1..end]),
        _ => Err(SourceError::parse_error(SOURCE_NAME, "response is not JSONP")),
    }
}

/// Programs of one channel's API response, start/end as `"HH:MM"` in `tz`
pub fn parse_schedule(body: &str, tz: Tz) -> SourceResult<Vec<RawProgram>> {
    let payload: Value = serde_json::from_str(strip_jsonp(body)?)
        .map_err(|e| SourceError::parse_error(SOURCE_NAME, e.to_string()))?;

    if let Some(code) = payload.get("errcode") {
        let message = payload
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("no message");
        return Err(SourceError::parse_error(
            SOURCE_NAME,
            format!("API error {}: {}", code, message),
        ));
    }

    let data = payload
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| SourceError::parse_error(SOURCE_NAME, "missing 'data' object"))?;

    let Some(list) = data
        .values()
        .find_map(|channel| channel.get("list").and_then(Value::as_array))
    else {
        return Ok(Vec::new());
    };

    let programs = list
        .iter()
        .filter_map(|entry| {
            let title = entry.get("title")?.as_str()?.trim();
            let start = unix_seconds(entry.get("startTime")?)?;
            let time = unix_to_clock(start, tz)?;
            let mut program = RawProgram::new(time, title);
            if let Some(end) = entry.get("endTime").and_then(unix_seconds) {
                if let Some(end_time) = unix_to_clock(end, tz) {
                    program = program.with_end_time(end_time);
                }
            }
            Some(program)
        })
        .collect();

    Ok(programs)
}

fn unix_seconds(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shanghai() -> Tz {
        "Asia/Shanghai".parse().unwrap()
    }

    #[test]
    fn test_strip_jsonp() {
        assert_eq!(strip_jsonp("cb({\"a\":(1)});").unwrap(), "{\"a\":(1)}");
        assert!(strip_jsonp("{\"a\":1}").is_err());
    }

    #[test]
    fn test_parse_schedule() {
        // 1705276800 = 2024-01-15 08:00 +08:00
        let body = r#"setItem1({"data":{"cctv1":{"isLive":"","list":[
            {"title":"朝闻天下","startTime":1705276800,"endTime":1705280400},
            {"title":" 新闻30分 ","startTime":"1705280400","endTime":1705282200},
            {"startTime":1705282200}
        ]}}});"#;

        let programs = parse_schedule(body, shanghai()).unwrap();
        assert_eq!(programs.len(), 2);
        assert_eq!(
            programs[0],
            RawProgram::new("08:00", "朝闻天下").with_end_time("09:00")
        );
        assert_eq!(programs[1].time, "09:00");
        assert_eq!(programs[1].title, "新闻30分");
    }

    #[test]
    fn test_errcode_is_a_failure() {
        let body = r#"cb({"errcode":"1001","msg":"invalid channel"})"#;
        let err = parse_schedule(body, shanghai()).unwrap_err();
        assert!(err.to_string().contains("1001"));
    }

    #[test]
    fn test_missing_list_yields_no_programs() {
        let body = r#"cb({"data":{"cctv1":{}}})"#;
        assert!(parse_schedule(body, shanghai()).unwrap().is_empty());

        let body = r#"cb({"nodata":true})"#;
        assert!(parse_schedule(body, shanghai()).is_err());
    }

    #[test]
    fn test_channel_url_template() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let url = CctvApiSource::channel_url(
            "https://api.test/epg?c={channel_id}&d={date_str}&cb=setItem1",
            "cctv5plus",
            date,
        );
        assert_eq!(url, "https://api.test/epg?c=cctv5plus&d=20240115&cb=setItem1");
    }

    #[test]
    fn test_api_channel_names_match_the_catalog() {
        use crate::channels::{ChannelCatalog, ChannelMatcher, MatchingOptions, NameNormalizer};
        use std::sync::Arc;

        let matcher = ChannelMatcher::new(
            Arc::new(ChannelCatalog::builtin()),
            NameNormalizer::default(),
            MatchingOptions::default(),
        );
        let mut ids: Vec<_> = API_CHANNELS
            .iter()
            .map(|(_, name)| matcher.match_channel(name).unwrap().to_string())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), API_CHANNELS.len());
    }
}
