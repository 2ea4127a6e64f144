//! Wall-clock helpers for program times and guide dates

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Format used for XMLTV `start`/`stop` attributes
pub const XMLTV_TIME_FORMAT: &str = "%Y%m%d%H%M%S %z";

/// Canonicalize a source time string to zero-padded `"HH:MM"`
///
/// Everything except digits and `:` is discarded first, so `"08:00 "` and
/// `"08:00▶"` both work. Hours of 24 and beyond wrap to `00`.
pub fn canonical_clock(raw: &str) -> Result<String, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .collect();

    let (hour, minute) = cleaned
        .split_once(':')
        .ok_or_else(|| format!("Invalid program time '{}': missing ':'", raw))?;

    let hour: u32 = hour
        .parse()
        .map_err(|_| format!("Invalid program time '{}': bad hour", raw))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| format!("Invalid program time '{}': bad minute", raw))?;

    if minute > 59 {
        return Err(format!("Invalid program time '{}': minute out of range", raw));
    }

    let hour = if hour >= 24 { 0 } else { hour };
    Ok(format!("{:02}:{:02}", hour, minute))
}

/// Parse a timezone name such as `Asia/Shanghai`
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|_| format!("Unknown timezone '{}'", name))
}

/// Parse a `YYYYMMDD` guide date
pub fn parse_guide_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d")
        .map_err(|e| format!("Invalid date '{}', expected YYYYMMDD: {}", value, e))
}

/// Today's date as seen in `tz`
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// ISO weekday number, Monday = 1
pub fn weekday_number(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// Unix timestamp (seconds) as `"HH:MM"` in `tz`
pub fn unix_to_clock(timestamp: i64, tz: Tz) -> Option<String> {
    let utc = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
    Some(utc.with_timezone(&tz).format("%H:%M").to_string())
}

/// Anchor a canonical `"HH:MM"` on `date` in `tz`
///
/// Ambiguous local times (DST fold) resolve to the earlier instant.
pub fn local_datetime(date: NaiveDate, clock: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let time = NaiveTime::parse_from_str(clock, "%H:%M").ok()?;
    tz.from_local_datetime(&date.and_time(time)).earliest()
}

/// Last second of `date` in `tz`
pub fn end_of_day(date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
    let next = date.checked_add_days(Days::new(1))?;
    let midnight = tz.from_local_datetime(&next.and_hms_opt(0, 0, 0)?).earliest()?;
    Some(midnight - chrono::Duration::seconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_clock_pads_and_cleans() {
        assert_eq!(canonical_clock("8:05").unwrap(), "08:05");
        assert_eq!(canonical_clock(" 19:30 ").unwrap(), "19:30");
        assert_eq!(canonical_clock("时间 07:00 ▶").unwrap(), "07:00");
    }

    #[test]
    fn test_canonical_clock_wraps_late_hours() {
        assert_eq!(canonical_clock("24:10").unwrap(), "00:10");
        assert_eq!(canonical_clock("25:00").unwrap(), "00:00");
    }

    #[test]
    fn test_canonical_clock_rejects_garbage() {
        assert!(canonical_clock("").is_err());
        assert!(canonical_clock("全天").is_err());
        assert!(canonical_clock("0800").is_err());
        assert!(canonical_clock("08:").is_err());
        assert!(canonical_clock("08:75").is_err());
        assert!(canonical_clock("08:00:00").is_err());
    }

    #[test]
    fn test_guide_date_and_weekday() {
        let date = parse_guide_date("20240115").unwrap();
        assert_eq!(weekday_number(date), 1);
        assert!(parse_guide_date("2024-01-15").is_err());
    }

    #[test]
    fn test_unix_to_clock_in_beijing_time() {
        let tz = parse_timezone("Asia/Shanghai").unwrap();
        // 2024-01-15T00:00:00Z is 08:00 in Beijing
        assert_eq!(unix_to_clock(1_705_276_800, tz).unwrap(), "08:00");
    }

    #[test]
    fn test_local_datetime_and_end_of_day() {
        let tz = parse_timezone("Asia/Shanghai").unwrap();
        let date = parse_guide_date("20240115").unwrap();

        let start = local_datetime(date, "19:00", tz).unwrap();
        assert_eq!(start.format(XMLTV_TIME_FORMAT).to_string(), "20240115190000 +0800");

        let end = end_of_day(date, tz).unwrap();
        assert_eq!(end.format(XMLTV_TIME_FORMAT).to_string(), "20240115235959 +0800");
    }

    #[test]
    fn test_unknown_timezone() {
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
