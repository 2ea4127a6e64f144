//! XMLTV document generation

use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::models::{ChannelResult, RawProgram};
use crate::utils::time::{end_of_day, local_datetime, XMLTV_TIME_FORMAT};

/// Renders aggregated channel results for one guide date
#[derive(Debug, Clone)]
pub struct XmltvGenerator {
    date: NaiveDate,
    tz: Tz,
    generator_name: String,
    generator_url: String,
}

/// Start and stop of one programme
#[derive(Debug, Clone, PartialEq)]
pub struct ProgrammeSlot<'a> {
    pub program: &'a RawProgram,
    pub start: DateTime<Tz>,
    pub stop: DateTime<Tz>,
}

impl XmltvGenerator {
    pub fn new<N: Into<String>, U: Into<String>>(
        date: NaiveDate,
        tz: Tz,
        generator_name: N,
        generator_url: U,
    ) -> Self {
        Self {
            date,
            tz,
            generator_name: generator_name.into(),
            generator_url: generator_url.into(),
        }
    }

    /// Full XMLTV document: every channel first, then every programme
    pub fn generate(&self, results: &[ChannelResult]) -> AppResult<String> {
        let mut xmltv = String::new();

        xmltv.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xmltv.push_str("<!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n");
        xmltv.push_str(&format!(
            "<tv generator-info-name=\"{}\" generator-info-url=\"{}\">\n",
            escape_xml(&self.generator_name),
            escape_xml(&self.generator_url)
        ));

        for result in results {
            xmltv.push_str(&format!(
                "  <channel id=\"{}\">\n",
                escape_xml(&result.channel_id)
            ));
            xmltv.push_str(&format!(
                "    <display-name lang=\"zh\">{}</display-name>\n",
                escape_xml(&result.name)
            ));
            xmltv.push_str("  </channel>\n");
        }

        for result in results {
            for slot in self.programme_slots(&result.programs)? {
                xmltv.push_str(&format!(
                    "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">\n",
                    slot.start.format(XMLTV_TIME_FORMAT),
                    slot.stop.format(XMLTV_TIME_FORMAT),
                    escape_xml(&result.channel_id)
                ));
                xmltv.push_str(&format!(
                    "    <title lang=\"zh\">{}</title>\n",
                    escape_xml(&slot.program.title)
                ));
                xmltv.push_str("  </programme>\n");
            }
        }

        xmltv.push_str("</tv>\n");

        Ok(xmltv)
    }

    /// Place a time-ordered program list on the guide date
    ///
    /// Each programme stops one second before the next strictly later start;
    /// the last one runs to 23:59:59. Programs sharing a start time get the
    /// same stop.
    pub fn programme_slots<'a>(&self, programs: &'a [RawProgram]) -> AppResult<Vec<ProgrammeSlot<'a>>> {
        let day_end = end_of_day(self.date, self.tz).ok_or_else(|| {
            AppError::internal(format!("cannot compute end of day for {}", self.date))
        })?;

        let mut slots = Vec::with_capacity(programs.len());
        for (position, program) in programs.iter().enumerate() {
            let Some(start) = local_datetime(self.date, &program.time, self.tz) else {
                debug!(
                    "Skipping '{}': {} does not exist on {} in {}",
                    program.title, program.time, self.date, self.tz
                );
                continue;
            };

            let stop = programs[position + 1..]
                .iter()
                .find(|next| next.time > program.time)
                .and_then(|next| local_datetime(self.date, &next.time, self.tz))
                .map(|next_start| next_start - Duration::seconds(1))
                .unwrap_or(day_end);

            slots.push(ProgrammeSlot {
                program,
                start,
                stop,
            });
        }

        Ok(slots)
    }
}

/// Escape XML special characters
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
