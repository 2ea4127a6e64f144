use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single program entry exactly as a source reported it
///
/// `time` is a wall-clock start time, `"HH:MM"` once it has passed through
/// [`crate::utils::time::canonical_clock`]. Only some sources know the end time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawProgram {
    pub time: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl RawProgram {
    pub fn new<T: Into<String>, S: Into<String>>(time: T, title: S) -> Self {
        Self {
            time: time.into(),
            title: title.into(),
            end_time: None,
        }
    }

    pub fn with_end_time<E: Into<String>>(mut self, end_time: E) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    /// Identity used for deduplication
    pub fn key(&self) -> (&str, &str) {
        (&self.time, &self.title)
    }
}

/// What one source fetch returns: free-text channel name to its programs
pub type RawSchedule = BTreeMap<String, Vec<RawProgram>>;

/// Catalog partition used by the staged fetch policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelGroup {
    Cctv,
    Satellite,
}

/// A canonical channel of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub group: ChannelGroup,
}

impl Channel {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N, group: ChannelGroup) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group,
        }
    }

    pub fn is_cctv(&self) -> bool {
        self.group == ChannelGroup::Cctv
    }
}

/// Consolidated programs for one catalog channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelResult {
    pub channel_id: String,
    pub name: String,
    pub programs: Vec<RawProgram>,
}

impl ChannelResult {
    pub fn empty(channel: &Channel) -> Self {
        Self {
            channel_id: channel.id.clone(),
            name: channel.name.clone(),
            programs: Vec::new(),
        }
    }

    pub fn has_programs(&self) -> bool {
        !self.programs.is_empty()
    }
}
