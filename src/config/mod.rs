use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use tracing::debug;

use crate::channels::{AliasTable, ChannelCatalog, MatchingOptions};
use crate::errors::{AppError, AppResult};
use crate::models::{Channel, ChannelGroup};
use crate::utils::time::parse_timezone;

pub mod defaults;
use defaults::*;

/// Environment variables that override `[endpoints]` entries
pub const ENV_CCTV_API_URL: &str = "CCTV_API_URL";
pub const ENV_TVMAO_CCTV_PREFIX: &str = "TM_CCTV";
pub const ENV_TVMAO_SATELLITE_PREFIX: &str = "TM_SATELLITE";
pub const ENV_TVMAO_REFERER: &str = "TM_REFERER";
pub const ENV_TVSOU_CCTV_URL: &str = "TVSOU_CCTV_URL";
pub const ENV_TVSOU_SATELLITE_URL: &str = "TVSOU_SATELLITE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Stop fetching once this percentage of channels has programs
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f64,
    /// Timezone the guide is published in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub channel_matching: ChannelMatchingConfig,
    /// Sources in priority order; empty means the built-in order
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    /// Catalog override; empty means the built-in catalog
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMatchingConfig {
    #[serde(default = "default_fuzzy_match")]
    pub fuzzy_match: bool,
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// Appended after the built-in alias table
    #[serde(default)]
    pub extra_aliases: Vec<AliasConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasConfig {
    pub variant: String,
    pub canonical: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    pub name: String,
    #[serde(default = "default_channel_group")]
    pub group: ChannelGroup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_output_file_name")]
    pub file_name: String,
    /// Also write an uncompressed copy next to the gzip artifact
    #[serde(default = "default_write_plain_xml")]
    pub write_plain_xml: bool,
    #[serde(default = "default_generator_name")]
    pub generator_name: String,
    #[serde(default = "default_generator_url")]
    pub generator_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_http_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_http_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Pause between consecutive requests of one source
    #[serde(default = "default_http_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Upstream locations used by the bundled sources
///
/// The CCTV API template and the tvmao prefixes have no public default and
/// are usually supplied through the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Template with `{channel_id}` and `{date_str}` placeholders
    #[serde(default)]
    pub cctv_api_url: Option<String>,
    #[serde(default)]
    pub tvmao_cctv_prefix: Option<String>,
    #[serde(default)]
    pub tvmao_satellite_prefix: Option<String>,
    #[serde(default)]
    pub tvmao_referer: Option<String>,
    #[serde(default = "default_tvsou_cctv_url")]
    pub tvsou_cctv_url: String,
    #[serde(default = "default_tvsou_satellite_url")]
    pub tvsou_satellite_url: String,
    #[serde(default = "default_max_programs_per_channel")]
    pub max_programs_per_channel: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_success_threshold() -> f64 {
    DEFAULT_SUCCESS_THRESHOLD
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_fuzzy_match() -> bool {
    DEFAULT_FUZZY_MATCH
}

fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}

fn default_enabled() -> bool {
    true
}

fn default_channel_group() -> ChannelGroup {
    ChannelGroup::Satellite
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_output_file_name() -> String {
    DEFAULT_OUTPUT_FILE_NAME.to_string()
}

fn default_write_plain_xml() -> bool {
    DEFAULT_WRITE_PLAIN_XML
}

fn default_generator_name() -> String {
    DEFAULT_GENERATOR_NAME.to_string()
}

fn default_generator_url() -> String {
    DEFAULT_GENERATOR_URL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_http_max_retries() -> u32 {
    DEFAULT_HTTP_MAX_RETRIES
}

fn default_http_retry_delay_secs() -> u64 {
    DEFAULT_HTTP_RETRY_DELAY_SECS
}

fn default_http_request_delay_ms() -> u64 {
    DEFAULT_HTTP_REQUEST_DELAY_MS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_tvsou_cctv_url() -> String {
    DEFAULT_TVSOU_CCTV_URL.to_string()
}

fn default_tvsou_satellite_url() -> String {
    DEFAULT_TVSOU_SATELLITE_URL.to_string()
}

fn default_max_programs_per_channel() -> usize {
    DEFAULT_MAX_PROGRAMS_PER_CHANNEL
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            success_threshold: default_success_threshold(),
            timezone: default_timezone(),
            channel_matching: ChannelMatchingConfig::default(),
            sources: Vec::new(),
            channels: Vec::new(),
            output: OutputConfig::default(),
            http: HttpConfig::default(),
            endpoints: EndpointsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ChannelMatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_match: default_fuzzy_match(),
            fuzzy_threshold: default_fuzzy_threshold(),
            extra_aliases: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_name: default_output_file_name(),
            write_plain_xml: default_write_plain_xml(),
            generator_name: default_generator_name(),
            generator_url: default_generator_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout_secs(),
            max_retries: default_http_max_retries(),
            retry_delay_secs: default_http_retry_delay_secs(),
            request_delay_ms: default_http_request_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            cctv_api_url: None,
            tvmao_cctv_prefix: None,
            tvmao_satellite_prefix: None,
            tvmao_referer: None,
            tvsou_cctv_url: default_tvsou_cctv_url(),
            tvsou_satellite_url: default_tvsou_satellite_url(),
            max_programs_per_channel: default_max_programs_per_channel(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// The named file did not exist
    Defaults(PathBuf),
}

impl Config {
    /// Load from `$CONFIG_FILE` (default `config.toml`), then apply env overrides
    pub fn load() -> AppResult<(Self, ConfigOrigin)> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        let (mut config, origin) = Self::load_with_origin(&config_file)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((config, origin))
    }

    /// Parse a config file; a missing file yields the defaults
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        Self::load_with_origin(config_file).map(|(config, _)| config)
    }

    /// Like [`Config::load_from_file`], also reporting whether the file existed
    pub fn load_with_origin<P: AsRef<Path>>(config_file: P) -> AppResult<(Self, ConfigOrigin)> {
        let path = config_file.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            debug!("Loaded config file: {}", path.display());
            Ok((config, ConfigOrigin::File(path.to_path_buf())))
        } else {
            Ok((Self::default(), ConfigOrigin::Defaults(path.to_path_buf())))
        }
    }

    /// Overlay endpoint settings from the environment
    ///
    /// `lookup` is `std::env::var` in production; blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = value(ENV_CCTV_API_URL) {
            self.endpoints.cctv_api_url = Some(url);
        }
        if let Some(prefix) = value(ENV_TVMAO_CCTV_PREFIX) {
            self.endpoints.tvmao_cctv_prefix = Some(prefix);
        }
        if let Some(prefix) = value(ENV_TVMAO_SATELLITE_PREFIX) {
            self.endpoints.tvmao_satellite_prefix = Some(prefix);
        }
        if let Some(referer) = value(ENV_TVMAO_REFERER) {
            self.endpoints.tvmao_referer = Some(referer);
        }
        if let Some(url) = value(ENV_TVSOU_CCTV_URL) {
            self.endpoints.tvsou_cctv_url = url;
        }
        if let Some(url) = value(ENV_TVSOU_SATELLITE_URL) {
            self.endpoints.tvsou_satellite_url = url;
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=100.0).contains(&self.success_threshold) {
            return Err(AppError::validation(format!(
                "success_threshold must be between 0 and 100, got {}",
                self.success_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.channel_matching.fuzzy_threshold) {
            return Err(AppError::validation(format!(
                "channel_matching.fuzzy_threshold must be between 0 and 1, got {}",
                self.channel_matching.fuzzy_threshold
            )));
        }
        if self.output.file_name.trim().is_empty() {
            return Err(AppError::validation("output.file_name must not be empty"));
        }
        self.tz()?;
        Ok(())
    }

    pub fn tz(&self) -> AppResult<Tz> {
        parse_timezone(&self.timezone).map_err(AppError::configuration)
    }

    pub fn matching_options(&self) -> MatchingOptions {
        MatchingOptions {
            fuzzy_match: self.channel_matching.fuzzy_match,
            fuzzy_threshold: self.channel_matching.fuzzy_threshold,
        }
    }

    /// The configured catalog, or the built-in one when none is configured
    pub fn catalog(&self) -> AppResult<ChannelCatalog> {
        if self.channels.is_empty() {
            return Ok(ChannelCatalog::builtin());
        }
        ChannelCatalog::new(
            self.channels
                .iter()
                .map(|c| Channel::new(c.id.clone(), c.name.clone(), c.group))
                .collect(),
        )
    }

    /// Built-in aliases followed by `extra_aliases`
    pub fn alias_table(&self) -> AliasTable {
        let mut table = AliasTable::builtin();
        for alias in &self.channel_matching.extra_aliases {
            table.insert(alias.variant.clone(), alias.canonical.clone());
        }
        table
    }

    /// Enabled source names in priority order
    pub fn enabled_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            return DEFAULT_SOURCE_ORDER.iter().map(|s| s.to_string()).collect();
        }
        self.sources
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.name.clone())
            .collect()
    }

    /// Path of the gzip artifact
    pub fn artifact_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.file_name)
    }
}
