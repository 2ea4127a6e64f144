/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Aggregation defaults
pub const DEFAULT_SUCCESS_THRESHOLD: f64 = 80.0;
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";
pub const DEFAULT_SOURCE_ORDER: &[&str] = &["cctv", "tvmao", "tvsou"];

// Channel matching defaults
pub const DEFAULT_FUZZY_MATCH: bool = true;
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

// Output defaults
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "epg.xml.gz";
pub const DEFAULT_WRITE_PLAIN_XML: bool = false;
pub const DEFAULT_GENERATOR_NAME: &str = "EPG Aggregator";
pub const DEFAULT_GENERATOR_URL: &str = "";

// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_HTTP_MAX_RETRIES: u32 = 3;
pub const DEFAULT_HTTP_RETRY_DELAY_SECS: u64 = 2;
pub const DEFAULT_HTTP_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// Endpoint defaults
pub const DEFAULT_TVSOU_CCTV_URL: &str = "https://www.tvsou.com/epg/yangshi/";
pub const DEFAULT_TVSOU_SATELLITE_URL: &str = "https://www.tvsou.com/epg/weishi/";
pub const DEFAULT_MAX_PROGRAMS_PER_CHANNEL: usize = 60;

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";
