//! Shared HTTP plumbing for the scraping sources

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::errors::{AppResult, SourceError, SourceResult};

/// Maximum random delay added to each retry wait
const RETRY_JITTER_MS: u64 = 250;

/// reqwest client with the retry and pacing policy from `[http]`
#[derive(Debug, Clone)]
pub struct SourceHttpClient {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
    request_delay: Duration,
}

impl SourceHttpClient {
    pub fn new(config: &HttpConfig) -> AppResult<Self> {
        Self::build(config, None)
    }

    /// Client that sends `Referer: referer` on every request
    pub fn with_referer(config: &HttpConfig, referer: &str) -> AppResult<Self> {
        Self::build(config, Some(referer))
    }

    fn build(config: &HttpConfig, referer: Option<&str>) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(referer) = referer {
            let value = HeaderValue::from_str(referer).map_err(|e| {
                SourceError::invalid_config("referer", format!("invalid header value: {}", e))
            })?;
            headers.insert(REFERER, value);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            request_delay: config.request_delay(),
        })
    }

    /// Pause between two requests of the same source
    pub async fn pace(&self) {
        if !self.request_delay.is_zero() {
            sleep(self.request_delay).await;
        }
    }

    /// GET `url` as text, retrying transient failures
    pub async fn get_text(&self, url: &str) -> SourceResult<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.get_text_once(url).await {
                Ok(body) => {
                    if attempt > 1 {
                        debug!("GET {} succeeded on attempt {}", url, attempt);
                    }
                    return Ok(body);
                }
                Err(e) if e.is_transient() && attempt <= self.max_retries => {
                    let jitter = Duration::from_millis(fastrand::u64(0..=RETRY_JITTER_MS));
                    let delay = self.retry_delay + jitter;
                    warn!(
                        "GET {} failed on attempt {}: {}. Retrying in {:?}",
                        url, attempt, e, delay
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_text_once(&self, url: &str) -> SourceResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: format!(
                    "{} - URL: {}",
                    status.canonical_reason().unwrap_or("Unknown"),
                    url
                ),
            });
        }

        response.text().await.map_err(|e| request_error(url, e))
    }
}

fn request_error(url: &str, error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::timeout(url)
    } else {
        SourceError::network(url, error.to_string())
    }
}
