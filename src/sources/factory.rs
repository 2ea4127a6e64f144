//! Source factory
//!
//! Maps configured source names to [`EpgSource`] implementations.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::cctv::{self, CctvApiSource};
use super::http::SourceHttpClient;
use super::traits::EpgSource;
use super::tvmao::{self, TvmaoSource};
use super::tvsou::{self, TvsouSource};
use crate::channels::NameNormalizer;
use crate::config::{EndpointsConfig, HttpConfig};
use crate::errors::{AppError, AppResult};

/// Everything a source needs to be built for one run
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub http: HttpConfig,
    pub endpoints: EndpointsConfig,
    /// Same normalizer the matcher uses, for sources that group by channel
    pub normalizer: NameNormalizer,
    /// Guide date being fetched
    pub date: NaiveDate,
    pub tz: Tz,
}

pub struct SourceFactory;

impl SourceFactory {
    /// Create the source registered under `name`
    ///
    /// # Errors
    /// Returns a configuration error for unknown names.
    pub fn create_source(name: &str, context: &SourceContext) -> AppResult<Arc<dyn EpgSource>> {
        match name {
            cctv::SOURCE_NAME => Ok(Arc::new(CctvApiSource::new(
                SourceHttpClient::new(&context.http)?,
                context.endpoints.cctv_api_url.clone(),
                context.date,
                context.tz,
            ))),
            tvmao::SOURCE_NAME => Ok(Arc::new(TvmaoSource::new(
                &context.http,
                &context.endpoints,
                context.normalizer.clone(),
                context.date,
            )?)),
            tvsou::SOURCE_NAME => Ok(Arc::new(TvsouSource::new(
                SourceHttpClient::new(&context.http)?,
                context.endpoints.tvsou_cctv_url.clone(),
                context.endpoints.tvsou_satellite_url.clone(),
            ))),
            other => Err(AppError::configuration(format!(
                "unknown source '{}', expected one of: {}",
                other,
                Self::supported_names().join(", ")
            ))),
        }
    }

    /// Create sources for `names`, keeping their order
    pub fn create_sources<S: AsRef<str>>(
        names: &[S],
        context: &SourceContext,
    ) -> AppResult<Vec<Arc<dyn EpgSource>>> {
        names
            .iter()
            .map(|name| Self::create_source(name.as_ref(), context))
            .collect()
    }

    pub fn supported_names() -> Vec<&'static str> {
        vec![cctv::SOURCE_NAME, tvmao::SOURCE_NAME, tvsou::SOURCE_NAME]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceStaging;

    fn context() -> SourceContext {
        SourceContext {
            http: HttpConfig::default(),
            endpoints: EndpointsConfig::default(),
            normalizer: NameNormalizer::default(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            tz: "Asia/Shanghai".parse().unwrap(),
        }
    }

    #[test]
    fn test_creates_sources_in_order() {
        let sources = SourceFactory::create_sources(&["tvsou", "cctv", "tvmao"], &context()).unwrap();
        let names: Vec<_> = sources.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["tvsou", "cctv", "tvmao"]);
        assert_eq!(sources[2].staging(), SourceStaging::CctvDeferred);
        assert_eq!(sources[0].staging(), SourceStaging::Single);
    }

    #[test]
    fn test_unknown_source_is_a_configuration_error() {
        let result = SourceFactory::create_source("epgpw", &context());
        assert!(matches!(result, Err(AppError::Configuration { .. })));
        let message = result.err().unwrap().to_string();
        assert!(message.contains("cctv, tvmao, tvsou"), "{message}");
    }
}
