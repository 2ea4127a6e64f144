//! Resolves source-supplied channel names to catalog ids

use std::sync::Arc;

use tracing::trace;

use super::catalog::ChannelCatalog;
use super::normalizer::NameNormalizer;
use crate::utils::channel_similarity::{
    ChannelSimilarityAnalyzer, SimilarityResult, SimilarityType,
};

/// Matching knobs taken from `[channel_matching]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingOptions {
    pub fuzzy_match: bool,
    pub fuzzy_threshold: f64,
}

impl Default for MatchingOptions {
    fn default() -> Self {
        Self {
            fuzzy_match: true,
            fuzzy_threshold: 0.8,
        }
    }
}

/// Channel matcher over an immutable catalog
///
/// Catalog display names are normalized once up front so a lookup costs one
/// normalization of the incoming name plus a scan of the catalog.
#[derive(Debug, Clone)]
pub struct ChannelMatcher {
    catalog: Arc<ChannelCatalog>,
    normalizer: NameNormalizer,
    analyzer: Option<ChannelSimilarityAnalyzer>,
    normalized_names: Vec<(String, String)>,
}

impl ChannelMatcher {
    pub fn new(
        catalog: Arc<ChannelCatalog>,
        normalizer: NameNormalizer,
        options: MatchingOptions,
    ) -> Self {
        let normalized_names = catalog
            .iter()
            .map(|channel| (channel.id.clone(), normalizer.normalize(&channel.name)))
            .collect();
        let analyzer = options
            .fuzzy_match
            .then(|| ChannelSimilarityAnalyzer::new(options.fuzzy_threshold));

        Self {
            catalog,
            normalizer,
            analyzer,
            normalized_names,
        }
    }

    pub fn catalog(&self) -> &ChannelCatalog {
        &self.catalog
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    /// Catalog id for `raw_name`, or `None` when nothing is close enough
    pub fn match_channel(&self, raw_name: &str) -> Option<&str> {
        let normalized = self.normalizer.normalize(raw_name);

        if let Some((id, _)) = self
            .normalized_names
            .iter()
            .find(|(_, name)| *name == normalized)
        {
            return Some(id.as_str());
        }

        let analyzer = self.analyzer.as_ref()?;

        let mut best: Option<(&str, SimilarityResult)> = None;
        for (id, name) in &self.normalized_names {
            let result = analyzer.analyze_similarity(name, &normalized);
            if best
                .as_ref()
                .map_or(true, |(_, current)| result.confidence > current.confidence)
            {
                best = Some((id.as_str(), result));
            }
        }

        let (id, result) = best?;
        trace!(
            "Best fuzzy candidate for '{}' is '{}' ({:.3} against {:.2})",
            raw_name,
            id,
            result.confidence,
            analyzer.threshold()
        );
        (result.similarity_type != SimilarityType::Different).then_some(id)
    }
}
