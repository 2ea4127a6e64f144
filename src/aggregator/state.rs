//! Running per-channel results for one aggregation run

use std::collections::HashMap;

use super::merger::merge_programs;
use crate::channels::ChannelCatalog;
use crate::models::{ChannelResult, RawProgram};

/// One [`ChannelResult`] per catalog channel, in catalog order
///
/// Seeded with empty program lists; entries are never added or removed after
/// construction, and programs only change through [`merge_programs`].
#[derive(Debug, Clone)]
pub struct AggregationState {
    results: Vec<ChannelResult>,
    index: HashMap<String, usize>,
}

impl AggregationState {
    pub fn new(catalog: &ChannelCatalog) -> Self {
        let results: Vec<ChannelResult> = catalog.iter().map(ChannelResult::empty).collect();
        let index = results
            .iter()
            .enumerate()
            .map(|(position, result)| (result.channel_id.clone(), position))
            .collect();
        Self { results, index }
    }

    pub fn get(&self, channel_id: &str) -> Option<&ChannelResult> {
        self.index
            .get(channel_id)
            .map(|&position| &self.results[position])
    }

    pub fn has_programs(&self, channel_id: &str) -> bool {
        self.get(channel_id).is_some_and(ChannelResult::has_programs)
    }

    /// Merge `programs` into a channel's list; `false` for unknown ids
    pub fn merge_into(&mut self, channel_id: &str, programs: Vec<RawProgram>) -> bool {
        let Some(&position) = self.index.get(channel_id) else {
            return false;
        };
        let result = &mut self.results[position];
        let existing = std::mem::take(&mut result.programs);
        result.programs = merge_programs(existing, programs);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelResult> {
        self.results.iter()
    }

    pub fn results(&self) -> &[ChannelResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Channels holding at least one program
    pub fn filled_count(&self) -> usize {
        self.results.iter().filter(|r| r.has_programs()).count()
    }

    /// Filled channels among those accepted by `include`
    pub fn filled_count_where<F>(&self, include: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.results
            .iter()
            .filter(|r| r.has_programs() && include(&r.channel_id))
            .count()
    }

    pub fn total_programs(&self) -> usize {
        self.results.iter().map(|r| r.programs.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_with_every_catalog_channel() {
        let catalog = ChannelCatalog::builtin();
        let state = AggregationState::new(&catalog);
        assert_eq!(state.len(), catalog.len());
        assert_eq!(state.filled_count(), 0);
        assert_eq!(state.results()[0].channel_id, "CCTV1");
        assert_eq!(state.get("HunanTV").unwrap().name, "湖南卫视");
    }

    #[test]
    fn test_merge_into_known_and_unknown_channels() {
        let catalog = ChannelCatalog::builtin();
        let mut state = AggregationState::new(&catalog);

        assert!(state.merge_into("CCTV1", vec![RawProgram::new("09:00", "B")]));
        assert!(state.merge_into(
            "CCTV1",
            vec![RawProgram::new("08:00", "A"), RawProgram::new("09:00", "B")]
        ));
        assert!(!state.merge_into("Nope", vec![RawProgram::new("08:00", "A")]));

        let cctv1 = state.get("CCTV1").unwrap();
        assert_eq!(cctv1.programs.len(), 2);
        assert_eq!(cctv1.programs[0].time, "08:00");
        assert_eq!(state.len(), catalog.len());
        assert!(state.has_programs("CCTV1"));
        assert_eq!(state.filled_count_where(|id| catalog.is_cctv(id)), 1);
        assert_eq!(state.filled_count_where(|id| !catalog.is_cctv(id)), 0);
        assert_eq!(state.total_programs(), 2);
    }
}
