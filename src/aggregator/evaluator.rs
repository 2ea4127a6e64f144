use super::state::AggregationState;

/// Percentage of `total_channels` that hold at least one program, two decimals
///
/// Returns `0.0` for an empty catalog.
pub fn success_rate(state: &AggregationState, total_channels: usize) -> f64 {
    percentage(state.filled_count(), total_channels)
}

pub fn percentage(filled: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = filled as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelCatalog;
    use crate::models::{Channel, ChannelGroup, RawProgram};

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(8, 10), 80.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(15, 18), 83.33);
        assert_eq!(percentage(48, 48), 100.0);
    }

    #[test]
    fn test_success_rate_counts_non_empty_channels() {
        let catalog = ChannelCatalog::new(
            (0..10)
                .map(|i| Channel::new(format!("C{i}"), format!("Channel {i}"), ChannelGroup::Satellite))
                .collect(),
        )
        .unwrap();
        let mut state = AggregationState::new(&catalog);
        assert_eq!(success_rate(&state, catalog.len()), 0.0);

        for i in 0..8 {
            state.merge_into(&format!("C{i}"), vec![RawProgram::new("08:00", "News")]);
        }
        assert_eq!(success_rate(&state, catalog.len()), 80.0);
    }

    #[test]
    fn test_empty_catalog_scores_zero() {
        let catalog = ChannelCatalog::new(Vec::new()).unwrap();
        let state = AggregationState::new(&catalog);
        assert_eq!(success_rate(&state, 0), 0.0);
    }
}
