//! Channel name similarity for fuzzy catalog matching
//!
//! Scores two names with the Ratcliff/Obershelp "gestalt pattern matching"
//! ratio: `2·M / T` where `M` is the number of characters covered by matching
//! blocks and `T` the combined length of both names. Matching blocks are found
//! by taking the longest common run, then recursing on the pieces to its left
//! and right.

/// Result of comparing two channel names
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    /// Ratio in `0.0..=1.0`
    pub confidence: f64,
    pub similarity_type: SimilarityType,
}

/// Types of similarity between channel names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityType {
    /// Identical strings
    Exact,
    /// At or above the configured threshold
    Similar,
    /// Below the configured threshold
    Different,
}

/// A run of `len` equal characters at `a[a_start..]` and `b[b_start..]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

/// Threshold-aware channel similarity analyzer
#[derive(Debug, Clone)]
pub struct ChannelSimilarityAnalyzer {
    threshold: f64,
}

impl ChannelSimilarityAnalyzer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Analyze similarity between two already-normalized channel names
    pub fn analyze_similarity(&self, existing_name: &str, new_name: &str) -> SimilarityResult {
        let confidence = gestalt_ratio(existing_name, new_name);
        let similarity_type = if existing_name == new_name {
            SimilarityType::Exact
        } else if confidence >= self.threshold {
            SimilarityType::Similar
        } else {
            SimilarityType::Different
        };

        SimilarityResult {
            confidence,
            similarity_type,
        }
    }
}

/// Gestalt pattern matching ratio between two strings, compared per `char`
///
/// Two empty strings are considered identical (`1.0`).
pub fn gestalt_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 1.0;
    }

    let matched: usize = matching_blocks(&a_chars, &b_chars)
        .iter()
        .map(|block| block.len)
        .sum();

    2.0 * matched as f64 / total as f64
}

/// All matching blocks between `a` and `b`, ordered by position
pub fn matching_blocks(a: &[char], b: &[char]) -> Vec<MatchingBlock> {
    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut blocks = Vec::new();

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let block = longest_match(a, b, a_lo, a_hi, b_lo, b_hi);
        if block.len == 0 {
            continue;
        }

        if a_lo < block.a_start && b_lo < block.b_start {
            pending.push((a_lo, block.a_start, b_lo, block.b_start));
        }
        let a_end = block.a_start + block.len;
        let b_end = block.b_start + block.len;
        if a_end < a_hi && b_end < b_hi {
            pending.push((a_end, a_hi, b_end, b_hi));
        }
        blocks.push(block);
    }

    blocks.sort_by_key(|block| (block.a_start, block.b_start));
    blocks
}

/// Longest common run inside `a[a_lo..a_hi]` and `b[b_lo..b_hi]`
///
/// Ties go to the run starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> MatchingBlock {
    let mut best = MatchingBlock {
        a_start: a_lo,
        b_start: b_lo,
        len: 0,
    };

    // run_len[j + 1] = length of the common run ending at a[i - 1], b[j]
    let width = b_hi - b_lo;
    let mut previous = vec![0usize; width + 1];
    let mut current = vec![0usize; width + 1];

    for i in a_lo..a_hi {
        for j in b_lo..b_hi {
            let slot = j - b_lo + 1;
            if a[i] == b[j] {
                let run = previous[slot - 1] + 1;
                current[slot] = run;
                if run > best.len {
                    best = MatchingBlock {
                        a_start: i + 1 - run,
                        b_start: j + 1 - run,
                        len: run,
                    };
                }
            } else {
                current[slot] = 0;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_identical_and_empty_strings() {
        assert_eq!(gestalt_ratio("CCTV-1 综合", "CCTV-1 综合"), 1.0);
        assert_eq!(gestalt_ratio("", ""), 1.0);
        assert_eq!(gestalt_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_known_ratios() {
        // difflib.SequenceMatcher(None, "abcd", "bcde").ratio() == 0.75
        assert!((gestalt_ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
        // Blocks "WIKIM" and "IA": 2 * 7 / 18
        assert!((gestalt_ratio("WIKIMEDIA", "WIKIMANIA") - 14.0 / 18.0).abs() < 1e-9);
        assert!((gestalt_ratio("GESTALT PATTERN MATCHING", "GESTALT PRACTICE") - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_matching_blocks_are_found_left_and_right() {
        let blocks = matching_blocks(&chars("xabcyde"), &chars("abczde"));
        let lens: Vec<_> = blocks.iter().map(|b| b.len).collect();
        assert_eq!(lens, vec![3, 2]);
        assert_eq!(blocks[0], MatchingBlock { a_start: 1, b_start: 0, len: 3 });
    }

    #[test]
    fn test_longest_match_prefers_earliest_position() {
        let a = chars("abab");
        let b = chars("ab");
        let block = longest_match(&a, &b, 0, a.len(), 0, b.len());
        assert_eq!(block, MatchingBlock { a_start: 0, b_start: 0, len: 2 });
    }

    #[test]
    fn test_chinese_names_compare_per_character() {
        // Blocks "黑龙江" and "视": 2 * 4 / 10
        let ratio = gestalt_ratio("黑龙江卫视", "黑龙江电视");
        assert!((ratio - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_analyzer_classification() {
        let analyzer = ChannelSimilarityAnalyzer::new(0.8);
        assert_eq!(
            analyzer.analyze_similarity("湖南卫视", "湖南卫视").similarity_type,
            SimilarityType::Exact
        );
        assert_eq!(
            analyzer.analyze_similarity("黑龙江卫视", "黑龙江电视").similarity_type,
            SimilarityType::Similar
        );
        assert_eq!(
            analyzer.analyze_similarity("CCTV-1 综合", "湖南卫视").similarity_type,
            SimilarityType::Different
        );
    }
}
