//! Program list merging

use std::collections::HashSet;

use crate::models::RawProgram;

/// Merge `incoming` into `existing` for one channel
///
/// Programs already present by `(time, title)` are skipped, new ones are
/// appended in their original order, and the result is stably sorted by the
/// `"HH:MM"` time string. Two programs sharing a start time but not a title
/// both survive.
pub fn merge_programs(existing: Vec<RawProgram>, incoming: Vec<RawProgram>) -> Vec<RawProgram> {
    if existing.is_empty() {
        return incoming;
    }
    if incoming.is_empty() {
        return existing;
    }

    let mut seen: HashSet<(String, String)> = existing
        .iter()
        .map(|p| (p.time.clone(), p.title.clone()))
        .collect();

    let mut merged = existing;
    for program in incoming {
        if seen.insert((program.time.clone(), program.title.clone())) {
            merged.push(program);
        }
    }

    merged.sort_by(|a, b| a.time.cmp(&b.time));
    merged
}
