//! Top-N selection by memory

use crate::sampler::ProcessSample;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub rank: usize,
    pub sample: ProcessSample,
}

/// Keeps samples at or above `min_mb`, largest first, at most `limit` of
/// them. Equal-memory samples keep their input order.
pub fn rank(samples: Vec<ProcessSample>, min_mb: f64, limit: usize) -> Vec<RankedEntry> {
    let mut kept: Vec<ProcessSample> = samples
        .into_iter()
        .filter(|s| s.memory_mb >= min_mb)
        .collect();
    // sort_by is stable
    kept.sort_by(|a, b| b.memory_mb.total_cmp(&a.memory_mb));
    kept.truncate(limit);
    kept.into_iter()
        .enumerate()
        .map(|(rank, sample)| RankedEntry { rank, sample })
        .collect()
}
