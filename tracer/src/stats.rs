//! Aggregate statistics over a set of depths.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DepthSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
}

/// Mean and median of `depths`, or `None` for an empty set.
pub fn summarize(depths: &[u64]) -> Option<DepthSummary> {
    Some(DepthSummary {
        count: depths.len(),
        mean: mean(depths)?,
        median: median(depths)?,
    })
}

pub fn mean(depths: &[u64]) -> Option<f64> {
    if depths.is_empty() {
        return None;
    }
    let sum: u128 = depths.iter().map(|&d| u128::from(d)).sum();
    Some(sum as f64 / depths.len() as f64)
}

/// Middle value after sorting; the average of the two middle values for an
/// even count.
pub fn median(depths: &[u64]) -> Option<f64> {
    if depths.is_empty() {
        return None;
    }
    let mut sorted = depths.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid] as f64)
    } else {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    }
}
