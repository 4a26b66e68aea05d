//! Descriptive statistics over delay samples.
//!
//! All functions return `None` for inputs too short to define the statistic.

use std::cmp::Ordering;

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
}

/// Jitter as the mean absolute difference between consecutive samples.
///
/// `values` must be in arrival order; sorting them first would measure the
/// spread of the distribution instead of the sample-to-sample variation.
pub fn successive_difference_jitter(values: &[f64]) -> Option<f64> {
    pooled_successive_difference_jitter([values])
}

/// Jitter over several independent sequences (one per simulation run).
///
/// The mean is taken over every consecutive pair inside a sequence, so each
/// sequence weighs in by its number of pairs. No pair spans two sequences.
pub fn pooled_successive_difference_jitter<'a, I>(sequences: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let (total, pairs) = sequences
        .into_iter()
        .fold((0.0f64, 0usize), |(total, pairs), seq| {
            let diffs: f64 = seq.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
            (total + diffs, pairs + seq.len().saturating_sub(1))
        });
    (pairs > 0).then(|| total / pairs as f64)
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Percentile by rounded rank: `sorted[round(p/100 * (n-1))]`
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    Some(sorted[idx.min(sorted.len() - 1)])
}

/// min/mean/max of a non-empty sample set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl Spread {
    /// The mean is clamped into `[min, max]`: summing identical values can
    /// overshoot them by an ulp.
    pub fn of(values: &[f64]) -> Option<Self> {
        let min = min(values)?;
        let max = max(values)?;
        let mean = mean(values)?.clamp(min, max);
        Some(Self { min, mean, max })
    }
}
