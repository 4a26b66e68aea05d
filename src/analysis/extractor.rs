//! Delay/jitter extraction: CSV-R delay vectors grouped into traffic classes.
//!
//! Samples of one class are put in arrival order (timestamp, ties in row
//! order) before jitter is computed, so several sink modules feeding the same
//! class interleave the way the packets arrived. Arrival order only exists
//! inside one simulation run: an export with several runs keeps a sequence
//! per run, and jitter never compares samples of different runs.

use std::path::Path;

use crate::config::{ClassMap, UnmatchedPolicy, UNKNOWN_CLASS};
use crate::error::{ReportError, Result};

use super::classify::ClassMatcher;
use super::results_csv::{load_result_rows, ResultRow};
use super::stats::{self, Spread};
use super::types::*;

/// Samples of one class, one arrival sequence per run (in first-seen order)
#[derive(Debug, Clone, Default)]
struct RunBuckets(Vec<(String, Vec<Sample>)>);

impl RunBuckets {
    fn extend(&mut self, run: &str, samples: Vec<Sample>) {
        match self.0.iter_mut().find(|(r, _)| r == run) {
            Some((_, bucket)) => bucket.extend(samples),
            None => self.0.push((run.to_string(), samples)),
        }
    }

    fn into_sequences(self) -> Vec<Vec<Sample>> {
        self.0
            .into_iter()
            .map(|(_, mut samples)| {
                sort_by_arrival(&mut samples);
                samples
            })
            .collect()
    }
}

/// Summarize delay samples, one slice per run, each already in arrival order.
///
/// Count, min/mean/max and stddev pool every sample; jitter is the mean of
/// the successive differences inside each run.
pub fn summarize_runs(
    runs: &[Vec<Sample>],
    stream: Option<String>,
    pcp: Option<u8>,
) -> LatencySummary {
    let per_run: Vec<Vec<f64>> = runs
        .iter()
        .map(|samples| samples.iter().map(|s| s.value).collect())
        .collect();
    let values: Vec<f64> = per_run.iter().flatten().copied().collect();

    let Some(spread) = Spread::of(&values) else {
        return LatencySummary::empty(stream, pcp);
    };

    LatencySummary {
        stream,
        pcp,
        sample_count: values.len() as u64,
        min_delay_seconds: Some(spread.min),
        mean_delay_seconds: Some(spread.mean),
        max_delay_seconds: Some(spread.max),
        jitter_seconds: stats::pooled_successive_difference_jitter(
            per_run.iter().map(Vec::as_slice),
        ),
        stddev_seconds: stats::std_dev(&values),
    }
}

/// Group delay vector rows into traffic classes and summarize each class.
///
/// Every class of the map appears in the result, in map order; classes
/// without rows have a zero count. With [`UnmatchedPolicy::Unknown`] an
/// `UNKNOWN` class is appended when some delay rows matched no class.
pub fn extract_latency(rows: Vec<ResultRow>, map: &ClassMap) -> Result<LatencyReport> {
    let matcher = ClassMatcher::new(map)?;

    let mut buckets: Vec<RunBuckets> = vec![RunBuckets::default(); matcher.len()];
    let mut unknown = RunBuckets::default();
    let mut matched_rows = 0usize;
    let mut unmatched_rows = 0usize;
    let mut unknown_rows = 0usize;

    for row in rows.into_iter().filter(ResultRow::is_delay_vector) {
        let target = match (matcher.classify(&row.module), map.unmatched) {
            (Some(idx), _) => &mut buckets[idx],
            (None, UnmatchedPolicy::Unknown) => {
                unknown_rows += 1;
                &mut unknown
            }
            (None, UnmatchedPolicy::Drop) => {
                log::debug!("Dropping delay vector of unmatched module {}", row.module);
                unmatched_rows += 1;
                continue;
            }
        };

        let record = row.into_record()?;
        log::debug!(
            "{} {} {}: {} samples",
            record.run,
            record.module,
            record.name,
            record.samples.len()
        );
        target.extend(&record.run, record.samples);
        matched_rows += 1;
    }

    if unmatched_rows > 0 {
        log::warn!(
            "{} delay vectors matched no traffic class and were dropped",
            unmatched_rows
        );
    }

    if matched_rows == 0 {
        return Err(ReportError::EmptyInput(if unmatched_rows > 0 {
            format!(
                "found {} endToEndDelay vectors, but none matched a traffic class pattern",
                unmatched_rows
            )
        } else {
            "no endToEndDelay vector rows found".to_string()
        }));
    }

    let mut classes: Vec<ClassLatency> = map
        .traffic_classes
        .iter()
        .zip(buckets)
        .map(|(class, runs)| ClassLatency {
            class_name: class.name.clone(),
            summary: summarize_runs(&runs.into_sequences(), class.stream.clone(), class.pcp),
        })
        .collect();

    if unknown_rows > 0 {
        classes.push(ClassLatency {
            class_name: UNKNOWN_CLASS.to_string(),
            summary: summarize_runs(&unknown.into_sequences(), None, None),
        });
    }

    let report = LatencyReport { classes };
    log::info!(
        "Extracted {} delay samples from {} vectors into {} classes",
        report.total_samples(),
        matched_rows,
        report.len()
    );
    Ok(report)
}

/// Read a CSV-R export and extract per-class latency
pub fn extract_from_csv(path: &Path, map: &ClassMap) -> Result<LatencyReport> {
    log::info!("Reading results from {}", path.display());
    let rows = load_result_rows(path)?;
    extract_latency(rows, map)
}

/// Stable sort on timestamp; rows are appended in file order so ties keep it
fn sort_by_arrival(samples: &mut [Sample]) {
    samples.sort_by(|a, b| a.time.total_cmp(&b.time));
}
