//! Native OMNeT++ result files (`.sca` scalars, `.vec` vectors).
//!
//! Used when a run should be summarized per module without going through the
//! CSV-R export.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ReportError, Result};

use super::stats::{self, Spread};
use super::types::*;

/// Vector name prefixes treated as delay measurements
pub const DELAY_PREFIXES: &[&str] = &["endToEndDelay", "oneWayDelay", "delay"];

/// Match: "vector <id> <module> <name> [ETV]"
static VECTOR_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^vector\s+(\d+)\s+("[^"]*"|\S+)\s+("[^"]*"|\S+)"#).expect("Invalid vector definition regex")
});

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| ReportError::read(path, e))?;
    Ok(BufReader::with_capacity(64 * 1024, file))
}

/// Parse `scalar <module> <name> <value>` lines; anything else is skipped
pub fn parse_scalars<R: Read>(reader: R) -> Result<Vec<ScalarRecord>> {
    let mut scalars = Vec::new();

    for line in BufReader::new(reader).lines() {
        let line = line.map_err(|e| ReportError::InputFormat(e.to_string()))?;
        let line = line.trim();
        if !line.starts_with("scalar ") {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }

        let Some(value) = parts[3].parse::<f64>().ok().filter(|v| v.is_finite()) else {
            log::debug!("Skipping non-numeric scalar {} {}", parts[1], parts[2]);
            continue;
        };

        scalars.push(ScalarRecord {
            module: unquote(parts[1]).to_string(),
            name: unquote(parts[2]).to_string(),
            value,
        });
    }

    Ok(scalars)
}

/// Parse delay-like vectors, samples grouped by module in file order
pub fn parse_delay_vectors<R: Read>(reader: R) -> Result<BTreeMap<String, Vec<Sample>>> {
    let mut modules_by_id: HashMap<u64, String> = HashMap::new();
    let mut per_module: BTreeMap<String, Vec<Sample>> = BTreeMap::new();

    for line in BufReader::new(reader).lines() {
        let line = line.map_err(|e| ReportError::InputFormat(e.to_string()))?;

        if let Some(caps) = VECTOR_DEF.captures(&line) {
            let name = unquote(&caps[3]);
            if DELAY_PREFIXES.iter().any(|p| name.starts_with(p)) {
                if let Ok(id) = caps[1].parse::<u64>() {
                    modules_by_id.insert(id, unquote(&caps[2]).to_string());
                }
            }
            continue;
        }

        if !line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }

        // "<id> [<event>] <time> <value>": time and value are always last
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }
        let Some(module) = parts[0].parse::<u64>().ok().and_then(|id| modules_by_id.get(&id)) else {
            continue;
        };
        let (Ok(time), Ok(value)) = (
            parts[parts.len() - 2].parse::<f64>(),
            parts[parts.len() - 1].parse::<f64>(),
        ) else {
            continue;
        };
        if !(time.is_finite() && value.is_finite()) {
            continue;
        }

        per_module
            .entry(module.clone())
            .or_default()
            .push(Sample { time, value });
    }

    Ok(per_module)
}

pub fn load_scalars(path: &Path) -> Result<Vec<ScalarRecord>> {
    let scalars = parse_scalars(open(path)?)?;
    log::info!("Parsed {} scalars from {}", scalars.len(), path.display());
    Ok(scalars)
}

pub fn load_delay_vectors(path: &Path) -> Result<BTreeMap<String, Vec<Sample>>> {
    let vectors = parse_delay_vectors(open(path)?)?;
    log::info!("Parsed delay vectors of {} modules from {}", vectors.len(), path.display());
    Ok(vectors)
}

/// Per-module delay statistics joined with packet counters
pub fn summarize_modules(
    delays: &BTreeMap<String, Vec<Sample>>,
    scalars: &[ScalarRecord],
) -> Vec<ModuleDelaySummary> {
    let lookup: HashMap<(&str, &str), f64> = scalars
        .iter()
        .map(|s| ((s.module.as_str(), s.name.as_str()), s.value))
        .collect();

    delays
        .iter()
        .filter_map(|(module, samples)| {
            let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
            let spread = Spread::of(&values)?;
            Some(ModuleDelaySummary {
                module: module.clone(),
                count: values.len(),
                min: spread.min,
                max: spread.max,
                mean: spread.mean,
                p50: stats::percentile(&values, 50.0)?,
                p95: stats::percentile(&values, 95.0)?,
                rcvd_pk: lookup.get(&(module.as_str(), "rcvdPk:count")).copied(),
                sent_pk: lookup.get(&(module.as_str(), "sentPk:count")).copied(),
            })
        })
        .collect()
}

/// Parse a run's vector and scalar files side by side and summarize it
pub fn analyze_run(vec_path: &Path, sca_path: &Path) -> Result<Vec<ModuleDelaySummary>> {
    let (delays, scalars) = rayon::join(
        || load_delay_vectors(vec_path),
        || load_scalars(sca_path),
    );
    Ok(summarize_modules(&delays?, &scalars?))
}

fn csv_error(e: csv::Error) -> ReportError {
    ReportError::InputFormat(format!("failed to render CSV: {}", e))
}

fn render<I, R>(header: &[&str], records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header).map_err(csv_error)?;
    for record in records {
        writer.write_record(record).map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::InputFormat(format!("failed to render CSV: {}", e)))
}

/// Render scalars as `module,name,value`
pub fn render_scalars_csv(scalars: &[ScalarRecord]) -> Result<Vec<u8>> {
    render(
        &["module", "name", "value"],
        scalars
            .iter()
            .map(|s| [s.module.clone(), s.name.clone(), s.value.to_string()]),
    )
}

/// Render module summaries; missing packet counters are empty fields
pub fn render_module_summary_csv(summaries: &[ModuleDelaySummary]) -> Result<Vec<u8>> {
    let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    render(
        &["module", "metric", "count", "min", "max", "mean", "p50", "p95", "rcvdPk", "sentPk"],
        summaries.iter().map(|s| {
            [
                s.module.clone(),
                "latency".to_string(),
                s.count.to_string(),
                s.min.to_string(),
                s.max.to_string(),
                s.mean.to_string(),
                s.p50.to_string(),
                s.p95.to_string(),
                opt(s.rcvd_pk),
                opt(s.sent_pk),
            ]
        }),
    )
}
