//! Reader for CSV-R exports produced by `opp_scavetool export -F CSV-R`.
//!
//! The export has one row per result item with a `type` column (`scalar`,
//! `vector`, `statistics`, ...). Vector rows carry their samples in the
//! parallel `vectime` / `vecvalue` fields.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ReportError, Result};

use super::types::{ResultRecord, Sample};

/// Statistic name fragment identifying end-to-end delay vectors
pub const DELAY_STATISTIC: &str = "endToEndDelay";

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct Columns {
    run: Option<usize>,
    kind: Option<usize>,
    module: usize,
    name: usize,
    vectime: usize,
    vecvalue: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |column: &str| headers.iter().position(|h| h.trim() == column);
        let require = |column: &str| {
            find(column).ok_or_else(|| {
                ReportError::InputFormat(format!("results CSV has no '{}' column", column))
            })
        };

        Ok(Self {
            run: find("run"),
            kind: find("type"),
            module: require("module")?,
            name: require("name")?,
            vectime: require("vectime")?,
            vecvalue: require("vecvalue")?,
        })
    }
}

/// An exported row whose sample series has not been parsed yet
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub line: u64,
    /// Value of the `run` column; empty when the export has none
    pub run: String,
    /// Value of the `type` column, if the export has one
    pub kind: Option<String>,
    pub module: String,
    pub name: String,
    vectime: String,
    vecvalue: String,
}

impl ResultRow {
    /// Whether the row is an end-to-end delay vector
    pub fn is_delay_vector(&self) -> bool {
        let is_vector = self.kind.as_deref().map_or(true, |k| k == "vector");
        is_vector && self.name.contains(DELAY_STATISTIC)
    }

    /// Parse the sample series into a record
    pub fn into_record(self) -> Result<ResultRecord> {
        let times = parse_series(&self.vectime, self.line, "vectime")?;
        let values = parse_series(&self.vecvalue, self.line, "vecvalue")?;

        if times.len() != values.len() {
            return Err(ReportError::MalformedInput {
                line: self.line,
                reason: format!(
                    "{} has {} timestamps but {} values",
                    self.module,
                    times.len(),
                    values.len()
                ),
            });
        }

        let samples = times
            .into_iter()
            .zip(values)
            .map(|(time, value)| Sample { time, value })
            .collect();

        Ok(ResultRecord {
            line: self.line,
            run: self.run,
            module: self.module,
            name: self.name,
            samples,
        })
    }
}

/// Parse a sample series; numbers may be separated by whitespace, `;` or `,`
pub fn parse_series(field: &str, line: u64, column: &str) -> Result<Vec<f64>> {
    field
        .split(|c: char| c.is_whitespace() || c == ';' || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ReportError::MalformedInput {
                line,
                reason: format!("{} contains non-numeric sample '{}'", column, token),
            }),
        })
        .collect()
}

/// Read all rows of a CSV-R export
pub fn read_result_rows<R: Read>(reader: R) -> Result<Vec<ResultRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ReportError::InputFormat(format!("cannot read CSV header: {}", e)))?
        .clone();

    if headers.is_empty() {
        return Err(ReportError::EmptyInput("results CSV has no header row".to_string()));
    }

    let columns = Columns::from_headers(&headers)?;
    let field = |record: &csv::StringRecord, idx: usize| record.get(idx).unwrap_or("").to_string();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| ReportError::InputFormat(e.to_string()))?;
        let line = record.position().map_or(0, |p| p.line());

        rows.push(ResultRow {
            line,
            run: columns.run.map(|idx| field(&record, idx)).unwrap_or_default(),
            kind: columns.kind.map(|idx| field(&record, idx)),
            module: field(&record, columns.module),
            name: field(&record, columns.name),
            vectime: field(&record, columns.vectime),
            vecvalue: field(&record, columns.vecvalue),
        });
    }

    log::debug!("Read {} result rows", rows.len());
    Ok(rows)
}

/// Read a CSV-R export from disk
pub fn load_result_rows(path: &Path) -> Result<Vec<ResultRow>> {
    let file = File::open(path).map_err(|e| ReportError::read(path, e))?;
    read_result_rows(file)
}
