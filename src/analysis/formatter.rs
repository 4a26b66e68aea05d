//! Report formatting: latency summaries to per-class and unified CSV tables.
//!
//! Delays are converted to milliseconds and every float column is written
//! with four decimals. Missing values are empty fields.

use crate::config::ClassMap;
use crate::error::{ReportError, Result};

use super::types::*;

/// Decimal places of every float column
pub const DECIMALS: usize = 4;

pub const LATENCY_CLASS_COLUMNS: [&str; 6] = [
    "config_name",
    "class_name",
    "sample_count",
    "min_ms",
    "mean_ms",
    "max_ms",
];

pub const UNIFIED_COLUMNS: [&str; 15] = [
    "config_name",
    "class_name",
    "sample_count",
    "min_ms",
    "mean_ms",
    "max_ms",
    "jitter_ms",
    "active_rate_hz",
    "estimated_mbps",
    "utilization_percent",
    "stream",
    "pcp",
    "global_rate_hz",
    "active_duration_s",
    "packet_bytes",
];

fn to_ms(seconds: Option<f64>) -> Option<f64> {
    seconds.map(|s| s * 1e3)
}

fn fmt_float(value: f64) -> String {
    format!("{:.*}", DECIMALS, value)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(fmt_float).unwrap_or_default()
}

/// Reject zero, negative and non-finite simulation durations
pub fn validate_sim_time(sim_time_s: f64) -> Result<()> {
    if sim_time_s.is_finite() && sim_time_s > 0.0 {
        Ok(())
    } else {
        Err(ReportError::InvalidDuration(sim_time_s))
    }
}

/// One row per class with delays in milliseconds
pub fn latency_class_rows(report: &LatencyReport, config_name: &str) -> Result<Vec<LatencyClassRow>> {
    if report.is_empty() {
        return Err(ReportError::MissingClass);
    }

    Ok(report
        .iter()
        .map(|class| LatencyClassRow {
            config_name: config_name.to_string(),
            class_name: class.class_name.clone(),
            sample_count: class.summary.sample_count,
            min_ms: to_ms(class.summary.min_delay_seconds),
            mean_ms: to_ms(class.summary.mean_delay_seconds),
            max_ms: to_ms(class.summary.max_delay_seconds),
        })
        .collect())
}

/// Build unified rows: latency plus rate, bandwidth and link utilization.
///
/// Rates are computed over the class's active window from the class map
/// (clamped to the simulation), or over the whole simulation when the class
/// has no window. Bandwidth assumes every sample is one packet of the class's
/// `packet_bytes`.
pub fn unified_rows(
    report: &LatencyReport,
    config_name: &str,
    sim_time_s: f64,
    map: &ClassMap,
) -> Result<Vec<UnifiedReportRow>> {
    validate_sim_time(sim_time_s)?;
    if report.is_empty() {
        return Err(ReportError::MissingClass);
    }

    let rows = report
        .iter()
        .map(|class| {
            let summary = &class.summary;
            let def = map.class(&class.class_name);

            let active_duration_s = def
                .and_then(|d| d.active_window)
                .map(|w| w.duration_within(sim_time_s))
                .filter(|d| *d > 0.0)
                .unwrap_or(sim_time_s);
            let packet_bytes = map.packet_bytes_for(&class.class_name);

            let count = summary.sample_count as f64;
            let active_rate_hz = count / active_duration_s;
            let global_rate_hz = count / sim_time_s;
            let estimated_mbps = count * packet_bytes as f64 * 8.0 / active_duration_s / 1e6;
            let utilization_percent = estimated_mbps / map.link_capacity_mbps * 100.0;

            UnifiedReportRow {
                config_name: config_name.to_string(),
                class_name: class.class_name.clone(),
                sample_count: summary.sample_count,
                min_ms: to_ms(summary.min_delay_seconds),
                mean_ms: to_ms(summary.mean_delay_seconds),
                max_ms: to_ms(summary.max_delay_seconds),
                jitter_ms: to_ms(summary.jitter_seconds),
                active_rate_hz,
                estimated_mbps,
                utilization_percent,
                stream: summary
                    .stream
                    .clone()
                    .or_else(|| def.and_then(|d| d.stream.clone())),
                pcp: summary.pcp.or_else(|| def.and_then(|d| d.pcp)),
                global_rate_hz,
                active_duration_s,
                packet_bytes,
            }
        })
        .collect();

    Ok(rows)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ReportError::InputFormat(format!("failed to render CSV: {}", e)))
}

fn csv_error(e: csv::Error) -> ReportError {
    ReportError::InputFormat(format!("failed to render CSV: {}", e))
}

/// Render the per-class latency CSV
pub fn render_latency_classes_csv(rows: &[LatencyClassRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(LATENCY_CLASS_COLUMNS).map_err(csv_error)?;

    for row in rows {
        writer
            .write_record([
                row.config_name.clone(),
                row.class_name.clone(),
                row.sample_count.to_string(),
                fmt_opt(row.min_ms),
                fmt_opt(row.mean_ms),
                fmt_opt(row.max_ms),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

/// Render the unified report CSV
pub fn render_unified_csv(rows: &[UnifiedReportRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(UNIFIED_COLUMNS).map_err(csv_error)?;

    for row in rows {
        writer
            .write_record([
                row.config_name.clone(),
                row.class_name.clone(),
                row.sample_count.to_string(),
                fmt_opt(row.min_ms),
                fmt_opt(row.mean_ms),
                fmt_opt(row.max_ms),
                fmt_opt(row.jitter_ms),
                fmt_float(row.active_rate_hz),
                fmt_float(row.estimated_mbps),
                fmt_float(row.utilization_percent),
                row.stream.clone().unwrap_or_default(),
                row.pcp.map(|p| p.to_string()).unwrap_or_default(),
                fmt_float(row.global_rate_hz),
                fmt_float(row.active_duration_s),
                row.packet_bytes.to_string(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}
