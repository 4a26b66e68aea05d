//! Report generation for latency analysis.
//!
//! Writes and validates the JSON latency summary, and renders the
//! human-readable text report and console tables.

use std::fs;
use std::path::Path;

use crate::error::{ReportError, Result};
use crate::utils::write_atomic;

use super::types::*;

/// Serialize a latency summary to pretty JSON.
///
/// Output is deterministic: classes keep their order and floats are written
/// in shortest round-trip form.
pub fn render_summary_json(report: &LatencyReport) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)
        .map_err(|e| ReportError::InputFormat(format!("failed to serialize summary: {}", e)))?;
    json.push('\n');
    Ok(json)
}

/// Generate JSON summary
pub fn generate_json_report(report: &LatencyReport, output_path: &Path) -> Result<()> {
    let json = render_summary_json(report)?;
    write_atomic(output_path, json.as_bytes())?;

    log::info!("JSON summary written to {}", output_path.display());
    Ok(())
}

/// Parse and validate a JSON latency summary
pub fn parse_summary_json(content: &str) -> Result<LatencyReport> {
    let report: LatencyReport = serde_json::from_str(content)
        .map_err(|e| ReportError::InputFormat(format!("invalid latency summary: {}", e)))?;

    if report.is_empty() {
        return Err(ReportError::MissingClass);
    }

    for class in report.iter() {
        class.summary.check_invariants().map_err(|reason| {
            ReportError::InputFormat(format!("class {}: {}", class.class_name, reason))
        })?;
    }

    Ok(report)
}

/// Load a JSON latency summary from disk
pub fn load_summary_json(path: &Path) -> Result<LatencyReport> {
    let content = fs::read_to_string(path).map_err(|e| ReportError::read(path, e))?;
    let report = parse_summary_json(&content)?;
    log::info!("Loaded latency summary for {} classes from {}", report.len(), path.display());
    Ok(report)
}

fn cell(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}

/// Render the unified report as text
pub fn generate_text_report(
    rows: &[UnifiedReportRow],
    config_name: &str,
    sim_time_s: f64,
    link_capacity_mbps: f64,
    generated_at: &str,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(80));
    lines.push("                       TSN LATENCY AND BANDWIDTH REPORT".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!("Generated: {}", generated_at));
    lines.push(format!("Configuration: {}", config_name));
    lines.push(format!("Simulation time: {} s", sim_time_s));
    lines.push(format!("Link capacity: {} Mbps", link_capacity_mbps));
    lines.push(String::new());

    for row in rows {
        let pcp = row.pcp.map(|p| format!(", PCP {}", p)).unwrap_or_default();
        let stream = row.stream.as_deref().map(|s| format!(" ({}{})", s, pcp)).unwrap_or_default();
        lines.push(format!("{}{}", row.class_name, stream));

        if row.sample_count == 0 {
            lines.push("  No end-to-end delay samples recorded".to_string());
            lines.push(String::new());
            continue;
        }

        lines.push(format!("  Samples: {}", row.sample_count));
        lines.push(format!(
            "  Delay [ms]: min {} / mean {} / max {}",
            cell(row.min_ms, 4),
            cell(row.mean_ms, 4),
            cell(row.max_ms, 4)
        ));
        lines.push(format!("  Jitter [ms]: {}", cell(row.jitter_ms, 4)));
        lines.push(format!(
            "  Rate: {:.1} Hz active over {:.4} s, {:.1} Hz over the whole run",
            row.active_rate_hz, row.active_duration_s, row.global_rate_hz
        ));
        lines.push(format!(
            "  Bandwidth: {:.3} Mbps at {} B/packet ({:.4}% of link)",
            row.estimated_mbps, row.packet_bytes, row.utilization_percent
        ));
        lines.push(String::new());
    }

    lines.push("=".repeat(80));
    lines.push(String::new());
    lines.join("\n")
}

/// Print per-class latency bands to stdout
pub fn print_latency_table(report: &LatencyReport) {
    println!("\nPer-traffic-class end-to-end latency (ms):\n");
    let header = format!(
        "{:<12} {:<10} {:<4} {:>8} {:>12} {:>12} {:>12} {:>12}",
        "Class", "Stream", "PCP", "Count", "Min [ms]", "Mean [ms]", "Max [ms]", "Jitter [ms]"
    );
    println!("{}", header);
    println!("{}", "-".repeat(header.len()));

    let ms = |v: Option<f64>| cell(v.map(|s| s * 1e3), 3);
    for class in report.iter() {
        let s = &class.summary;
        println!(
            "{:<12} {:<10} {:<4} {:>8} {:>12} {:>12} {:>12} {:>12}",
            class.class_name,
            s.stream.as_deref().unwrap_or("-"),
            s.pcp.map_or_else(|| "-".to_string(), |p| p.to_string()),
            s.sample_count,
            ms(s.min_delay_seconds),
            ms(s.mean_delay_seconds),
            ms(s.max_delay_seconds),
            ms(s.jitter_seconds),
        );
    }
    println!();
}

/// Print the unified report to stdout
pub fn print_unified_table(rows: &[UnifiedReportRow]) {
    println!("\nUnified TSN report (per traffic class):\n");
    let header = format!(
        "{:<12} {:>10} {:>12} {:>14} {:>14} {:>10} {:>9}",
        "Class", "Mean [ms]", "Jitter [ms]", "ActRate [Hz]", "GlobRate [Hz]", "Mbps", "Util %"
    );
    println!("{}", header);
    println!("{}", "-".repeat(header.len()));

    for row in rows {
        let present = row.sample_count > 0;
        let num = |v: f64, precision: usize| cell(present.then_some(v), precision);
        println!(
            "{:<12} {:>10} {:>12} {:>14} {:>14} {:>10} {:>9}",
            row.class_name,
            cell(row.mean_ms, 3),
            cell(row.jitter_ms, 3),
            num(row.active_rate_hz, 1),
            num(row.global_rate_hz, 1),
            num(row.estimated_mbps, 3),
            num(row.utilization_percent, 4),
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_validates() {
        let good = r#"{
            "CONTROL": {"sample_count": 2, "min_delay_seconds": 0.001, "mean_delay_seconds": 0.0015,
                        "max_delay_seconds": 0.002, "jitter_seconds": 0.001, "stddev_seconds": 0.0005},
            "SENSOR": {"sample_count": 0}
        }"#;
        let report = parse_summary_json(good).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report.classes[0].class_name, "CONTROL");
        assert_eq!(report.get("SENSOR").unwrap().mean_delay_seconds, None);

        assert!(matches!(parse_summary_json("{}"), Err(ReportError::MissingClass)));
        assert!(matches!(
            parse_summary_json(r#"{"CONTROL": {"sample_count": 0, "min_delay_seconds": 0.0}}"#),
            Err(ReportError::InputFormat(_))
        ));
        assert!(matches!(
            parse_summary_json(r#"{"CONTROL": {"sample_count": 1, "min_delay_seconds": 0.3,
                "mean_delay_seconds": 0.2, "max_delay_seconds": 0.1}}"#),
            Err(ReportError::InputFormat(_))
        ));
    }

    #[test]
    fn test_summary_json_round_trips_exactly() {
        // xorshift64 over delays in the 10us..1ms range
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            1e-5 + (state >> 11) as f64 / (1u64 << 53) as f64 * 1e-3
        };

        for _ in 0..2_000 {
            let mut values = [next(), next(), next()];
            values.sort_by(f64::total_cmp);
            let report = LatencyReport {
                classes: vec![ClassLatency {
                    class_name: "CONTROL".to_string(),
                    summary: LatencySummary {
                        stream: None,
                        pcp: None,
                        sample_count: 3,
                        min_delay_seconds: Some(values[0]),
                        mean_delay_seconds: Some(values[1]),
                        max_delay_seconds: Some(values[2]),
                        jitter_seconds: Some(next()),
                        stddev_seconds: Some(next()),
                    },
                }],
            };

            let json = render_summary_json(&report).unwrap();
            assert_eq!(parse_summary_json(&json).unwrap(), report, "{}", json);
        }
    }

    #[test]
    fn test_truncated_summary_is_rejected() {
        let truncated = r#"{"CONTROL": {"sample_count": 2, "min_delay_se"#;
        assert!(matches!(
            parse_summary_json(truncated),
            Err(ReportError::InputFormat(_))
        ));
    }

    #[test]
    fn test_text_report_mentions_every_class() {
        let rows = vec![UnifiedReportRow {
            config_name: "cfg".to_string(),
            class_name: "SENSOR".to_string(),
            sample_count: 0,
            min_ms: None,
            mean_ms: None,
            max_ms: None,
            jitter_ms: None,
            active_rate_hz: 0.0,
            estimated_mbps: 0.0,
            utilization_percent: 0.0,
            stream: Some("sensor".to_string()),
            pcp: Some(4),
            global_rate_hz: 0.0,
            active_duration_s: 0.5,
            packet_bytes: 1024,
        }];

        let text = generate_text_report(&rows, "cfg", 0.5, 1000.0, "2024-01-01T00:00:00Z");
        assert!(text.contains("Configuration: cfg"));
        assert!(text.contains("SENSOR (sensor, PCP 4)"));
        assert!(text.contains("No end-to-end delay samples recorded"));
    }
}
