//! Pipeline orchestration.
//!
//! Each `run_*` function is one CLI operation: read its inputs, compute the
//! whole result in memory, then write the outputs. Nothing is written when
//! reading or computing fails. If writing one of several outputs fails, the
//! outputs already written by the same call are removed.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::analysis::{self, formatter, omnet, report, LatencyClassRow, LatencyReport, UnifiedReportRow};
use crate::config::ClassMap;
use crate::error::{ReportError, Result};
use crate::utils::{resolve_scavetool, write_atomic};

fn check_config_name(config_name: &str) -> Result<()> {
    if config_name.trim().is_empty() {
        return Err(ReportError::Usage("--config-name cannot be empty".to_string()));
    }
    Ok(())
}

/// Extract per-class latency from a CSV-R export into a JSON summary
pub fn run_extract(results_csv: &Path, out_json: &Path, map: &ClassMap) -> Result<LatencyReport> {
    let latency = analysis::extract_from_csv(results_csv, map)?;
    report::generate_json_report(&latency, out_json)?;
    Ok(latency)
}

/// Write the per-class latency CSV for a JSON summary
pub fn run_latency_classes(
    in_json: &Path,
    out_csv: &Path,
    config_name: &str,
) -> Result<Vec<LatencyClassRow>> {
    check_config_name(config_name)?;

    let latency = report::load_summary_json(in_json)?;
    let rows = formatter::latency_class_rows(&latency, config_name)?;
    write_atomic(out_csv, &formatter::render_latency_classes_csv(&rows)?)?;

    log::info!("Latency class CSV written to {}", out_csv.display());
    Ok(rows)
}

/// Write the unified latency/bandwidth CSV for a JSON summary
pub fn run_unified(
    in_json: &Path,
    out_csv: &Path,
    config_name: &str,
    sim_time_s: f64,
    map: &ClassMap,
) -> Result<Vec<UnifiedReportRow>> {
    check_config_name(config_name)?;
    formatter::validate_sim_time(sim_time_s)?;

    let latency = report::load_summary_json(in_json)?;
    let rows = formatter::unified_rows(&latency, config_name, sim_time_s, map)?;
    write_atomic(out_csv, &formatter::render_unified_csv(&rows)?)?;

    log::info!("Unified report written to {}", out_csv.display());
    Ok(rows)
}

/// Files written by [`run_report`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    pub summary_json: PathBuf,
    pub latency_classes_csv: PathBuf,
    pub unified_csv: PathBuf,
    pub text_report: PathBuf,
}

impl ReportPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            summary_json: dir.join("latency_summary.json"),
            latency_classes_csv: dir.join("latency_classes.csv"),
            unified_csv: dir.join("unified_report.csv"),
            text_report: dir.join("report.txt"),
        }
    }
}

/// Write every output, or none: on failure the files already written are removed
fn write_all(outputs: &[(&Path, Vec<u8>)]) -> Result<()> {
    for (i, (path, contents)) in outputs.iter().enumerate() {
        if let Err(e) = write_atomic(path, contents) {
            for (written, _) in &outputs[..i] {
                if let Err(remove_err) = std::fs::remove_file(written) {
                    log::warn!("Failed to remove {}: {}", written.display(), remove_err);
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Full pipeline: extract, then both CSV tables and a text report
pub fn run_report(
    results_csv: &Path,
    out_dir: &Path,
    config_name: &str,
    sim_time_s: f64,
    map: &ClassMap,
) -> Result<(ReportPaths, Vec<UnifiedReportRow>)> {
    check_config_name(config_name)?;
    formatter::validate_sim_time(sim_time_s)?;

    let latency = analysis::extract_from_csv(results_csv, map)?;
    let json = report::render_summary_json(&latency)?;

    // Format from what the JSON says, exactly as the standalone formatter would
    let latency = report::parse_summary_json(&json)?;
    let class_rows = formatter::latency_class_rows(&latency, config_name)?;
    let unified = formatter::unified_rows(&latency, config_name, sim_time_s, map)?;
    let text = report::generate_text_report(
        &unified,
        config_name,
        sim_time_s,
        map.link_capacity_mbps,
        &chrono::Utc::now().to_rfc3339(),
    );

    let paths = ReportPaths::in_dir(out_dir);
    write_all(&[
        (paths.summary_json.as_path(), json.into_bytes()),
        (paths.latency_classes_csv.as_path(), formatter::render_latency_classes_csv(&class_rows)?),
        (paths.unified_csv.as_path(), formatter::render_unified_csv(&unified)?),
        (paths.text_report.as_path(), text.into_bytes()),
    ])?;

    log::info!("Reports written to {}", out_dir.display());
    Ok((paths, unified))
}

/// Export native result files to CSV-R with `opp_scavetool`
pub fn run_export(scavetool: Option<&Path>, inputs: &[PathBuf], out_csv: &Path) -> Result<()> {
    if inputs.is_empty() {
        return Err(ReportError::Usage("at least one .sca/.vec input is required".to_string()));
    }

    let tool = resolve_scavetool(scavetool).map_err(|e| ReportError::ExternalTool(e.to_string()))?;

    if let Some(parent) = out_csv.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ReportError::write(parent, e))?;
    }

    let mut command = Command::new(&tool);
    command.args(["export", "-F", "CSV-R", "-o"]).arg(out_csv).args(inputs);
    log::info!("Running {:?}", command);

    let status = command
        .status()
        .map_err(|e| ReportError::ExternalTool(format!("failed to start {}: {}", tool.display(), e)))?;

    if !status.success() {
        return Err(ReportError::ExternalTool(format!(
            "{} exited with {}",
            tool.display(),
            status
        )));
    }

    log::info!("Exported {} result files to {}", inputs.len(), out_csv.display());
    Ok(())
}

/// Dump the scalars of a `.sca` file to CSV
pub fn run_scalar_export(sca: &Path, out_csv: &Path) -> Result<usize> {
    let scalars = omnet::load_scalars(sca)?;
    write_atomic(out_csv, &omnet::render_scalars_csv(&scalars)?)?;

    log::info!("Wrote {} scalars to {}", scalars.len(), out_csv.display());
    Ok(scalars.len())
}

/// Per-module delay summary of one run, written to `<out_dir>/tsn_summary.csv`
pub fn run_module_summary(vec: &Path, sca: &Path, out_dir: &Path) -> Result<PathBuf> {
    let summaries = omnet::analyze_run(vec, sca)?;
    let out_csv = out_dir.join("tsn_summary.csv");
    write_atomic(&out_csv, &omnet::render_module_summary_csv(&summaries)?)?;

    log::info!("Summary of {} modules written to {}", summaries.len(), out_csv.display());
    Ok(out_csv)
}
