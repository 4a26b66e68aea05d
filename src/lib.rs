//! # tsn-report - Latency and bandwidth reporting for TSN simulations
//!
//! This library turns the results of OMNeT++/INET time-sensitive networking
//! simulations of a humanoid robot network into per-traffic-class latency
//! summaries and bandwidth reports.
//!
//! ## Overview
//!
//! A simulation run records an end-to-end delay vector for every receiving
//! application. `opp_scavetool` exports those vectors to CSV-R; this crate
//! classifies each vector by the module that recorded it (CONTROL, SENSOR,
//! TELEMETRY, ...) and reduces the samples of each class to count, min, mean,
//! max and jitter.
//!
//! ## Pipeline
//!
//! 1. **Export**: `opp_scavetool export -F CSV-R` turns `.sca`/`.vec` files into one CSV
//! 2. **Extract**: per-class delay statistics, written as a JSON summary
//! 3. **Format**: the JSON summary becomes a per-class latency CSV and a
//!    unified latency/bandwidth CSV for a given simulation time
//!
//! ## Architecture
//!
//! - `config`: Traffic class map (patterns, stream, PCP, packet size, active window)
//! - `config_loader`: Class map loading and command-line overrides
//! - `analysis`: CSV-R parsing, classification, statistics, formatting and reports
//! - `error`: Error type shared by all operations
//! - `utils`: Validation, duration parsing, atomic output and tool lookup
//! - `orchestrator`: One function per command-line operation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tsn_report::{config_loader, orchestrator};
//!
//! let map = config_loader::load_or_default(Some(Path::new("configs/humanoid_tsn.yaml")))?;
//!
//! let (paths, _rows) = orchestrator::run_report(
//!     Path::new("results/FlatThorInetTsn.csv"),
//!     Path::new("analysis_output"),
//!     "FlatThorInetTsn",
//!     0.5,
//!     &map,
//! )?;
//!
//! // analysis_output now contains:
//! // - latency_summary.json: per-class delay statistics in seconds
//! // - latency_classes.csv: per-class delays in milliseconds
//! // - unified_report.csv: delays, rates, bandwidth and link utilization
//! // - report.txt: the same as text
//! println!("{}", paths.unified_csv.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`error::ReportError`]; the binaries wrap it
//! with `color_eyre` context.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod analysis;
pub mod utils;
pub mod orchestrator;
