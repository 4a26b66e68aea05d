//! Latency analysis for TSN simulation results.
//!
//! This module extracts per-traffic-class end-to-end delay statistics from
//! exported results and formats them into latency and bandwidth reports.

pub mod types;
pub mod stats;
pub mod classify;
pub mod results_csv;
pub mod extractor;
pub mod formatter;
pub mod report;
pub mod omnet;

pub use types::*;
pub use classify::ClassMatcher;
pub use extractor::{extract_from_csv, extract_latency};
pub use formatter::{latency_class_rows, unified_rows, validate_sim_time};
pub use report::{generate_json_report, load_summary_json};
pub use omnet::analyze_run;
