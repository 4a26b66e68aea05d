//! Simulation time parsing.
//!
//! `--sim-time` mirrors the simulator's `sim-time-limit` setting, which is
//! usually written with a unit ("10ms", "0.5s"). Plain numbers are seconds.

use humantime_serde::re::humantime;

/// Parse a simulation duration to seconds
///
/// Supports:
/// - Raw seconds, fractional allowed: "0.5", "2", "-1"
/// - Seconds with unit: "0.5s"
/// - Any humantime duration: "500ms", "10ms", "250us", "1s 500ms"
///
/// Range checking is left to the caller so that a zero or negative duration
/// is reported as an invalid duration rather than a parse error.
///
/// # Examples
/// ```
/// use tsn_report::utils::duration::parse_sim_time;
///
/// assert_eq!(parse_sim_time("0.5"), Ok(0.5));
/// assert_eq!(parse_sim_time("0.5s"), Ok(0.5));
/// assert_eq!(parse_sim_time("500ms"), Ok(0.5));
/// assert!(parse_sim_time("soon").is_err());
/// ```
pub fn parse_sim_time(value: &str) -> Result<f64, String> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<f64>() {
        if seconds.is_nan() {
            return Err(format!("Invalid duration format: {}", value));
        }
        return Ok(seconds);
    }

    // humantime only takes integers per unit
    if let Some(seconds) = value.strip_suffix('s').and_then(|n| n.parse::<f64>().ok()) {
        if seconds.is_finite() {
            return Ok(seconds);
        }
    }

    humantime::parse_duration(value)
        .map(|d| d.as_secs_f64())
        .map_err(|e| format!("Invalid duration format: {} ({})", value, e))
}
