//! Core data types for latency reporting.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Simulation time in seconds
pub type SimTime = f64;

/// One `(time, value)` point of a result vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: SimTime,
    pub value: f64,
}

/// One exported result row: which module recorded which statistic, and the
/// samples it recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Line in the source file, for error messages
    pub line: u64,
    /// Simulation run (repetition) the row belongs to
    pub run: String,
    pub module: String,
    /// Statistic name, e.g. `endToEndDelay:vector`
    pub name: String,
    pub samples: Vec<Sample>,
}

/// Delay statistics for one traffic class, in seconds.
///
/// A class that produced no samples has `sample_count == 0` and every numeric
/// field set to `None`; it is never reported with zero latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatencySummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcp: Option<u8>,
    pub sample_count: u64,
    #[serde(default)]
    pub min_delay_seconds: Option<f64>,
    #[serde(default)]
    pub mean_delay_seconds: Option<f64>,
    #[serde(default)]
    pub max_delay_seconds: Option<f64>,
    /// Mean absolute difference between consecutive samples in arrival order
    #[serde(default)]
    pub jitter_seconds: Option<f64>,
    /// Population standard deviation of the samples
    #[serde(default)]
    pub stddev_seconds: Option<f64>,
}

impl LatencySummary {
    /// Summary for a class without samples
    pub fn empty(stream: Option<String>, pcp: Option<u8>) -> Self {
        Self {
            stream,
            pcp,
            sample_count: 0,
            min_delay_seconds: None,
            mean_delay_seconds: None,
            max_delay_seconds: None,
            jitter_seconds: None,
            stddev_seconds: None,
        }
    }

    /// Whether the class recorded any sample
    pub fn is_present(&self) -> bool {
        self.sample_count > 0
    }

    /// Check the count/null and ordering invariants
    pub fn check_invariants(&self) -> Result<(), String> {
        let numeric = [
            self.min_delay_seconds,
            self.mean_delay_seconds,
            self.max_delay_seconds,
            self.jitter_seconds,
            self.stddev_seconds,
        ];

        if !self.is_present() {
            if numeric.iter().any(Option::is_some) {
                return Err("sample_count is 0 but delay values are present".to_string());
            }
            return Ok(());
        }

        let (min, mean, max) = match (
            self.min_delay_seconds,
            self.mean_delay_seconds,
            self.max_delay_seconds,
        ) {
            (Some(min), Some(mean), Some(max)) => (min, mean, max),
            _ => {
                return Err(format!(
                    "sample_count is {} but min/mean/max are missing",
                    self.sample_count
                ))
            }
        };

        if numeric.iter().flatten().any(|v| !v.is_finite()) {
            return Err("delay values must be finite".to_string());
        }
        if !(min <= mean && mean <= max) {
            return Err(format!(
                "expected min <= mean <= max, got {} / {} / {}",
                min, mean, max
            ));
        }
        if self.sample_count < 2 && self.jitter_seconds.is_some() {
            return Err("jitter needs at least two samples".to_string());
        }

        Ok(())
    }
}

/// Latency summary of one named traffic class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLatency {
    pub class_name: String,
    pub summary: LatencySummary,
}

/// Per-class latency summaries, in class map order.
///
/// Serialized as a JSON object with one key per class. Key order is kept on
/// both serialization and deserialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatencyReport {
    pub classes: Vec<ClassLatency>,
}

impl LatencyReport {
    pub fn get(&self, class_name: &str) -> Option<&LatencySummary> {
        self.classes
            .iter()
            .find(|c| c.class_name == class_name)
            .map(|c| &c.summary)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassLatency> {
        self.classes.iter()
    }

    /// Total samples over all classes
    pub fn total_samples(&self) -> u64 {
        self.classes.iter().map(|c| c.summary.sample_count).sum()
    }
}

impl Serialize for LatencyReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.classes.len()))?;
        for class in &self.classes {
            map.serialize_entry(&class.class_name, &class.summary)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LatencyReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = LatencyReport;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping traffic class names to latency summaries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut classes: Vec<ClassLatency> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));

                while let Some((class_name, summary)) =
                    access.next_entry::<String, LatencySummary>()?
                {
                    if classes.iter().any(|c| c.class_name == class_name) {
                        return Err(de::Error::custom(format!(
                            "duplicate traffic class {}",
                            class_name
                        )));
                    }
                    classes.push(ClassLatency { class_name, summary });
                }

                Ok(LatencyReport { classes })
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}

/// Row of the per-class latency CSV, delays in milliseconds
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyClassRow {
    pub config_name: String,
    pub class_name: String,
    pub sample_count: u64,
    pub min_ms: Option<f64>,
    pub mean_ms: Option<f64>,
    pub max_ms: Option<f64>,
}

/// Row of the unified report: latency plus throughput estimates
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedReportRow {
    pub config_name: String,
    pub class_name: String,
    pub sample_count: u64,
    pub min_ms: Option<f64>,
    pub mean_ms: Option<f64>,
    pub max_ms: Option<f64>,
    pub jitter_ms: Option<f64>,
    /// Samples per second over the class's active window
    pub active_rate_hz: f64,
    pub estimated_mbps: f64,
    pub utilization_percent: f64,
    pub stream: Option<String>,
    pub pcp: Option<u8>,
    /// Samples per second over the whole simulation
    pub global_rate_hz: f64,
    pub active_duration_s: f64,
    pub packet_bytes: u32,
}

/// One `scalar` line of a native result file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub module: String,
    pub name: String,
    pub value: f64,
}

/// Delay statistics of one module from native vector files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDelaySummary {
    pub module: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub rcvd_pk: Option<f64>,
    pub sent_pk: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(count: u64, min: f64, mean: f64, max: f64) -> LatencySummary {
        LatencySummary {
            stream: None,
            pcp: None,
            sample_count: count,
            min_delay_seconds: Some(min),
            mean_delay_seconds: Some(mean),
            max_delay_seconds: Some(max),
            jitter_seconds: None,
            stddev_seconds: None,
        }
    }

    #[test]
    fn test_invariants() {
        assert!(LatencySummary::empty(None, None).check_invariants().is_ok());
        assert!(!LatencySummary::empty(None, None).is_present());
        assert!(present(1, 0.001, 0.001, 0.001).is_present());
        assert!(present(3, 0.001, 0.002, 0.003).check_invariants().is_ok());
        assert!(present(3, 0.002, 0.001, 0.003).check_invariants().is_err());

        // A class without samples must not carry zero latencies
        assert!(present(0, 0.0, 0.0, 0.0).check_invariants().is_err());

        let mut missing = present(2, 0.001, 0.002, 0.003);
        missing.max_delay_seconds = None;
        assert!(missing.check_invariants().is_err());

        let mut lone_jitter = present(1, 0.001, 0.001, 0.001);
        lone_jitter.jitter_seconds = Some(0.0);
        assert!(lone_jitter.check_invariants().is_err());
    }

    #[test]
    fn test_report_json_keeps_class_order() {
        let report = LatencyReport {
            classes: vec![
                ClassLatency {
                    class_name: "TELEMETRY".to_string(),
                    summary: LatencySummary::empty(Some("telemetry".to_string()), Some(1)),
                },
                ClassLatency {
                    class_name: "CONTROL".to_string(),
                    summary: present(1, 0.001, 0.001, 0.001),
                },
            ],
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.find("TELEMETRY").unwrap() < json.find("CONTROL").unwrap());
        assert!(json.contains("\"min_delay_seconds\":null"));

        let parsed: LatencyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_report_json_rejects_duplicates_and_unknown_fields() {
        let dup = r#"{"A": {"sample_count": 0}, "A": {"sample_count": 0}}"#;
        assert!(serde_json::from_str::<LatencyReport>(dup).is_err());

        let unknown = r#"{"A": {"sample_count": 0, "bogus": 1}}"#;
        assert!(serde_json::from_str::<LatencyReport>(unknown).is_err());

        let not_object = r#"[1, 2, 3]"#;
        assert!(serde_json::from_str::<LatencyReport>(not_object).is_err());
    }
}
