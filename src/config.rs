use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Class name used for delay rows that match no configured class
pub const UNKNOWN_CLASS: &str = "UNKNOWN";

/// What to do with delay rows whose module path matches no traffic class
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Ignore the row
    #[default]
    Drop,
    /// Bucket the row into the `UNKNOWN` class
    Unknown,
}

/// Interval during which a traffic source is sending, in simulation time
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ActiveWindow {
    #[serde(with = "humantime_serde")]
    pub start: Duration,
    #[serde(with = "humantime_serde")]
    pub stop: Duration,
}

impl ActiveWindow {
    /// Window length in seconds, clamped to `[0, sim_time_s]`
    pub fn duration_within(&self, sim_time_s: f64) -> f64 {
        let stop = self.stop.as_secs_f64().min(sim_time_s);
        let start = self.start.as_secs_f64().min(stop);
        stop - start
    }
}

/// One traffic class and the module paths that belong to it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrafficClassDef {
    pub name: String,
    /// Case-sensitive regular expressions matched against the module path
    pub patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    /// 802.1Q priority code point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcp: Option<u8>,
    /// Application payload per packet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_bytes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_window: Option<ActiveWindow>,
}

impl TrafficClassDef {
    fn humanoid(name: &str, stream: &str, pcp: u8, packet_bytes: u32, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            patterns: vec![pattern.to_string()],
            stream: Some(stream.to_string()),
            pcp: Some(pcp),
            packet_bytes: Some(packet_bytes),
            active_window: Some(ActiveWindow {
                start: Duration::from_millis(1),
                stop: Duration::from_millis(400),
            }),
        }
    }
}

/// Mapping from module paths to traffic classes, plus the link parameters
/// the unified report needs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClassMap {
    #[serde(default)]
    pub unmatched: UnmatchedPolicy,
    #[serde(default = "default_link_capacity_mbps")]
    pub link_capacity_mbps: f64,
    /// Packet size for classes that do not set `packet_bytes`
    #[serde(default = "default_packet_bytes")]
    pub default_packet_bytes: u32,
    pub traffic_classes: Vec<TrafficClassDef>,
}

fn default_link_capacity_mbps() -> f64 {
    1000.0
}

fn default_packet_bytes() -> u32 {
    1024
}

impl ClassMap {
    /// Validate the class map
    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::utils::validation::validate_class_map(self)
    }

    /// Look up a class definition by name
    pub fn class(&self, name: &str) -> Option<&TrafficClassDef> {
        self.traffic_classes.iter().find(|c| c.name == name)
    }

    /// Packet size used for bandwidth estimates of `class_name`
    pub fn packet_bytes_for(&self, class_name: &str) -> u32 {
        self.class(class_name)
            .and_then(|c| c.packet_bytes)
            .unwrap_or(self.default_packet_bytes)
    }
}

/// Zonal humanoid topology: the control loop sink in zone 0, sensor and
/// telemetry sinks in zone 1.
impl Default for ClassMap {
    fn default() -> Self {
        Self {
            unmatched: UnmatchedPolicy::Drop,
            link_capacity_mbps: default_link_capacity_mbps(),
            default_packet_bytes: default_packet_bytes(),
            traffic_classes: vec![
                TrafficClassDef::humanoid("CONTROL", "control", 7, 512, r"\.zone\[0\]\.app\[0\](\.|$)"),
                TrafficClassDef::humanoid("SENSOR", "sensor", 4, 1024, r"\.zone\[1\]\.app\[1\](\.|$)"),
                TrafficClassDef::humanoid("TELEMETRY", "telemetry", 1, 1024, r"\.zone\[1\]\.app\[2\](\.|$)"),
            ],
        }
    }
}

/// Class map validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid traffic class configuration: {0}")]
    InvalidClass(String),
    #[error("Invalid pattern '{pattern}' for class {class}: {reason}")]
    InvalidPattern {
        class: String,
        pattern: String,
        reason: String,
    },
    #[error("Invalid link configuration: {0}")]
    InvalidLink(String),
}
