//! Shared utilities: duration parsing, class map validation, atomic output,
//! exporter lookup.

pub mod binary;
pub mod duration;
pub mod output;
pub mod validation;

pub use binary::{resolve_scavetool, validate_binary, BinaryError};
pub use duration::parse_sim_time;
pub use output::write_atomic;
pub use validation::validate_class_map;
