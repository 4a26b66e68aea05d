//! Class map validation.
//!
//! Checks the injected traffic class table before any input is read, so a
//! typo in a pattern fails the run instead of silently dropping rows.

use crate::config::{ClassMap, ValidationError, UNKNOWN_CLASS};
use regex::Regex;
use std::collections::HashSet;

/// Validate a class map
///
/// Checks for:
/// - At least one traffic class
/// - Unique, non-empty class names (`UNKNOWN` is reserved)
/// - At least one pattern per class, all of which compile
/// - PCP values in 0..=7
/// - Positive packet sizes and link capacity
/// - Active windows that end after they start
///
/// # Examples
/// ```
/// use tsn_report::config::ClassMap;
/// use tsn_report::utils::validation::validate_class_map;
///
/// assert!(validate_class_map(&ClassMap::default()).is_ok());
///
/// let mut map = ClassMap::default();
/// map.traffic_classes.clear();
/// assert!(validate_class_map(&map).is_err());
/// ```
pub fn validate_class_map(map: &ClassMap) -> Result<(), ValidationError> {
    if map.traffic_classes.is_empty() {
        return Err(ValidationError::InvalidClass(
            "at least one traffic class is required".to_string(),
        ));
    }

    if !(map.link_capacity_mbps.is_finite() && map.link_capacity_mbps > 0.0) {
        return Err(ValidationError::InvalidLink(format!(
            "link_capacity_mbps must be positive, got {}",
            map.link_capacity_mbps
        )));
    }

    if map.default_packet_bytes == 0 {
        return Err(ValidationError::InvalidClass(
            "default_packet_bytes must be positive".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for class in &map.traffic_classes {
        if class.name.trim().is_empty() {
            return Err(ValidationError::InvalidClass(
                "class name cannot be empty".to_string(),
            ));
        }
        if class.name == UNKNOWN_CLASS {
            return Err(ValidationError::InvalidClass(format!(
                "class name {} is reserved for unmatched modules",
                UNKNOWN_CLASS
            )));
        }
        if !seen.insert(class.name.as_str()) {
            return Err(ValidationError::InvalidClass(format!(
                "duplicate class name {}",
                class.name
            )));
        }

        if class.patterns.is_empty() {
            return Err(ValidationError::InvalidClass(format!(
                "class {} has no module patterns",
                class.name
            )));
        }
        for pattern in &class.patterns {
            if pattern.is_empty() {
                return Err(ValidationError::InvalidPattern {
                    class: class.name.clone(),
                    pattern: pattern.clone(),
                    reason: "empty pattern matches every module".to_string(),
                });
            }
            Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
                class: class.name.clone(),
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }

        if let Some(pcp) = class.pcp {
            if pcp > 7 {
                return Err(ValidationError::InvalidClass(format!(
                    "class {} has PCP {} (must be 0-7)",
                    class.name, pcp
                )));
            }
        }

        if class.packet_bytes == Some(0) {
            return Err(ValidationError::InvalidClass(format!(
                "class {} has a zero packet size",
                class.name
            )));
        }

        if let Some(window) = &class.active_window {
            if window.stop <= window.start {
                return Err(ValidationError::InvalidClass(format!(
                    "class {} active window stops ({:?}) before it starts ({:?})",
                    class.name, window.stop, window.start
                )));
            }
        }
    }

    Ok(())
}
