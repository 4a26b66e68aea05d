use crate::config::{ClassMap, UnmatchedPolicy};
use crate::error::{ReportError, Result};
use log::{debug, info};
use std::fs::File;
use std::path::Path;

/// Load and validate a class map from a YAML file
pub fn load_class_map(path: &Path) -> Result<ClassMap> {
    info!("Loading class map from: {:?}", path);

    let file = File::open(path).map_err(|e| ReportError::read(path, e))?;

    let map: ClassMap = serde_yaml::from_reader(file).map_err(|e| {
        ReportError::InputFormat(format!("class map {}: {}", path.display(), e))
    })?;

    map.validate()?;
    debug!("Loaded {} traffic classes", map.traffic_classes.len());

    Ok(map)
}

/// Load the class map at `path`, or the built-in humanoid map when none is given
pub fn load_or_default(path: Option<&Path>) -> Result<ClassMap> {
    match path {
        Some(path) => load_class_map(path),
        None => {
            info!("No class map given, using built-in humanoid zonal classes");
            Ok(ClassMap::default())
        }
    }
}

/// CLI arguments that can override class map settings
#[derive(Debug, Clone, Default)]
pub struct ClassMapOverrides {
    pub unmatched: Option<UnmatchedPolicy>,
    pub default_packet_bytes: Option<u32>,
    pub link_capacity_mbps: Option<f64>,
}

/// Apply CLI overrides to a class map
pub fn apply_overrides(map: &mut ClassMap, overrides: &ClassMapOverrides) -> Result<()> {
    if let Some(policy) = overrides.unmatched {
        info!("Unmatched module policy override: {:?}", policy);
        map.unmatched = policy;
    }

    if let Some(bytes) = overrides.default_packet_bytes {
        info!("Default packet size override: {} bytes", bytes);
        map.default_packet_bytes = bytes;
    }

    if let Some(mbps) = overrides.link_capacity_mbps {
        info!("Link capacity override: {} Mbps", mbps);
        map.link_capacity_mbps = mbps;
    }

    // Re-validate after applying overrides
    map.validate()?;

    Ok(())
}
