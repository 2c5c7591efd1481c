//! Discovery and cross-thread sharing

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use oak_transport::types::DeviceIdentity;
use oak_transport::{candidate_nodes, HiddevSession, OakError};

use crate::OakSensor;

/// A sensor behind a lock; one transaction runs at a time
pub type SharedSensor<B = HiddevSession> = Arc<Mutex<OakSensor<B>>>;

/// A connected Oak sensor found by [`list_sensors`]
#[derive(Debug, Clone, Serialize)]
pub struct SensorSummary {
    pub path: PathBuf,
    pub identity: DeviceIdentity,
    pub device_name: String,
    pub serial_number: Option<String>,
}

/// Open every hiddev node and keep the Oak sensors
///
/// Nodes that cannot be opened or belong to other vendors are skipped.
pub fn list_sensors() -> Vec<SensorSummary> {
    candidate_nodes()
        .into_iter()
        .filter_map(|path| match probe(&path) {
            Ok(summary) => Some(summary),
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

fn probe(path: &Path) -> Result<SensorSummary, OakError> {
    let sensor = OakSensor::open(path)?;
    let summary = SensorSummary {
        path: path.to_path_buf(),
        identity: sensor.identity()?,
        device_name: sensor.device_name()?,
        serial_number: sensor.serial_number().ok(),
    };
    sensor.close()?;
    Ok(summary)
}
