//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `query`: Read-only commands (info, channels, get-name)
//! - `set`: Setting commands (set-name)
//! - `stream`: Sample streaming (stream)
//! - `utility`: Utility commands (list, raw, config)

pub mod query;
pub mod set;
pub mod stream;
pub mod utility;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use oak_driver::DriverConfig;
use oak_sensor::{list_sensors, OakSensor};
use tracing::debug;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Open the configured sensor, or the first one found
pub fn open_sensor(config: &DriverConfig) -> anyhow::Result<OakSensor> {
    let path = match &config.device {
        Some(path) => path.clone(),
        None => list_sensors()
            .into_iter()
            .next()
            .map(|sensor| sensor.path)
            .ok_or_else(|| anyhow!("No Oak sensor found"))?,
    };
    debug!("Using {}", path.display());
    let sensor =
        OakSensor::open(&path).with_context(|| format!("Cannot use {}", path.display()))?;
    Ok(sensor.with_poll_policy(config.poll_policy()))
}

/// Open a sensor, run a closure with it and close it again
pub fn with_sensor<F>(config: &DriverConfig, f: F) -> CommandResult
where
    F: FnOnce(&mut OakSensor) -> CommandResult,
{
    let mut sensor = open_sensor(config)?;
    let result = f(&mut sensor);
    let closed = sensor.close();
    result?;
    closed?;
    Ok(())
}

/// Set up a Ctrl-C handler that sets the returned flag to false when triggered
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    if let Err(e) = ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    }) {
        debug!("Ctrl-C handler not installed: {}", e);
    }

    running
}
