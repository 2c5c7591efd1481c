//! Utility command handlers.

use std::path::Path;

use super::{with_sensor, CommandResult};
use oak_driver::DriverConfig;
use oak_sensor::list_sensors;

/// List connected Oak sensors
pub fn list(json: bool) -> CommandResult {
    let sensors = list_sensors();
    if json {
        println!("{}", serde_json::to_string_pretty(&sensors)?);
        return Ok(());
    }
    if sensors.is_empty() {
        println!("No Oak sensors found");
        return Ok(());
    }
    println!("Oak sensors:");
    for sensor in &sensors {
        println!(
            "  {}  PID={:04X} version={:04X}  {}  serial={}",
            sensor.path.display(),
            sensor.identity.product_id,
            sensor.identity.version,
            sensor.device_name,
            sensor.serial_number.as_deref().unwrap_or("?"),
        );
    }
    Ok(())
}

/// Print the current feature report without sending a command
pub fn raw(config: &DriverConfig, hex: bool) -> CommandResult {
    with_sensor(config, |sensor| {
        let report = sensor.read_feature_report()?;
        if hex {
            println!("{report:?}");
        } else {
            println!("{report}");
        }
        println!(
            "status=0x{:02X} ({})",
            report.as_bytes()[0],
            if report.is_ready() { "ready" } else { "busy" }
        );
        Ok(())
    })
}

/// Show the effective configuration, optionally saving it
pub fn config(config: &DriverConfig, path: &Path, save: bool) -> CommandResult {
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(config)?);
    if save {
        config.save(path)?;
        eprintln!("Saved to {}", path.display());
    }
    Ok(())
}
