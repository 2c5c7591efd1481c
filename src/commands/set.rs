//! Setting command handlers.

use super::{with_sensor, CommandResult};
use oak_driver::format::storage_label;
use oak_driver::DriverConfig;
use oak_sensor::Storage;

/// Store a user name on the device or one of its channels
pub fn set_name(
    config: &DriverConfig,
    name: &str,
    channel: Option<u32>,
    volatile: bool,
) -> CommandResult {
    let storage = if volatile {
        Storage::Volatile
    } else {
        Storage::Persistent
    };
    if name.len() > 20 {
        eprintln!("Warning: name is longer than 20 bytes and will be truncated");
    }

    with_sensor(config, |sensor| {
        let stored = match channel {
            Some(index) => {
                sensor.set_user_channel_name(index, storage, name)?;
                sensor.user_channel_name(index, storage)?
            }
            None => {
                sensor.set_user_device_name(storage, name)?;
                sensor.user_device_name(storage)?
            }
        };
        let target = match channel {
            Some(index) => format!("channel {index}"),
            None => "device".to_string(),
        };
        println!(
            "Set {} user name of {} to \"{}\"",
            storage_label(storage),
            target,
            stored
        );
        Ok(())
    })
}
