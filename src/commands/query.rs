//! Query (read-only) command handlers.

use super::{with_sensor, CommandResult};
use oak_driver::format::{self, storage_label};
use oak_driver::DriverConfig;
use oak_sensor::{NameTarget, Storage};

/// Show device information
pub fn info(config: &DriverConfig, json: bool) -> CommandResult {
    with_sensor(config, |sensor| {
        let info = sensor.device_info()?;
        if json {
            println!("{}", serde_json::to_string_pretty(&info)?);
            return Ok(());
        }
        println!("Device:   {}", sensor.path().display());
        println!(
            "ID:       VID={:04X} PID={:04X} version={:04X}",
            info.vendor_id, info.product_id, info.version
        );
        println!("Name:     {}", info.device_name);
        println!("Serial:   {}", info.serial_number);
        println!("Channels: {}", info.number_of_channels);
        println!("User name:");
        println!("  persistent: \"{}\"", info.persistent_user_device_name);
        println!("  volatile:   \"{}\"", info.volatile_user_device_name);
        Ok(())
    })
}

/// Show every channel
pub fn channels(config: &DriverConfig, json: bool) -> CommandResult {
    with_sensor(config, |sensor| {
        let count = sensor.channel_count()?;
        let channels = (0..count)
            .map(|index| sensor.channel_info(index))
            .collect::<Result<Vec<_>, _>>()?;
        if json {
            println!("{}", serde_json::to_string_pretty(&channels)?);
            return Ok(());
        }
        println!("{} channels:", channels.len());
        for (index, channel) in (0..).zip(&channels) {
            println!("  {}", format::channel_line(index, channel));
        }
        Ok(())
    })
}

/// Show both user names of the device or a channel
pub fn get_name(config: &DriverConfig, channel: Option<u32>) -> CommandResult {
    with_sensor(config, |sensor| {
        for storage in [Storage::Persistent, Storage::Volatile] {
            let name = match channel {
                Some(index) => sensor.user_channel_name(index, storage)?,
                None => sensor.user_name(NameTarget::Device, storage)?,
            };
            println!("{:<10}: \"{}\"", storage_label(storage), name);
        }
        Ok(())
    })
}
