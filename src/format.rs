//! Text output helpers shared by the CLI commands

use oak_sensor::{ChannelInfo, FieldOutcome, Storage};

pub fn storage_label(storage: Storage) -> &'static str {
    match storage {
        Storage::Persistent => "persistent",
        Storage::Volatile => "volatile",
    }
}

/// A best-effort string field for display
pub fn outcome(value: &FieldOutcome<String>) -> String {
    match value {
        FieldOutcome::Available(name) if name.is_empty() => "-".to_string(),
        FieldOutcome::Available(name) => format!("\"{name}\""),
        FieldOutcome::Unavailable(status) => format!("<{status}>"),
        FieldOutcome::NotQueried => "<not queried>".to_string(),
    }
}

/// Scaled sample with as many decimals as the channel resolution has
pub fn sample(channel: &ChannelInfo, raw: i32) -> String {
    let decimals = decimals_for(channel);
    let value = channel.scale(raw);
    if channel.unit.is_empty() {
        format!("{value:.decimals$}")
    } else {
        format!("{value:.decimals$} {}", channel.unit)
    }
}

fn decimals_for(channel: &ChannelInfo) -> usize {
    channel.unit_exponent.saturating_neg().max(0) as usize
}

/// One-line description of a channel for the `channels` listing
pub fn channel_line(index: u32, channel: &ChannelInfo) -> String {
    format!(
        "[{index}] {}  {}{}-bit  exp={}  unit={:?} (0x{:08X})  user: {} / {}",
        channel.channel_name,
        if channel.is_signed { "s" } else { "u" },
        channel.bit_size,
        channel.unit_exponent,
        channel.unit,
        channel.unit_code,
        outcome(&channel.persistent_user_channel_name),
        outcome(&channel.volatile_user_channel_name),
    )
}
