//! Device and channel snapshots

use serde::{Deserialize, Serialize};

use oak_transport::{OakError, StatusCode};

/// Result of a sub-query that is allowed to fail inside an aggregate
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldOutcome<T> {
    #[default]
    NotQueried,
    Available(T),
    /// The query ran and failed with this status
    Unavailable(StatusCode),
}

impl<T> FieldOutcome<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            FieldOutcome::Available(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FieldOutcome::Available(_))
    }
}

impl<T> From<Result<T, OakError>> for FieldOutcome<T> {
    fn from(result: Result<T, OakError>) -> Self {
        match result {
            Ok(value) => FieldOutcome::Available(value),
            Err(e) => FieldOutcome::Unavailable(e.status()),
        }
    }
}

/// Everything the device reports about itself, queried fresh on each call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: u16,
    pub device_name: String,
    pub persistent_user_device_name: String,
    pub volatile_user_device_name: String,
    pub serial_number: String,
    pub number_of_channels: u32,
}

/// Description of one sensor channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Factory name, e.g. `"Temperature [°C]"`
    pub channel_name: String,
    pub persistent_user_channel_name: FieldOutcome<String>,
    pub volatile_user_channel_name: FieldOutcome<String>,
    pub is_signed: bool,
    /// 8, 16, 32 or 64
    pub bit_size: u8,
    /// Decimal exponent applied to raw samples
    pub unit_exponent: i32,
    /// Raw HID unit code
    pub unit_code: u32,
    /// Unit text taken from the channel name
    pub unit: String,
}

impl ChannelInfo {
    /// Raw sample in physical units: `raw * 10^unit_exponent`
    pub fn scale(&self, raw: i32) -> f64 {
        f64::from(raw) * 10f64.powi(self.unit_exponent)
    }

    /// User name to show for this channel: volatile, then persistent, then factory
    pub fn display_name(&self) -> &str {
        [
            self.volatile_user_channel_name.value(),
            self.persistent_user_channel_name.value(),
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .map(String::as_str)
        .unwrap_or(&self.channel_name)
    }
}
