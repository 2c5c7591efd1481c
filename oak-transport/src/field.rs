//! Channel metadata from input-report field descriptors
//!
//! The kernel reports physical range, unit code and unit exponent per field.
//! The helpers here turn those into the attributes consumers display: sign,
//! storage width, decimal exponent and unit text.

use serde::{Deserialize, Serialize};

use crate::error::OakError;
use crate::hiddev::HiddevFieldInfo;

/// Field descriptor of one input-report field (one channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub field_index: u32,
    pub flags: u32,
    pub logical_minimum: i32,
    pub logical_maximum: i32,
    pub physical_minimum: i32,
    pub physical_maximum: i32,
    /// Raw HID unit exponent nibble
    pub unit_exponent: u32,
    /// Raw HID unit code
    pub unit: u32,
}

impl FieldDescriptor {
    /// Descriptor with only the physical range set
    pub fn with_physical_range(physical_minimum: i32, physical_maximum: i32) -> Self {
        Self {
            physical_minimum,
            physical_maximum,
            ..Self::default()
        }
    }

    pub fn is_signed(&self) -> bool {
        self.physical_minimum < 0
    }

    /// `physical_maximum - physical_minimum`, computed without overflow
    pub fn physical_range(&self) -> i64 {
        i64::from(self.physical_maximum) - i64::from(self.physical_minimum)
    }

    /// Smallest of 8/16/32/64 bits whose unsigned range covers the physical range
    pub fn bit_size(&self) -> u8 {
        bit_size_for_range(self.physical_range())
    }

    /// Decimal exponent decoded from the raw unit exponent
    pub fn exponent(&self) -> i32 {
        decode_unit_exponent(self.unit_exponent)
    }
}

impl From<&HiddevFieldInfo> for FieldDescriptor {
    fn from(info: &HiddevFieldInfo) -> Self {
        Self {
            field_index: info.field_index,
            flags: info.flags,
            logical_minimum: info.logical_minimum,
            logical_maximum: info.logical_maximum,
            physical_minimum: info.physical_minimum,
            physical_maximum: info.physical_maximum,
            unit_exponent: info.unit_exponent,
            unit: info.unit,
        }
    }
}

/// Width in bits used to hold values spanning `range`
///
/// This quantizes the range, it is not the wire width of the field.
pub fn bit_size_for_range(range: i64) -> u8 {
    if range <= 0xFF {
        8
    } else if range <= 0xFFFF {
        16
    } else if range <= 0xFFFF_FFFF {
        32
    } else {
        64
    }
}

/// HID unit exponent: raw 8..15 stand for -8..-1, lower values are taken as-is
pub fn decode_unit_exponent(raw: u32) -> i32 {
    if raw >= 8 {
        (raw as i32).wrapping_sub(16)
    } else {
        raw as i32
    }
}

/// Extract the unit from a channel name such as `"Temperature [°C]"`
///
/// The unit is the text between the last `[` and the last `]`.
pub fn unit_from_channel_name(name: &str) -> Result<&str, OakError> {
    let begin = name
        .rfind('[')
        .ok_or_else(|| OakError::Internal(format!("no '[' in channel name {name:?}")))?
        + 1;
    let end = name
        .rfind(']')
        .ok_or_else(|| OakError::Internal(format!("no ']' in channel name {name:?}")))?;
    if end <= begin {
        return Err(OakError::Internal(format!(
            "malformed unit brackets in channel name {name:?}"
        )));
    }
    Ok(&name[begin..end])
}
