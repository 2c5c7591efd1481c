//! Protocol constants for Toradex Oak sensors

/// Toradex USB vendor ID; any other vendor fails the open
pub const VENDOR_ID: u16 = 0x1B67;

/// Size of every feature report, both directions
pub const REPORT_SIZE: usize = 32;

/// Readiness sentinel in byte 0: device idle, or a valid reply is present
pub const READY: u8 = 0xFF;

/// Feature report byte positions
pub mod offset {
    /// Readiness sentinel on read, get/set flag on write
    pub const STATUS: usize = 0;
    /// Persistent (flash) vs volatile (RAM) storage flag
    pub const STORAGE: usize = 1;
    /// Command opcode
    pub const OPCODE: usize = 2;
    /// Command parameter (channel index, 0 for device-level commands)
    pub const PARAMETER: usize = 3;
}

/// Command opcodes
pub mod cmd {
    /// Get/set the user-assigned device or channel name
    pub const USER_NAME: u8 = 0x15;

    /// Human-readable name for an opcode
    pub fn name(cmd: u8) -> &'static str {
        match cmd {
            USER_NAME => "USER_NAME",
            _ => "UNKNOWN",
        }
    }
}

/// String descriptor table layout
pub mod string_index {
    use crate::error::OakError;

    /// Serial number lives at a fixed index
    pub const SERIAL_NUMBER: i32 = 3;
    /// Indices 0-3 are device-level; channel names start here
    pub const FIRST_CHANNEL: i32 = 4;

    /// String descriptor index holding the factory name of a channel
    ///
    /// Indices past the end of the `i32` table range are rejected instead of
    /// wrapping onto the device-level entries.
    pub fn channel(channel_index: u32) -> Result<i32, OakError> {
        i32::try_from(channel_index)
            .ok()
            .and_then(|i| i.checked_add(FIRST_CHANNEL))
            .ok_or(OakError::InvalidStringDescriptorIndex(i32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OakError;

    #[test]
    fn test_channel_string_index() {
        assert_eq!(string_index::channel(0).unwrap(), 4);
        assert_eq!(string_index::channel(3).unwrap(), 7);
        assert_eq!(string_index::channel(i32::MAX as u32 - 4).unwrap(), i32::MAX);
    }

    #[test]
    fn test_channel_string_index_out_of_range() {
        for index in [i32::MAX as u32 - 3, i32::MAX as u32, u32::MAX - 3, u32::MAX] {
            let err = string_index::channel(index).unwrap_err();
            assert!(matches!(err, OakError::InvalidStringDescriptorIndex(_)));
        }
    }

    #[test]
    fn test_cmd_names() {
        assert_eq!(cmd::name(0x15), "USER_NAME");
        assert_eq!(cmd::name(0x42), "UNKNOWN");
    }
}
