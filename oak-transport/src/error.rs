//! Status taxonomy and transport error type
//!
//! Every failure in the stack maps onto one [`StatusCode`]. The code is what a
//! presentation layer shows or stores; the [`OakError`] carries the context
//! (OS error, offending index) for logs.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Closed set of status kinds reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum StatusCode {
    Ok = 0,
    ErrorOpeningFile = 1,
    InvalidDeviceType = 2,
    InternalError = 3,
    InvalidStringDescriptorIndex = 4,
    ReadError = 5,
    WriteError = 6,
    /// The device did not become ready (or reply) within the poll policy's timeout
    Timeout = 7,
}

impl StatusCode {
    /// All status kinds, in numeric order
    pub const ALL: &'static [StatusCode] = &[
        StatusCode::Ok,
        StatusCode::ErrorOpeningFile,
        StatusCode::InvalidDeviceType,
        StatusCode::InternalError,
        StatusCode::InvalidStringDescriptorIndex,
        StatusCode::ReadError,
        StatusCode::WriteError,
        StatusCode::Timeout,
    ];

    /// Human-readable description of the status
    pub fn description(self) -> &'static str {
        match self {
            StatusCode::Ok => "No error",
            StatusCode::ErrorOpeningFile => "The device could not be opened",
            StatusCode::InvalidDeviceType => "The device is not an Oak sensor",
            StatusCode::InternalError => "Internal error",
            StatusCode::InvalidStringDescriptorIndex => "Invalid string descriptor index",
            StatusCode::ReadError => "Read error",
            StatusCode::WriteError => "Write error",
            StatusCode::Timeout => "Timed out waiting for the device",
        }
    }

    /// Look up a status from its raw numeric value
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| *s as i32 == raw)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Describe a raw status value, falling back to "Unknown error"
pub fn status_description(raw: i32) -> &'static str {
    StatusCode::from_raw(raw)
        .map(StatusCode::description)
        .unwrap_or("Unknown error")
}

/// Errors from device operations
#[derive(Error, Debug)]
pub enum OakError {
    #[error("Could not open {path}: {source}")]
    OpeningFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Not an Oak sensor: vendor ID 0x{vendor_id:04X}")]
    InvalidDeviceType { vendor_id: u16 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid string descriptor index {0}")]
    InvalidStringDescriptorIndex(i32),

    #[error("Read error: {0}")]
    Read(#[source] io::Error),

    #[error("Write error: {0}")]
    Write(#[source] io::Error),

    #[error("No answer from device after {0:?}")]
    Timeout(Duration),
}

impl OakError {
    /// The status kind this error reports
    pub fn status(&self) -> StatusCode {
        match self {
            OakError::OpeningFile { .. } => StatusCode::ErrorOpeningFile,
            OakError::InvalidDeviceType { .. } => StatusCode::InvalidDeviceType,
            OakError::Internal(_) => StatusCode::InternalError,
            OakError::InvalidStringDescriptorIndex(_) => StatusCode::InvalidStringDescriptorIndex,
            OakError::Read(_) => StatusCode::ReadError,
            OakError::Write(_) => StatusCode::WriteError,
            OakError::Timeout(_) => StatusCode::Timeout,
        }
    }

    /// Build an internal error from a failed system call
    pub(crate) fn internal(what: &str, err: impl std::fmt::Display) -> Self {
        OakError::Internal(format!("{what}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert_eq!(StatusCode::Ok.description(), "No error");
        assert_eq!(
            StatusCode::InvalidDeviceType.description(),
            "The device is not an Oak sensor"
        );
        assert_eq!(StatusCode::WriteError.to_string(), "Write error");
    }

    #[test]
    fn test_raw_lookup() {
        for status in StatusCode::ALL {
            assert_eq!(StatusCode::from_raw(*status as i32), Some(*status));
        }
        assert_eq!(StatusCode::from_raw(42), None);
        assert_eq!(status_description(42), "Unknown error");
        assert_eq!(status_description(-1), "Unknown error");
        assert_eq!(status_description(5), "Read error");
    }

    #[test]
    fn test_error_status_mapping() {
        let err = OakError::Read(io::Error::other("gone"));
        assert_eq!(err.status(), StatusCode::ReadError);
        let err = OakError::InvalidDeviceType { vendor_id: 0x3151 };
        assert_eq!(err.status(), StatusCode::InvalidDeviceType);
        assert!(err.to_string().contains("0x3151"));
        let err = OakError::Timeout(Duration::from_millis(5));
        assert_eq!(err.status(), StatusCode::Timeout);
    }
}
