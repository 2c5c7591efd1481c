//! Feature report buffer and the string/command conventions layered on it
//!
//! Reports are positional, not tagged. Outbound strings start at byte 5,
//! inbound strings at byte 1; both are limited to 20 bytes. The asymmetry is
//! part of the device protocol and is kept as two named layouts.

use std::fmt;

use crate::hiddev::c_string;
use crate::protocol::{cmd, offset, READY, REPORT_SIZE};
use crate::types::{NameTarget, Storage};

/// Placement of an ASCII string payload inside a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringLayout {
    /// First byte of the string
    pub offset: usize,
    /// Maximum number of string bytes
    pub max_len: usize,
}

impl StringLayout {
    /// Index of the byte that bounds the string
    pub const fn end(&self) -> usize {
        self.offset + self.max_len
    }
}

/// Strings sent to the device: bytes 5..25
pub const OUTBOUND_STRING: StringLayout = StringLayout {
    offset: 5,
    max_len: 20,
};

/// Strings received from the device: bytes 1..21, byte 21 treated as NUL
pub const INBOUND_STRING: StringLayout = StringLayout {
    offset: 1,
    max_len: 20,
};

/// One 32-byte feature report, used for both commands and replies
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureReport([u8; REPORT_SIZE]);

impl FeatureReport {
    /// An all-zero report
    pub const fn zeroed() -> Self {
        Self([0; REPORT_SIZE])
    }

    pub const fn from_bytes(bytes: [u8; REPORT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.0
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; REPORT_SIZE] {
        &mut self.0
    }

    /// Byte 0 carries the readiness sentinel
    pub fn is_ready(&self) -> bool {
        self.0[offset::STATUS] == READY
    }

    pub fn opcode(&self) -> u8 {
        self.0[offset::OPCODE]
    }

    pub fn parameter(&self) -> u8 {
        self.0[offset::PARAMETER]
    }

    /// Write `text` at the outbound string offset, truncating to 20 bytes
    pub fn encode_string(&mut self, text: &str) {
        let bytes = text.as_bytes();
        let len = bytes.len().min(OUTBOUND_STRING.max_len);
        self.0[OUTBOUND_STRING.offset..OUTBOUND_STRING.offset + len]
            .copy_from_slice(&bytes[..len]);
    }

    /// Read the NUL-terminated string at the inbound offset
    ///
    /// Byte 21 acts as a terminator whatever its value, so at most 20 bytes are
    /// returned.
    pub fn decode_string(&self) -> String {
        c_string(&self.0[INBOUND_STRING.offset..INBOUND_STRING.end()])
    }
}

impl From<[u8; REPORT_SIZE]> for FeatureReport {
    fn from(bytes: [u8; REPORT_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for FeatureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureReport({:02X?})", self.0)
    }
}

/// Decimal dump of all 32 bytes, space separated
impl fmt::Display for FeatureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b}")?;
        }
        Ok(())
    }
}

/// Whether a command reads or writes a setting (byte 0 of an outbound report)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Action {
    Set = 0,
    Get = 1,
}

/// Get or set a user-assigned name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCommand {
    pub action: Action,
    pub storage: Storage,
    pub target: NameTarget,
}

impl NameCommand {
    pub fn get(target: NameTarget, storage: Storage) -> Self {
        Self {
            action: Action::Get,
            storage,
            target,
        }
    }

    pub fn set(target: NameTarget, storage: Storage) -> Self {
        Self {
            action: Action::Set,
            storage,
            target,
        }
    }

    /// Build the command report; `name` is only encoded for `Action::Set`
    pub fn build(&self, name: Option<&str>) -> FeatureReport {
        let mut report = FeatureReport::zeroed();
        let bytes = report.as_bytes_mut();
        bytes[offset::STATUS] = self.action as u8;
        bytes[offset::STORAGE] = self.storage.flag();
        bytes[offset::OPCODE] = cmd::USER_NAME;
        bytes[offset::PARAMETER] = self.target.parameter();
        if let (Action::Set, Some(name)) = (self.action, name) {
            report.encode_string(name);
        }
        report
    }
}
