//! Common types for the transport layer

use serde::{Deserialize, Serialize};

/// Where a user-assigned setting is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Storage {
    /// RAM only, lost on power cycle
    Volatile,
    /// Flash, survives power cycle
    Persistent,
}

impl Storage {
    /// Value of the storage flag byte
    pub fn flag(self) -> u8 {
        match self {
            Storage::Volatile => 0,
            Storage::Persistent => 1,
        }
    }

    pub fn from_persistent(persistent: bool) -> Self {
        if persistent {
            Storage::Persistent
        } else {
            Storage::Volatile
        }
    }
}

/// What a user name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameTarget {
    Device,
    /// 0-based channel index
    Channel(u8),
}

impl NameTarget {
    /// Value of the command parameter byte
    pub fn parameter(self) -> u8 {
        match self {
            NameTarget::Device => 0,
            NameTarget::Channel(index) => index,
        }
    }
}

/// Identifiers from the device descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: u16,
    pub bus_type: u32,
    pub bus_num: u32,
    pub dev_num: u32,
    pub if_num: u32,
    pub num_applications: u32,
}

impl DeviceIdentity {
    /// Identity with only vendor, product and version set
    pub fn new(vendor_id: u16, product_id: u16, version: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            version,
            bus_type: 0,
            bus_num: 0,
            dev_num: 0,
            if_num: 0,
            num_applications: 1,
        }
    }

    pub fn is_oak(&self) -> bool {
        self.vendor_id == crate::protocol::VENDOR_ID
    }
}
