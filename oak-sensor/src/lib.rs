//! High-level interface for Toradex Oak USB sensors
//!
//! [`OakSensor`] wraps any [`HidBackend`] (the kernel hiddev session by
//! default) and provides the device and channel queries built on the
//! feature-report protocol: identity and naming, per-channel metadata, and
//! user-assigned names stored on the device.

pub mod info;
pub mod sync;

pub use info::{ChannelInfo, DeviceInfo, FieldOutcome};
pub use sync::{list_sensors, SensorSummary, SharedSensor};

pub use oak_transport::{
    status_description, FieldDescriptor, HidBackend, HiddevSession, NameTarget, OakError,
    PollPolicy, StatusCode, Storage,
};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use oak_transport::protocol::string_index;
use oak_transport::types::DeviceIdentity;
use oak_transport::{read_interrupt_report, transact, unit_from_channel_name};
use oak_transport::{FeatureReport, NameCommand};
use tracing::{debug, warn};

/// An Oak sensor reached through a HID backend
///
/// Every call that talks to the device takes `&mut self`: the device
/// handles one request at a time. Share a sensor between threads through
/// [`SharedSensor`].
#[derive(Debug)]
pub struct OakSensor<B = HiddevSession> {
    device: B,
    policy: PollPolicy,
}

impl OakSensor<HiddevSession> {
    /// Open a hiddev node and check it is an Oak sensor
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OakError> {
        Ok(Self::new(HiddevSession::open(path)?))
    }

    /// Release the device
    pub fn close(self) -> Result<(), OakError> {
        self.device.close()
    }

    pub fn path(&self) -> &Path {
        self.device.path()
    }

    /// Wait for streamed samples; `false` on timeout or signal
    pub fn wait_readable(&self, timeout: Option<Duration>) -> Result<bool, OakError> {
        self.device.wait_readable(timeout)
    }
}

impl<B: HidBackend> OakSensor<B> {
    pub fn new(device: B) -> Self {
        Self {
            device,
            policy: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn set_poll_policy(&mut self, policy: PollPolicy) {
        self.policy = policy;
    }

    pub fn backend(&self) -> &B {
        &self.device
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.device
    }

    pub fn into_backend(self) -> B {
        self.device
    }

    /// Wrap the sensor for use from several threads
    pub fn shared(self) -> SharedSensor<B> {
        Arc::new(parking_lot::Mutex::new(self))
    }

    // === Device ===

    pub fn identity(&self) -> Result<DeviceIdentity, OakError> {
        self.device.identity()
    }

    /// Product name reported by the kernel
    pub fn device_name(&self) -> Result<String, OakError> {
        self.device.device_name()
    }

    pub fn string_descriptor(&self, index: i32) -> Result<String, OakError> {
        self.device.string_descriptor(index)
    }

    pub fn serial_number(&self) -> Result<String, OakError> {
        self.device.string_descriptor(string_index::SERIAL_NUMBER)
    }

    /// Number of channels, one per input-report field
    pub fn channel_count(&self) -> Result<u32, OakError> {
        self.device.input_field_count()
    }

    /// Query every device-level attribute; the first failure aborts
    pub fn device_info(&mut self) -> Result<DeviceInfo, OakError> {
        let identity = self.identity()?;
        let device_name = self.device_name()?;
        let persistent_user_device_name = self.user_device_name(Storage::Persistent)?;
        let volatile_user_device_name = self.user_device_name(Storage::Volatile)?;
        let serial_number = self.serial_number()?;
        let number_of_channels = self.channel_count()?;
        Ok(DeviceInfo {
            vendor_id: identity.vendor_id,
            product_id: identity.product_id,
            version: identity.version,
            device_name,
            persistent_user_device_name,
            volatile_user_device_name,
            serial_number,
            number_of_channels,
        })
    }

    // === User names ===

    /// Read a user-assigned name from the device
    pub fn user_name(&mut self, target: NameTarget, storage: Storage) -> Result<String, OakError> {
        let mut report = NameCommand::get(target, storage).build(None);
        self.transact(&mut report)?;
        Ok(report.decode_string())
    }

    pub fn user_device_name(&mut self, storage: Storage) -> Result<String, OakError> {
        self.user_name(NameTarget::Device, storage)
    }

    pub fn user_channel_name(
        &mut self,
        channel: u32,
        storage: Storage,
    ) -> Result<String, OakError> {
        self.user_name(channel_target(channel)?, storage)
    }

    /// Store a user-assigned name on the device; names over 20 bytes are cut
    pub fn set_user_name(
        &mut self,
        target: NameTarget,
        storage: Storage,
        name: &str,
    ) -> Result<(), OakError> {
        if name.len() > 20 {
            debug!("Truncating user name {:?} to 20 bytes", name);
        }
        let mut report = NameCommand::set(target, storage).build(Some(name));
        self.transact(&mut report)
    }

    pub fn set_user_device_name(&mut self, storage: Storage, name: &str) -> Result<(), OakError> {
        self.set_user_name(NameTarget::Device, storage, name)
    }

    pub fn set_user_channel_name(
        &mut self,
        channel: u32,
        storage: Storage,
        name: &str,
    ) -> Result<(), OakError> {
        self.set_user_name(channel_target(channel)?, storage, name)
    }

    // === Channels ===

    /// Factory name of a channel, e.g. `"Temperature [°C]"`
    pub fn channel_name(&self, channel: u32) -> Result<String, OakError> {
        self.device.string_descriptor(string_index::channel(channel)?)
    }

    pub fn field_info(&self, channel: u32) -> Result<FieldDescriptor, OakError> {
        self.device.field_info(channel)
    }

    /// Unit of a channel, taken from the bracketed suffix of its name
    pub fn unit_name(&self, channel: u32) -> Result<String, OakError> {
        let name = self.channel_name(channel)?;
        Ok(unit_from_channel_name(&name)?.to_string())
    }

    /// Collect the description of one channel
    ///
    /// The factory name, field descriptor and unit are required. User names
    /// are cosmetic: a failure there is recorded in the returned outcome and
    /// the remaining queries still run.
    pub fn channel_info(&mut self, channel: u32) -> Result<ChannelInfo, OakError> {
        let channel_name = self.channel_name(channel)?;
        let persistent_user_channel_name =
            self.tolerated_user_name(channel, Storage::Persistent);
        let volatile_user_channel_name = self.tolerated_user_name(channel, Storage::Volatile);
        let field = self.field_info(channel)?;
        let unit = unit_from_channel_name(&channel_name)?.to_string();
        Ok(ChannelInfo {
            channel_name,
            persistent_user_channel_name,
            volatile_user_channel_name,
            is_signed: field.is_signed(),
            bit_size: field.bit_size(),
            unit_exponent: field.exponent(),
            unit_code: field.unit,
            unit,
        })
    }

    fn tolerated_user_name(&mut self, channel: u32, storage: Storage) -> FieldOutcome<String> {
        let outcome = FieldOutcome::from(self.user_channel_name(channel, storage));
        if let FieldOutcome::Unavailable(status) = &outcome {
            warn!(
                "{:?} user name of channel {} unavailable: {}",
                storage, channel, status
            );
        }
        outcome
    }

    // === Raw access ===

    /// Block for the next interrupt report and store one value per channel
    pub fn read_samples(&mut self, values: &mut Vec<i32>) -> Result<(), OakError> {
        read_interrupt_report(&mut self.device, values)
    }

    /// Run one request/reply exchange; `report` is replaced by the reply
    pub fn transact(&mut self, report: &mut FeatureReport) -> Result<(), OakError> {
        transact(&mut self.device, report, &self.policy)
    }

    /// Current feature report, without sending anything
    pub fn read_feature_report(&mut self) -> Result<FeatureReport, OakError> {
        let mut report = FeatureReport::zeroed();
        self.device.read_feature_report(&mut report)?;
        Ok(report)
    }
}

fn channel_target(channel: u32) -> Result<NameTarget, OakError> {
    u8::try_from(channel)
        .map(NameTarget::Channel)
        .map_err(|_| OakError::Internal(format!("channel index {channel} out of range")))
}
