//! Transport layer for Toradex Oak USB sensors on Linux
//!
//! Oak sensors expose a vendor protocol over HID feature reports and stream
//! their samples as interrupt input reports. This crate talks to them through
//! the kernel's generic hiddev interface:
//!
//! - [`HiddevSession`] owns an opened `/dev/usb/hiddevN` node
//! - [`report`] encodes and decodes the 32-byte feature report
//! - [`engine`] runs the ready/send/reply handshake
//! - [`interrupt`] reads streamed sample batches
//! - [`field`] decodes channel metadata from field descriptors
//! - [`sim`] is an in-memory device for tests

pub mod discovery;
pub mod engine;
pub mod error;
pub mod field;
pub mod hiddev;
pub mod interrupt;
pub mod protocol;
pub mod report;
pub mod sim;
pub mod types;

mod session;

pub use discovery::candidate_nodes;
pub use engine::{transact, PollPolicy};
pub use error::{status_description, OakError, StatusCode};
pub use field::{
    bit_size_for_range, decode_unit_exponent, unit_from_channel_name, FieldDescriptor,
};
pub use hiddev::HidEvent;
pub use interrupt::{read_interrupt_report, EVENT_BATCH};
pub use protocol::{REPORT_SIZE, VENDOR_ID};
pub use report::{Action, FeatureReport, NameCommand, StringLayout};
pub use session::HiddevSession;
pub use types::{DeviceIdentity, NameTarget, Storage};

/// Control operations an Oak sensor needs from the HID layer
///
/// [`HiddevSession`] implements this on top of hiddev ioctls;
/// [`sim::SimulatedDevice`] implements it in memory.
pub trait HidBackend {
    /// Vendor, product and version from the device descriptor
    fn identity(&self) -> Result<DeviceIdentity, OakError>;

    /// Product name as reported by the kernel (bounded to 256 bytes)
    fn device_name(&self) -> Result<String, OakError>;

    /// Entry `index` of the USB string descriptor table
    fn string_descriptor(&self, index: i32) -> Result<String, OakError>;

    /// Number of fields in the input report, one per channel
    fn input_field_count(&self) -> Result<u32, OakError>;

    /// Descriptor of input-report field `index`
    fn field_info(&self, index: u32) -> Result<FieldDescriptor, OakError>;

    /// Fetch the current feature report into `report`
    fn read_feature_report(&mut self, report: &mut FeatureReport) -> Result<(), OakError>;

    /// Send `report` to the device
    fn write_feature_report(&mut self, report: &FeatureReport) -> Result<(), OakError>;

    /// Block until interrupt events arrive and fill `events` from the front
    ///
    /// Returns the number of bytes read, which may not be a whole number of
    /// events.
    fn read_events(&mut self, events: &mut [HidEvent]) -> Result<usize, OakError>;
}
