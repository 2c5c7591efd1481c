//! In-memory Oak sensor for tests
//!
//! [`SimulatedDevice`] implements [`HidBackend`] the way Oak firmware
//! behaves on the wire: it reports a busy status byte for a configurable
//! number of reads, answers `USER_NAME` get/set commands from persistent and
//! volatile name slots, and replays queued interrupt batches. Faults can be
//! injected per operation.
//!
//! Name slots are keyed by the parameter byte, so the device name and the
//! name of channel 0 share a slot exactly as they share an encoding.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io;

use zerocopy::IntoBytes;

use crate::error::OakError;
use crate::field::FieldDescriptor;
use crate::hiddev::{c_string, HidEvent, EVENT_SIZE};
use crate::protocol::{cmd, offset, string_index, READY, VENDOR_ID};
use crate::report::{Action, FeatureReport, OUTBOUND_STRING};
use crate::types::{DeviceIdentity, NameTarget, Storage};
use crate::HidBackend;

/// One queued answer to `read_events`
#[derive(Debug, Clone)]
enum EventRead {
    /// Whole events followed by `trailing` stray bytes
    Events { values: Vec<i32>, trailing: usize },
    /// A read returning only `bytes` bytes
    Short { bytes: usize },
}

/// Simulated Oak sensor
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    identity: DeviceIdentity,
    product_name: String,
    strings: BTreeMap<i32, String>,
    fields: Vec<FieldDescriptor>,
    names: HashMap<(u8, Storage), String>,

    current: FeatureReport,
    busy_polls: usize,
    busy_remaining: usize,
    never_ready: bool,
    fixed_reply: Option<FeatureReport>,

    failing_reads_after: Option<usize>,
    failing_writes: bool,
    failing_fields: Vec<u32>,

    events: VecDeque<EventRead>,

    sent: Vec<FeatureReport>,
    feature_reads: usize,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDevice {
    /// An idle Oak sensor with no channels
    pub fn new() -> Self {
        let mut idle = FeatureReport::zeroed();
        idle.as_bytes_mut()[offset::STATUS] = READY;
        Self {
            identity: DeviceIdentity::new(VENDOR_ID, 0x0003, 0x0100),
            product_name: "Toradex Oak Sensor".to_string(),
            strings: BTreeMap::new(),
            fields: Vec::new(),
            names: HashMap::new(),
            current: idle,
            busy_polls: 0,
            busy_remaining: 0,
            never_ready: false,
            fixed_reply: None,
            failing_reads_after: None,
            failing_writes: false,
            failing_fields: Vec::new(),
            events: VecDeque::new(),
            sent: Vec::new(),
            feature_reads: 0,
        }
    }

    pub fn with_identity(mut self, identity: DeviceIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_product_name(mut self, name: &str) -> Self {
        self.product_name = name.to_string();
        self
    }

    pub fn with_serial_number(self, serial: &str) -> Self {
        self.with_string(string_index::SERIAL_NUMBER, serial)
    }

    pub fn with_string(mut self, index: i32, value: &str) -> Self {
        self.strings.insert(index, value.to_string());
        self
    }

    /// Add a channel: its factory name goes into the string table after the
    /// device-level entries
    pub fn with_channel(mut self, name: &str, field: FieldDescriptor) -> Self {
        let index = self.fields.len() as u32;
        self.fields.push(FieldDescriptor {
            field_index: index,
            ..field
        });
        match string_index::channel(index) {
            Ok(slot) => self.with_string(slot, name),
            Err(_) => self,
        }
    }

    pub fn with_device_name(self, storage: Storage, name: &str) -> Self {
        self.with_user_name(NameTarget::Device, storage, name)
    }

    pub fn with_user_name(mut self, target: NameTarget, storage: Storage, name: &str) -> Self {
        self.names
            .insert((target.parameter(), storage), name.to_string());
        self
    }

    /// Report busy for `polls` reads before becoming idle and before each reply
    pub fn with_busy_polls(mut self, polls: usize) -> Self {
        self.busy_polls = polls;
        self.busy_remaining = polls;
        self
    }

    /// Status byte never shows ready
    pub fn never_ready(mut self) -> Self {
        self.never_ready = true;
        self
    }

    /// Answer every command with `reply` instead of emulating firmware
    pub fn with_fixed_reply(mut self, reply: FeatureReport) -> Self {
        self.fixed_reply = Some(reply);
        self
    }

    /// Feature report reads fail once `reads` reads have succeeded
    pub fn with_failing_reads_after(mut self, reads: usize) -> Self {
        self.failing_reads_after = Some(reads);
        self
    }

    pub fn with_failing_writes(mut self) -> Self {
        self.failing_writes = true;
        self
    }

    pub fn with_failing_field_info(mut self, index: u32) -> Self {
        self.failing_fields.push(index);
        self
    }

    /// Queue one interrupt report carrying `values`
    pub fn with_event_batch(self, values: &[i32]) -> Self {
        self.with_raw_event_read(values, 0)
    }

    /// Queue an interrupt read of `values` followed by `trailing` stray bytes
    pub fn with_raw_event_read(mut self, values: &[i32], trailing: usize) -> Self {
        self.events.push_back(EventRead::Events {
            values: values.to_vec(),
            trailing,
        });
        self
    }

    /// Queue an interrupt read that returns only `bytes` bytes
    pub fn with_short_event_read(mut self, bytes: usize) -> Self {
        self.events.push_back(EventRead::Short { bytes });
        self
    }

    /// Every report written, in order
    pub fn sent(&self) -> &[FeatureReport] {
        &self.sent
    }

    /// Number of feature report reads attempted, failed ones included
    pub fn feature_reads(&self) -> usize {
        self.feature_reads
    }

    /// Current value of a name slot
    pub fn user_name(&self, target: NameTarget, storage: Storage) -> Option<&str> {
        self.names
            .get(&(target.parameter(), storage))
            .map(String::as_str)
    }

    /// Firmware side of a command
    fn execute(&mut self, command: &FeatureReport) -> FeatureReport {
        let mut reply = FeatureReport::zeroed();
        let bytes = command.as_bytes();
        if bytes[offset::OPCODE] == cmd::USER_NAME {
            let storage = Storage::from_persistent(bytes[offset::STORAGE] != 0);
            let key = (bytes[offset::PARAMETER], storage);
            if bytes[offset::STATUS] == Action::Set as u8 {
                let name = c_string(&bytes[OUTBOUND_STRING.offset..OUTBOUND_STRING.end()]);
                self.names.insert(key, name);
            }
            if let Some(name) = self.names.get(&key) {
                let len = name.len().min(20);
                reply.as_bytes_mut()[1..1 + len].copy_from_slice(&name.as_bytes()[..len]);
            }
        }
        reply.as_bytes_mut()[offset::STATUS] = READY;
        reply
    }
}

impl HidBackend for SimulatedDevice {
    fn identity(&self) -> Result<DeviceIdentity, OakError> {
        Ok(self.identity)
    }

    fn device_name(&self) -> Result<String, OakError> {
        Ok(self.product_name.clone())
    }

    fn string_descriptor(&self, index: i32) -> Result<String, OakError> {
        self.strings
            .get(&index)
            .cloned()
            .ok_or(OakError::InvalidStringDescriptorIndex(index))
    }

    fn input_field_count(&self) -> Result<u32, OakError> {
        Ok(self.fields.len() as u32)
    }

    fn field_info(&self, index: u32) -> Result<FieldDescriptor, OakError> {
        if self.failing_fields.contains(&index) {
            return Err(OakError::Internal(format!("field {index} unavailable")));
        }
        self.fields
            .get(index as usize)
            .copied()
            .ok_or_else(|| OakError::Internal(format!("no input field {index}")))
    }

    fn read_feature_report(&mut self, report: &mut FeatureReport) -> Result<(), OakError> {
        self.feature_reads += 1;
        if let Some(limit) = self.failing_reads_after {
            if self.feature_reads > limit {
                return Err(OakError::Read(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "simulated read failure",
                )));
            }
        }
        if self.never_ready || self.busy_remaining > 0 {
            self.busy_remaining = self.busy_remaining.saturating_sub(1);
            *report = FeatureReport::zeroed();
            return Ok(());
        }
        *report = self.current;
        Ok(())
    }

    fn write_feature_report(&mut self, report: &FeatureReport) -> Result<(), OakError> {
        if self.failing_writes {
            return Err(OakError::Write(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "simulated write failure",
            )));
        }
        self.sent.push(*report);
        self.current = match self.fixed_reply {
            Some(reply) => reply,
            None => self.execute(report),
        };
        self.busy_remaining = self.busy_polls;
        Ok(())
    }

    fn read_events(&mut self, events: &mut [HidEvent]) -> Result<usize, OakError> {
        let buffer = events.as_mut_bytes();
        let Some(read) = self.events.pop_front() else {
            return Ok(0);
        };
        let bytes = match read {
            EventRead::Events { values, trailing } => {
                let mut bytes = Vec::with_capacity(values.len() * EVENT_SIZE + trailing);
                for (index, value) in values.into_iter().enumerate() {
                    let event = HidEvent {
                        hid: index as u32,
                        value,
                    };
                    bytes.extend_from_slice(event.as_bytes());
                }
                bytes.resize(bytes.len() + trailing, 0);
                bytes
            }
            EventRead::Short { bytes } => vec![0; bytes],
        };
        let len = bytes.len().min(buffer.len());
        buffer[..len].copy_from_slice(&bytes[..len]);
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NameCommand;

    #[test]
    fn test_set_then_get_name() {
        let mut device = SimulatedDevice::new();
        let set = NameCommand::set(NameTarget::Channel(2), Storage::Volatile).build(Some("probe"));
        device.write_feature_report(&set).unwrap();
        assert_eq!(
            device.user_name(NameTarget::Channel(2), Storage::Volatile),
            Some("probe")
        );
        assert_eq!(device.user_name(NameTarget::Channel(2), Storage::Persistent), None);

        let get = NameCommand::get(NameTarget::Channel(2), Storage::Volatile).build(None);
        device.write_feature_report(&get).unwrap();
        let mut reply = FeatureReport::zeroed();
        device.read_feature_report(&mut reply).unwrap();
        assert!(reply.is_ready());
        assert_eq!(reply.decode_string(), "probe");
    }

    #[test]
    fn test_busy_countdown_restarts_after_write() {
        let mut device = SimulatedDevice::new().with_busy_polls(1);
        let mut report = FeatureReport::zeroed();
        device.read_feature_report(&mut report).unwrap();
        assert!(!report.is_ready());
        device.read_feature_report(&mut report).unwrap();
        assert!(report.is_ready());

        device.write_feature_report(&FeatureReport::zeroed()).unwrap();
        device.read_feature_report(&mut report).unwrap();
        assert!(!report.is_ready());
        device.read_feature_report(&mut report).unwrap();
        assert!(report.is_ready());
    }

    #[test]
    fn test_device_and_channel_zero_share_slot() {
        let device = SimulatedDevice::new().with_device_name(Storage::Persistent, "shared");
        assert_eq!(
            device.user_name(NameTarget::Channel(0), Storage::Persistent),
            Some("shared")
        );
    }

    #[test]
    fn test_event_queue_exhausted() {
        let mut device = SimulatedDevice::new();
        let mut events = [HidEvent::default(); 4];
        assert_eq!(device.read_events(&mut events).unwrap(), 0);
    }
}
