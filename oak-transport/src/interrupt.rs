//! Streamed sample reader
//!
//! Oak sensors push one interrupt report per sampling period. hiddev splits
//! it into one event per channel value.

use tracing::trace;

use crate::error::OakError;
use crate::hiddev::{HidEvent, EVENT_SIZE};
use crate::HidBackend;

/// Maximum number of events taken by one read
pub const EVENT_BATCH: usize = 64;

/// Block for the next batch of events and copy their values into `values`
///
/// `values` is only resized when the event count changes, so a buffer reused
/// across calls is allocated once for a given channel count.
pub fn read_interrupt_report<B: HidBackend + ?Sized>(
    device: &mut B,
    values: &mut Vec<i32>,
) -> Result<(), OakError> {
    let mut events = [HidEvent::default(); EVENT_BATCH];
    let read = device.read_events(&mut events)?;
    if read < EVENT_SIZE {
        return Err(OakError::Read(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("short interrupt read: {read} bytes"),
        )));
    }

    let count = (read / EVENT_SIZE).min(EVENT_BATCH);
    if values.len() != count {
        trace!("Resizing sample buffer {} -> {}", values.len(), count);
        values.resize(count, 0);
    }
    for (value, event) in values.iter_mut().zip(&events[..count]) {
        *value = event.value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusCode;
    use crate::sim::SimulatedDevice;

    #[test]
    fn test_same_count_keeps_allocation() {
        let mut device = SimulatedDevice::new()
            .with_event_batch(&[10, 20, 30])
            .with_event_batch(&[11, 21, 31]);
        let mut values = vec![0; 3];
        let ptr = values.as_ptr();

        read_interrupt_report(&mut device, &mut values).unwrap();
        assert_eq!(values, [10, 20, 30]);
        read_interrupt_report(&mut device, &mut values).unwrap();
        assert_eq!(values, [11, 21, 31]);
        assert_eq!(values.as_ptr(), ptr);
    }

    #[test]
    fn test_resize_to_event_count() {
        let mut device = SimulatedDevice::new()
            .with_event_batch(&[1, -2, 3, -4])
            .with_event_batch(&[7]);
        let mut values = Vec::new();

        read_interrupt_report(&mut device, &mut values).unwrap();
        assert_eq!(values, [1, -2, 3, -4]);
        read_interrupt_report(&mut device, &mut values).unwrap();
        assert_eq!(values, [7]);
    }

    #[test]
    fn test_short_read_is_error() {
        let mut device = SimulatedDevice::new().with_short_event_read(5);
        let mut values = vec![99; 2];
        let err = read_interrupt_report(&mut device, &mut values).unwrap_err();
        assert_eq!(err.status(), StatusCode::ReadError);
        assert_eq!(values, [99, 99]);
    }

    #[test]
    fn test_partial_trailing_event_is_dropped() {
        // Two whole events plus three stray bytes
        let mut device = SimulatedDevice::new().with_raw_event_read(&[5, 6], 3);
        let mut values = Vec::new();
        read_interrupt_report(&mut device, &mut values).unwrap();
        assert_eq!(values, [5, 6]);
    }
}
