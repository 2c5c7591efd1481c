//! Sensor queries against the simulated device, plus a hardware smoke test.
//!
//! The hardware test needs a connected Oak sensor.
//! Run with: cargo test -p oak-sensor --test sensor_queries -- --ignored --nocapture

use std::thread;
use std::time::Duration;

use oak_sensor::{
    list_sensors, ChannelInfo, FieldDescriptor, FieldOutcome, NameTarget, OakSensor, PollPolicy,
    StatusCode, Storage,
};
use oak_transport::sim::SimulatedDevice;
use oak_transport::types::DeviceIdentity;

fn temperature_field() -> FieldDescriptor {
    FieldDescriptor {
        physical_minimum: -4000,
        physical_maximum: 12500,
        unit_exponent: 0x0E,
        unit: 0x0001_0001,
        ..FieldDescriptor::default()
    }
}

/// Oak humidity sensor with three channels
fn oak_rh() -> SimulatedDevice {
    SimulatedDevice::new()
        .with_product_name("Toradex Oak RH")
        .with_serial_number("00123456")
        .with_channel(
            "Frame Number [s]",
            FieldDescriptor::with_physical_range(0, 65535),
        )
        .with_channel("Temperature [°C]", temperature_field())
        .with_channel(
            "Humidity [%RH]",
            FieldDescriptor {
                unit_exponent: 0x0E,
                ..FieldDescriptor::with_physical_range(0, 10000)
            },
        )
        .with_device_name(Storage::Persistent, "Greenhouse")
        .with_device_name(Storage::Volatile, "Bench")
        .with_user_name(NameTarget::Channel(1), Storage::Persistent, "Air")
}

#[test]
fn device_info_aggregates_all_queries() {
    let mut sensor = OakSensor::new(oak_rh());
    let info = sensor.device_info().unwrap();

    assert_eq!(info.vendor_id, 0x1B67);
    assert_eq!(info.product_id, 0x0003);
    assert_eq!(info.device_name, "Toradex Oak RH");
    assert_eq!(info.persistent_user_device_name, "Greenhouse");
    assert_eq!(info.volatile_user_device_name, "Bench");
    assert_eq!(info.serial_number, "00123456");
    assert_eq!(info.number_of_channels, 3);

    // Persistent name queried before volatile
    let sent = sensor.backend().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].as_bytes()[1], 1);
    assert_eq!(sent[1].as_bytes()[1], 0);
}

#[test]
fn device_info_stops_at_first_failure() {
    let device = SimulatedDevice::new().with_failing_writes();
    let mut sensor = OakSensor::new(device);
    let err = sensor.device_info().unwrap_err();
    assert_eq!(err.status(), StatusCode::WriteError);
}

#[test]
fn missing_serial_number() {
    let sensor = OakSensor::new(SimulatedDevice::new());
    let err = sensor.serial_number().unwrap_err();
    assert_eq!(err.status(), StatusCode::InvalidStringDescriptorIndex);
}

#[test]
fn channel_names_follow_device_strings() {
    let sensor = OakSensor::new(oak_rh());
    assert_eq!(sensor.channel_name(0).unwrap(), "Frame Number [s]");
    assert_eq!(sensor.channel_name(1).unwrap(), "Temperature [°C]");
    assert_eq!(
        sensor.channel_name(3).unwrap_err().status(),
        StatusCode::InvalidStringDescriptorIndex
    );
    assert_eq!(sensor.unit_name(2).unwrap(), "%RH");
}

#[test]
fn channel_index_past_string_table_range() {
    let mut sensor = OakSensor::new(oak_rh());
    // Must not wrap onto the device-level strings at indices 0-3
    for channel in [u32::MAX - 3, u32::MAX - 1, i32::MAX as u32 - 3, i32::MAX as u32] {
        assert_eq!(
            sensor.channel_name(channel).unwrap_err().status(),
            StatusCode::InvalidStringDescriptorIndex
        );
        assert_eq!(
            sensor.unit_name(channel).unwrap_err().status(),
            StatusCode::InvalidStringDescriptorIndex
        );
        assert_eq!(
            sensor.channel_info(channel).unwrap_err().status(),
            StatusCode::InvalidStringDescriptorIndex
        );
    }
    assert!(sensor.backend().sent().is_empty());
}

#[test]
fn channel_info_decodes_field() {
    let mut sensor = OakSensor::new(oak_rh());
    let info = sensor.channel_info(1).unwrap();

    assert_eq!(info.channel_name, "Temperature [°C]");
    assert_eq!(info.persistent_user_channel_name, FieldOutcome::Available("Air".into()));
    assert_eq!(info.volatile_user_channel_name, FieldOutcome::Available(String::new()));
    assert!(info.is_signed);
    assert_eq!(info.bit_size, 16);
    assert_eq!(info.unit_exponent, -2);
    assert_eq!(info.unit_code, 0x0001_0001);
    assert_eq!(info.unit, "°C");
    assert!((info.scale(2315) - 23.15).abs() < 1e-9);
    assert_eq!(info.display_name(), "Air");
}

#[test]
fn channel_info_tolerates_user_name_failure() {
    // Channel name and field info still work without a responding device
    let device = oak_rh().never_ready();
    let mut sensor =
        OakSensor::new(device).with_poll_policy(PollPolicy::default().with_timeout(Duration::ZERO));
    let info = sensor.channel_info(2).unwrap();

    assert_eq!(
        info.persistent_user_channel_name,
        FieldOutcome::Unavailable(StatusCode::Timeout)
    );
    assert_eq!(
        info.volatile_user_channel_name,
        FieldOutcome::Unavailable(StatusCode::Timeout)
    );
    assert_eq!(info.unit, "%RH");
    assert_eq!(info.bit_size, 16);
    assert!(!info.is_signed);
}

#[test]
fn channel_info_json_keeps_unavailable_names() {
    let device = oak_rh().never_ready();
    let mut sensor =
        OakSensor::new(device).with_poll_policy(PollPolicy::default().with_timeout(Duration::ZERO));
    let info = sensor.channel_info(1).unwrap();

    let json = serde_json::to_string(&info).unwrap();
    assert!(json.contains("Timeout"));
    let parsed: ChannelInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, info);
    assert_eq!(
        parsed.volatile_user_channel_name,
        FieldOutcome::Unavailable(StatusCode::Timeout)
    );
}

#[test]
fn channel_info_requires_field_info() {
    let mut sensor = OakSensor::new(oak_rh().with_failing_field_info(1));
    let err = sensor.channel_info(1).unwrap_err();
    assert_eq!(err.status(), StatusCode::InternalError);
}

#[test]
fn channel_info_requires_unit() {
    let device = SimulatedDevice::new().with_channel("Frame", FieldDescriptor::default());
    let mut sensor = OakSensor::new(device);
    let err = sensor.channel_info(0).unwrap_err();
    assert_eq!(err.status(), StatusCode::InternalError);
}

#[test]
fn set_and_read_back_user_names() {
    let mut sensor = OakSensor::new(oak_rh());
    sensor
        .set_user_channel_name(2, Storage::Volatile, "Soil moisture probe A")
        .unwrap();
    sensor
        .set_user_device_name(Storage::Persistent, "Lab")
        .unwrap();

    // 21 bytes in, 20 stored
    assert_eq!(
        sensor.user_channel_name(2, Storage::Volatile).unwrap(),
        "Soil moisture probe "
    );
    assert_eq!(sensor.user_device_name(Storage::Persistent).unwrap(), "Lab");
    assert_eq!(sensor.user_device_name(Storage::Volatile).unwrap(), "Bench");

    let set = sensor.backend().sent()[0];
    assert_eq!(&set.as_bytes()[..4], &[0, 0, 0x15, 2]);
    assert_eq!(&set.as_bytes()[5..25], b"Soil moisture probe ");
}

#[test]
fn channel_index_beyond_parameter_byte() {
    let mut sensor = OakSensor::new(oak_rh());
    let err = sensor.user_channel_name(256, Storage::Volatile).unwrap_err();
    assert_eq!(err.status(), StatusCode::InternalError);
    assert!(sensor.backend().sent().is_empty());
}

#[test]
fn read_samples_reuses_buffer() {
    let device = oak_rh()
        .with_event_batch(&[1, 2315, 4512])
        .with_event_batch(&[2, 2320, 4509]);
    let mut sensor = OakSensor::new(device);
    let mut values = Vec::new();

    sensor.read_samples(&mut values).unwrap();
    assert_eq!(values, [1, 2315, 4512]);
    sensor.read_samples(&mut values).unwrap();
    assert_eq!(values, [2, 2320, 4509]);

    let err = sensor.read_samples(&mut values).unwrap_err();
    assert_eq!(err.status(), StatusCode::ReadError);
}

#[test]
fn shared_sensor_serializes_transactions() {
    let shared = OakSensor::new(oak_rh().with_busy_polls(2)).shared();
    let workers: Vec<_> = (0..4u8)
        .map(|i| {
            let sensor = shared.clone();
            thread::spawn(move || {
                let name = format!("worker {i}");
                let mut sensor = sensor.lock();
                sensor
                    .set_user_channel_name(u32::from(i), Storage::Volatile, &name)
                    .unwrap();
                assert_eq!(
                    sensor.user_channel_name(u32::from(i), Storage::Volatile).unwrap(),
                    name
                );
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(shared.lock().backend().sent().len(), 8);
}

#[test]
fn non_oak_identity_is_reported() {
    let device = SimulatedDevice::new().with_identity(DeviceIdentity::new(0x046D, 0xC077, 1));
    let sensor = OakSensor::new(device);
    assert!(!sensor.identity().unwrap().is_oak());
}

#[test]
#[ignore] // requires hardware
fn hardware_device_and_channels() {
    let summary = list_sensors()
        .into_iter()
        .next()
        .expect("No Oak sensor found, plug one in");
    println!("{summary:?}");

    let mut sensor = OakSensor::open(&summary.path).expect("failed to open sensor");
    let info = sensor.device_info().expect("device info");
    println!("{info:#?}");
    assert_eq!(info.vendor_id, 0x1B67);

    for channel in 0..info.number_of_channels {
        let channel_info = sensor.channel_info(channel).expect("channel info");
        println!("{channel_info:#?}");
    }

    let mut values = Vec::new();
    sensor.read_samples(&mut values).expect("interrupt read");
    assert_eq!(values.len(), info.number_of_channels as usize);
    sensor.close().expect("close");
}
