//! Mirrors of `<linux/hiddev.h>` and the ioctls issued on a hiddev node
//!
//! Layouts must match the kernel ABI byte for byte; the size tests below pin
//! them together with the resulting request numbers.

use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

/// Size of the string buffer in `hiddev_string_descriptor`
pub const HID_STRING_SIZE: usize = 256;
/// Capacity of `hiddev_usage_ref_multi.values`
pub const HID_MAX_MULTI_USAGES: usize = 1024;
/// Buffer size passed to `HIDIOCGNAME`
pub const NAME_BUFFER_SIZE: usize = 256;

pub const HID_REPORT_TYPE_INPUT: u32 = 1;
pub const HID_REPORT_TYPE_OUTPUT: u32 = 2;
pub const HID_REPORT_TYPE_FEATURE: u32 = 3;

pub const HID_REPORT_ID_FIRST: u32 = 0x0000_0100;

/// `struct hiddev_event`: one streamed sample from the interrupt endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct HidEvent {
    /// Usage code the value belongs to
    pub hid: u32,
    pub value: i32,
}

/// Size in bytes of one interrupt event record
pub const EVENT_SIZE: usize = std::mem::size_of::<HidEvent>();

/// `struct hiddev_devinfo`
#[derive(Debug, Clone, Copy, FromZeros)]
#[repr(C)]
pub struct HiddevDevinfo {
    pub bustype: u32,
    pub busnum: u32,
    pub devnum: u32,
    pub ifnum: u32,
    pub vendor: i16,
    pub product: i16,
    pub version: i16,
    pub num_applications: u32,
}

/// `struct hiddev_string_descriptor`
#[derive(Clone, FromZeros)]
#[repr(C)]
pub struct HiddevStringDescriptor {
    pub index: i32,
    pub value: [u8; HID_STRING_SIZE],
}

/// `struct hiddev_report_info`
#[derive(Debug, Clone, Copy, Default, FromZeros)]
#[repr(C)]
pub struct HiddevReportInfo {
    pub report_type: u32,
    pub report_id: u32,
    pub num_fields: u32,
}

/// `struct hiddev_field_info`
#[derive(Debug, Clone, Copy, Default, FromZeros)]
#[repr(C)]
pub struct HiddevFieldInfo {
    pub report_type: u32,
    pub report_id: u32,
    pub field_index: u32,
    pub maxusage: u32,
    pub flags: u32,
    pub physical: u32,
    pub logical: u32,
    pub application: u32,
    pub logical_minimum: i32,
    pub logical_maximum: i32,
    pub physical_minimum: i32,
    pub physical_maximum: i32,
    pub unit_exponent: u32,
    pub unit: u32,
}

/// `struct hiddev_usage_ref`
#[derive(Debug, Clone, Copy, Default, FromZeros)]
#[repr(C)]
pub struct HiddevUsageRef {
    pub report_type: u32,
    pub report_id: u32,
    pub field_index: u32,
    pub usage_index: u32,
    pub usage_code: u32,
    pub value: i32,
}

/// `struct hiddev_usage_ref_multi`
#[derive(Clone, FromZeros)]
#[repr(C)]
pub struct HiddevUsageRefMulti {
    pub uref: HiddevUsageRef,
    pub num_values: u32,
    pub values: [i32; HID_MAX_MULTI_USAGES],
}

/// Decode a NUL-terminated byte buffer, stopping at the end if no NUL is present
pub(crate) fn c_string(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}

/// Raw ioctl wrappers. Every function is `unsafe`: the caller passes a valid
/// hiddev file descriptor and a pointer to a live, correctly typed struct.
pub(crate) mod ioctl {
    use super::{
        HiddevDevinfo, HiddevFieldInfo, HiddevReportInfo, HiddevStringDescriptor,
        HiddevUsageRefMulti,
    };

    const HID_IOC_MAGIC: u8 = b'H';

    nix::ioctl_read!(
        /// HIDIOCGDEVINFO
        get_devinfo,
        HID_IOC_MAGIC,
        0x03,
        HiddevDevinfo
    );
    nix::ioctl_read!(
        /// HIDIOCGSTRING
        get_string,
        HID_IOC_MAGIC,
        0x04,
        HiddevStringDescriptor
    );
    nix::ioctl_none!(
        /// HIDIOCINITREPORT
        init_report,
        HID_IOC_MAGIC,
        0x05
    );
    nix::ioctl_read_buf!(
        /// HIDIOCGNAME(len)
        get_name,
        HID_IOC_MAGIC,
        0x06,
        u8
    );
    nix::ioctl_write_ptr!(
        /// HIDIOCGREPORT: ask the device for the current report contents
        get_report,
        HID_IOC_MAGIC,
        0x07,
        HiddevReportInfo
    );
    nix::ioctl_write_ptr!(
        /// HIDIOCSREPORT: commit staged usage values to the device
        set_report,
        HID_IOC_MAGIC,
        0x08,
        HiddevReportInfo
    );
    nix::ioctl_readwrite!(
        /// HIDIOCGREPORTINFO
        get_report_info,
        HID_IOC_MAGIC,
        0x09,
        HiddevReportInfo
    );
    nix::ioctl_readwrite!(
        /// HIDIOCGFIELDINFO
        get_field_info,
        HID_IOC_MAGIC,
        0x0A,
        HiddevFieldInfo
    );
    nix::ioctl_readwrite!(
        /// HIDIOCGUSAGES
        get_usages,
        HID_IOC_MAGIC,
        0x13,
        HiddevUsageRefMulti
    );
    nix::ioctl_write_ptr!(
        /// HIDIOCSUSAGES
        set_usages,
        HID_IOC_MAGIC,
        0x14,
        HiddevUsageRefMulti
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_struct_sizes_match_kernel_abi() {
        assert_eq!(size_of::<HidEvent>(), 8);
        assert_eq!(size_of::<HiddevDevinfo>(), 28);
        assert_eq!(size_of::<HiddevStringDescriptor>(), 260);
        assert_eq!(size_of::<HiddevReportInfo>(), 12);
        assert_eq!(size_of::<HiddevFieldInfo>(), 56);
        assert_eq!(size_of::<HiddevUsageRef>(), 24);
        assert_eq!(size_of::<HiddevUsageRefMulti>(), 4124);
    }

    #[test]
    fn test_ioctl_numbers() {
        // Expected values from the C macros in <linux/hiddev.h> (x86/arm layout)
        let devinfo = nix::request_code_read!(b'H', 0x03, size_of::<HiddevDevinfo>());
        let string = nix::request_code_read!(b'H', 0x04, size_of::<HiddevStringDescriptor>());
        let init = nix::request_code_none!(b'H', 0x05);
        let name = nix::request_code_read!(b'H', 0x06, NAME_BUFFER_SIZE);
        let field = nix::request_code_readwrite!(b'H', 0x0A, size_of::<HiddevFieldInfo>());
        let susages = nix::request_code_write!(b'H', 0x14, size_of::<HiddevUsageRefMulti>());

        assert_eq!(devinfo as u32, 0x801C_4803, "HIDIOCGDEVINFO mismatch");
        assert_eq!(string as u32, 0x8104_4804, "HIDIOCGSTRING mismatch");
        assert_eq!(init as u32, 0x0000_4805, "HIDIOCINITREPORT mismatch");
        assert_eq!(name as u32, 0x8100_4806, "HIDIOCGNAME(256) mismatch");
        assert_eq!(field as u32, 0xC038_480A, "HIDIOCGFIELDINFO mismatch");
        assert_eq!(susages as u32, 0x501C_4814, "HIDIOCSUSAGES mismatch");
    }

    #[test]
    fn test_c_string() {
        assert_eq!(c_string(b"Oak\0garbage"), "Oak");
        assert_eq!(c_string(b"NoTerminator"), "NoTerminator");
        assert_eq!(c_string(b"\0"), "");
        assert_eq!(c_string(b""), "");
    }

    #[test]
    fn test_event_byte_view() {
        let mut events = [HidEvent::default(); 2];
        let bytes = events.as_mut_bytes();
        assert_eq!(bytes.len(), 2 * EVENT_SIZE);
        bytes[4..8].copy_from_slice(&(-5i32).to_ne_bytes());
        assert_eq!(events[0].value, -5);
    }
}
