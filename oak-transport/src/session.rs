//! hiddev device session
//!
//! Owns the file descriptor of an opened `/dev/usb/hiddevN` node and issues
//! the kernel ioctls behind [`HidBackend`].

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsRawFd, IntoRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, trace, warn};
use zerocopy::{FromZeros, IntoBytes};

use crate::error::OakError;
use crate::field::FieldDescriptor;
use crate::hiddev::{
    c_string, ioctl, HidEvent, HiddevDevinfo, HiddevFieldInfo, HiddevReportInfo,
    HiddevStringDescriptor, HiddevUsageRefMulti, HID_REPORT_ID_FIRST, HID_REPORT_TYPE_FEATURE,
    HID_REPORT_TYPE_INPUT, NAME_BUFFER_SIZE,
};
use crate::protocol::REPORT_SIZE;
use crate::report::FeatureReport;
use crate::types::DeviceIdentity;
use crate::HidBackend;

/// An opened Oak sensor node
///
/// The descriptor is released by [`HiddevSession::close`], or silently when
/// the session is dropped.
#[derive(Debug)]
pub struct HiddevSession {
    file: File,
    path: PathBuf,
}

impl HiddevSession {
    /// Open a hiddev node and check that it belongs to an Oak sensor
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OakError> {
        let path = path.as_ref();
        let file = File::options()
            .read(true)
            .open(path)
            .map_err(|source| OakError::OpeningFile {
                path: path.display().to_string(),
                source,
            })?;
        let session = Self {
            file,
            path: path.to_path_buf(),
        };

        // Redundant on current kernels, still attempted
        unsafe { ioctl::init_report(session.fd()) }
            .map_err(|e| OakError::internal("HIDIOCINITREPORT", e))?;

        let identity = match verify_vendor(&session) {
            Ok(identity) => identity,
            Err(e) => {
                debug!("{}: {}", path.display(), e);
                if let Err(close_err) = session.close() {
                    warn!("Failed to close rejected device: {}", close_err);
                }
                return Err(e);
            }
        };

        debug!(
            "Opened Oak sensor {} (PID 0x{:04X}, version 0x{:04X})",
            path.display(),
            identity.product_id,
            identity.version
        );
        Ok(session)
    }

    /// Release the device
    pub fn close(self) -> Result<(), OakError> {
        let path = self.path;
        let fd = self.file.into_raw_fd();
        if unsafe { libc::close(fd) } != 0 {
            return Err(OakError::internal("close", io::Error::last_os_error()));
        }
        debug!("Closed {}", path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait until interrupt events can be read without blocking
    ///
    /// `None` waits indefinitely. Returns `false` on timeout or when the wait
    /// was interrupted by a signal.
    pub fn wait_readable(&self, timeout: Option<Duration>) -> Result<bool, OakError> {
        let mut pfd = libc::pollfd {
            fd: self.fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout
            .map(|t| t.as_millis().min(i32::MAX as u128) as i32)
            .unwrap_or(-1);
        let ret = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(OakError::Read(err));
        }
        Ok(ret > 0)
    }

    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    fn feature_report_info() -> HiddevReportInfo {
        HiddevReportInfo {
            report_type: HID_REPORT_TYPE_FEATURE,
            report_id: 0,
            num_fields: 1,
        }
    }

    /// Usage selector covering the whole feature report, values zeroed
    fn feature_usages() -> HiddevUsageRefMulti {
        let mut uref = HiddevUsageRefMulti::new_zeroed();
        uref.uref.report_type = HID_REPORT_TYPE_FEATURE;
        uref.num_values = REPORT_SIZE as u32;
        uref
    }
}

/// Read the identity of a freshly opened device and reject other vendors
pub(crate) fn verify_vendor<B: HidBackend + ?Sized>(
    backend: &B,
) -> Result<DeviceIdentity, OakError> {
    let identity = backend.identity()?;
    if !identity.is_oak() {
        return Err(OakError::InvalidDeviceType {
            vendor_id: identity.vendor_id,
        });
    }
    Ok(identity)
}

impl HidBackend for HiddevSession {
    fn identity(&self) -> Result<DeviceIdentity, OakError> {
        let mut info = HiddevDevinfo::new_zeroed();
        unsafe { ioctl::get_devinfo(self.fd(), &mut info) }
            .map_err(|e| OakError::internal("HIDIOCGDEVINFO", e))?;
        Ok(DeviceIdentity {
            vendor_id: info.vendor as u16,
            product_id: info.product as u16,
            version: info.version as u16,
            bus_type: info.bustype,
            bus_num: info.busnum,
            dev_num: info.devnum,
            if_num: info.ifnum,
            num_applications: info.num_applications,
        })
    }

    fn device_name(&self) -> Result<String, OakError> {
        let mut buf = [0u8; NAME_BUFFER_SIZE];
        unsafe { ioctl::get_name(self.fd(), &mut buf) }
            .map_err(|e| OakError::internal("HIDIOCGNAME", e))?;
        Ok(c_string(&buf))
    }

    fn string_descriptor(&self, index: i32) -> Result<String, OakError> {
        let mut desc = HiddevStringDescriptor::new_zeroed();
        desc.index = index;
        unsafe { ioctl::get_string(self.fd(), &mut desc) }
            .map_err(|_| OakError::InvalidStringDescriptorIndex(index))?;
        Ok(c_string(&desc.value))
    }

    fn input_field_count(&self) -> Result<u32, OakError> {
        let mut info = HiddevReportInfo {
            report_type: HID_REPORT_TYPE_INPUT,
            report_id: HID_REPORT_ID_FIRST,
            num_fields: 0,
        };
        unsafe { ioctl::get_report_info(self.fd(), &mut info) }
            .map_err(|e| OakError::internal("HIDIOCGREPORTINFO", e))?;
        Ok(info.num_fields)
    }

    fn field_info(&self, index: u32) -> Result<FieldDescriptor, OakError> {
        let mut info = HiddevFieldInfo {
            report_type: HID_REPORT_TYPE_INPUT,
            report_id: HID_REPORT_ID_FIRST,
            field_index: index,
            ..HiddevFieldInfo::default()
        };
        unsafe { ioctl::get_field_info(self.fd(), &mut info) }
            .map_err(|e| OakError::internal(&format!("HIDIOCGFIELDINFO({index})"), e))?;
        Ok(FieldDescriptor::from(&info))
    }

    fn read_feature_report(&mut self, report: &mut FeatureReport) -> Result<(), OakError> {
        let rinfo = Self::feature_report_info();
        unsafe { ioctl::get_report(self.fd(), &rinfo) }
            .map_err(|e| OakError::Read(io::Error::from(e)))?;

        let mut uref = Self::feature_usages();
        unsafe { ioctl::get_usages(self.fd(), &mut uref) }
            .map_err(|e| OakError::Read(io::Error::from(e)))?;

        for (byte, value) in report.as_bytes_mut().iter_mut().zip(uref.values.iter()) {
            *byte = *value as u8;
        }
        trace!("feature report <- {:?}", report);
        Ok(())
    }

    fn write_feature_report(&mut self, report: &FeatureReport) -> Result<(), OakError> {
        trace!("feature report -> {:?}", report);
        let mut uref = Self::feature_usages();
        for (value, byte) in uref.values.iter_mut().zip(report.as_bytes().iter()) {
            *value = i32::from(*byte);
        }
        unsafe { ioctl::set_usages(self.fd(), &uref) }
            .map_err(|e| OakError::Write(io::Error::from(e)))?;

        let rinfo = Self::feature_report_info();
        unsafe { ioctl::set_report(self.fd(), &rinfo) }
            .map_err(|e| OakError::Write(io::Error::from(e)))?;
        Ok(())
    }

    fn read_events(&mut self, events: &mut [HidEvent]) -> Result<usize, OakError> {
        let read = self
            .file
            .read(events.as_mut_bytes())
            .map_err(OakError::Read)?;
        trace!("interrupt read: {} bytes", read);
        Ok(read)
    }
}
