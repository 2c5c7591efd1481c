//! Request/reply handshake over feature reports
//!
//! One transaction at a time per device:
//!
//! 1. read the feature report until byte 0 is `0xFF` (device idle)
//! 2. send the command report
//! 3. read the feature report until byte 0 is `0xFF` again (reply present)
//!
//! The reply overwrites the command buffer. Both polling loops share one
//! deadline taken from [`PollPolicy`].

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::OakError;
use crate::protocol::cmd;
use crate::report::FeatureReport;
use crate::HidBackend;

/// Default bound on a whole transaction
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// How long and how often the engine polls for readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between two reads of a not-ready report
    pub interval: Duration,
    /// Deadline for the whole transaction; `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::ZERO,
            timeout: Some(DEFAULT_REPLY_TIMEOUT),
        }
    }
}

impl PollPolicy {
    /// Poll without any deadline. A device that never becomes ready blocks
    /// the caller forever.
    pub fn unbounded() -> Self {
        Self {
            interval: Duration::ZERO,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Send `report` and replace it with the device's reply
pub fn transact<B: HidBackend + ?Sized>(
    device: &mut B,
    report: &mut FeatureReport,
    policy: &PollPolicy,
) -> Result<(), OakError> {
    let started = Instant::now();
    let deadline = policy.timeout.map(|t| started + t);
    debug!(
        "Transaction {} (0x{:02X}) parameter {}",
        cmd::name(report.opcode()),
        report.opcode(),
        report.parameter()
    );

    let mut idle = FeatureReport::zeroed();
    let ready_polls = poll_until_ready(device, &mut idle, policy, deadline)?;

    device.write_feature_report(report)?;

    let reply_polls = poll_until_ready(device, report, policy, deadline)?;
    debug!(
        "Transaction complete in {:?} ({} ready polls, {} reply polls)",
        started.elapsed(),
        ready_polls,
        reply_polls
    );
    Ok(())
}

/// Read into `report` until its readiness byte is set; returns the number of reads
fn poll_until_ready<B: HidBackend + ?Sized>(
    device: &mut B,
    report: &mut FeatureReport,
    policy: &PollPolicy,
    deadline: Option<Instant>,
) -> Result<usize, OakError> {
    let mut reads = 0;
    loop {
        device.read_feature_report(report)?;
        reads += 1;
        if report.is_ready() {
            return Ok(reads);
        }
        trace!("Device busy (status 0x{:02X})", report.as_bytes()[0]);

        if let (Some(deadline), Some(timeout)) = (deadline, policy.timeout) {
            if Instant::now() >= deadline {
                return Err(OakError::Timeout(timeout));
            }
        }
        if !policy.interval.is_zero() {
            thread::sleep(policy.interval);
        }
    }
}
