//! Driver configuration
//!
//! Stored as TOML, by default in `~/.config/oak/driver.toml`. Command-line
//! flags override the stored values for one run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use oak_transport::PollPolicy;

/// Persistent driver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// hiddev node to use instead of the first sensor found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<PathBuf>,
    /// Bound on one request/reply exchange
    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
    /// Wait for replies without any bound
    #[serde(default)]
    pub wait_forever: bool,
    /// Pause between readiness polls (0 = poll back to back)
    #[serde(default)]
    pub poll_interval_ms: u64,
}

fn default_reply_timeout_ms() -> u64 {
    2000
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device: None,
            reply_timeout_ms: default_reply_timeout_ms(),
            wait_forever: false,
            poll_interval_ms: 0,
        }
    }
}

impl DriverConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oak")
            .join("driver.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(
        mut self,
        device: Option<PathBuf>,
        timeout_ms: Option<u64>,
        wait_forever: bool,
    ) -> Self {
        if device.is_some() {
            self.device = device;
        }
        if let Some(timeout_ms) = timeout_ms {
            self.reply_timeout_ms = timeout_ms;
            self.wait_forever = false;
        }
        if wait_forever {
            self.wait_forever = true;
        }
        self
    }

    /// Polling behaviour for the request/reply engine
    pub fn poll_policy(&self) -> PollPolicy {
        let policy = if self.wait_forever {
            PollPolicy::unbounded()
        } else {
            PollPolicy::default().with_timeout(Duration::from_millis(self.reply_timeout_ms))
        };
        policy.with_interval(Duration::from_millis(self.poll_interval_ms))
    }
}
