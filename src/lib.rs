// Toradex Oak sensor driver - shared library
// Driver configuration and output formatting for the CLI

pub mod config;
pub mod format;

pub use config::DriverConfig;
