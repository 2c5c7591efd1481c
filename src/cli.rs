// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oak_driver")]
#[command(author, version, about = "Toradex Oak USB sensor driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// hiddev node of the sensor (default: from config, else first sensor found)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub device: Option<PathBuf>,

    /// Reply timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Wait for device replies without a timeout
    #[arg(long, global = true, conflicts_with = "timeout_ms")]
    pub wait_forever: bool,

    /// Config file path (default: ~/.config/oak/driver.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// List connected Oak sensors
    #[command(visible_alias = "ls")]
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show device information
    #[command(visible_aliases = ["i", "device"])]
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show all channels with their metadata
    #[command(visible_aliases = ["ch", "c"])]
    Channels {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the persistent and volatile user names
    #[command(visible_alias = "gn")]
    GetName {
        /// Channel index (device name if omitted)
        #[arg(short, long)]
        channel: Option<u32>,
    },

    /// Set a user name (20 bytes max, longer names are cut)
    #[command(visible_alias = "sn")]
    SetName {
        /// New name
        name: String,
        /// Channel index (device name if omitted)
        #[arg(short, long)]
        channel: Option<u32>,
        /// Store in RAM only instead of flash
        #[arg(long)]
        volatile: bool,
    },

    /// Print samples as they arrive (Ctrl+C to stop)
    #[command(visible_aliases = ["watch", "w"])]
    Stream {
        /// Stop after this many reports
        #[arg(short = 'n', long)]
        count: Option<u64>,
        /// Print raw values instead of scaled ones
        #[arg(long)]
        raw: bool,
    },

    /// Dump the current feature report
    Raw {
        /// Show bytes in hex instead of decimal
        #[arg(long)]
        hex: bool,
    },

    /// Show the effective configuration
    #[command(visible_alias = "cfg")]
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}
