//! Toradex Oak Sensor Driver CLI
//!
//! A command-line interface for querying and naming Oak sensors and
//! streaming their samples.

use clap::Parser;
use oak_driver::DriverConfig;
use oak_transport::OakError;
use tracing::debug;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

fn main() {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<OakError>() {
            Some(oak) => eprintln!("Error: {e:#} [{}]", oak.status()),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(DriverConfig::default_path);
    let config = DriverConfig::load(&config_path)?.with_overrides(
        cli.device,
        cli.timeout_ms,
        cli.wait_forever,
    );
    debug!("Effective config: {:?}", config);

    match cli.command {
        None => commands::query::info(&config, false),

        // === Query Commands ===
        Some(Commands::Info { json }) => commands::query::info(&config, json),
        Some(Commands::Channels { json }) => commands::query::channels(&config, json),
        Some(Commands::GetName { channel }) => commands::query::get_name(&config, channel),

        // === Set Commands ===
        Some(Commands::SetName {
            name,
            channel,
            volatile,
        }) => commands::set::set_name(&config, &name, channel, volatile),

        // === Streaming ===
        Some(Commands::Stream { count, raw }) => commands::stream::stream(&config, count, raw),

        // === Utility Commands ===
        Some(Commands::List { json }) => commands::utility::list(json),
        Some(Commands::Raw { hex }) => commands::utility::raw(&config, hex),
        Some(Commands::Config { save }) => commands::utility::config(&config, &config_path, save),
    }
}
