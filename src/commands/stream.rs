//! Sample streaming.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use super::{setup_interrupt_handler, with_sensor, CommandResult};
use oak_driver::format;
use oak_driver::DriverConfig;
use tracing::warn;

/// How often the loop wakes up to check for Ctrl+C
const WAKE_INTERVAL: Duration = Duration::from_millis(200);

/// Print interrupt reports until Ctrl+C or `count` reports
pub fn stream(config: &DriverConfig, count: Option<u64>, raw: bool) -> CommandResult {
    let running = setup_interrupt_handler();

    with_sensor(config, |sensor| {
        let channel_count = sensor.channel_count()?;
        let channels = if raw {
            Vec::new()
        } else {
            (0..channel_count)
                .map(|index| sensor.channel_info(index))
                .collect::<Result<Vec<_>, _>>()?
        };
        for channel in &channels {
            print!("{:>16}", channel.display_name());
        }
        if !channels.is_empty() {
            println!();
        }

        let started = Instant::now();
        let mut values = Vec::with_capacity(channel_count as usize);
        let mut reports = 0u64;
        while running.load(Ordering::SeqCst) && count.map_or(true, |n| reports < n) {
            if !sensor.wait_readable(Some(WAKE_INTERVAL))? {
                continue;
            }
            sensor.read_samples(&mut values)?;
            reports += 1;

            if values.len() != channel_count as usize {
                warn!(
                    "Report carries {} values for {} channels",
                    values.len(),
                    channel_count
                );
            }
            let line: Vec<String> = values
                .iter()
                .enumerate()
                .map(|(i, &value)| match channels.get(i) {
                    Some(channel) => format!("{:>16}", format::sample(channel, value)),
                    None => format!("{value:>8}"),
                })
                .collect();
            println!("{}", line.join(""));
        }

        eprintln!(
            "{} reports in {:.1}s",
            reports,
            started.elapsed().as_secs_f64()
        );
        Ok(())
    })
}
