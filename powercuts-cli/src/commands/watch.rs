//! Watch command - refresh on an interval.

use anyhow::Result;
use clap::Args;
use std::io::{Write, stdout};
use tokio::time::{Duration, interval};
use tracing::{info, warn};

use super::status::{print_reports, refresh_all, select_entries};
use crate::monitor::EntryMonitor;
use crate::{Cli, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured scan interval).
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Minimum interval to use.
    #[arg(long, default_value = "60")]
    pub min_interval: u64,

    /// Only this config entry.
    #[arg(long, short)]
    pub entry: Option<String>,
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<()> {
    let settings = cli.load_settings().await?.get().await;
    let entries = select_entries(&settings, args.entry.as_deref(), None)?;

    let mut monitors: Vec<EntryMonitor> = entries
        .into_iter()
        .map(|entry| EntryMonitor::new(entry, &settings))
        .collect();

    let refresh_interval = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| coordinator_interval(&monitors, settings.scan_interval()))
        .max(Duration::from_secs(args.min_interval));

    info!(
        interval = refresh_interval.as_secs(),
        entries = monitors.len(),
        "Starting watch mode"
    );

    let mut ticker = interval(refresh_interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch mode");
                return Ok(());
            }
        }

        let reports = refresh_all(&mut monitors).await;
        for report in reports.iter().filter(|r| !r.last_update_success) {
            warn!(
                entry_id = %report.entry_id,
                error = report.error.as_deref().unwrap_or("unknown"),
                "Refresh failed, showing last known data"
            );
        }

        if cli.format == OutputFormat::Text {
            // Clear screen
            print!("\x1b[2J\x1b[H");
            stdout().flush()?;

            let now = chrono::Local::now();
            println!(
                "powercuts watch - {} (refresh: {}s)",
                now.format("%H:%M:%S"),
                refresh_interval.as_secs()
            );
            println!("{}", "─".repeat(50));
            println!();
        }

        print_reports(&reports, cli)?;

        if cli.format == OutputFormat::Text {
            println!();
            println!("Press Ctrl+C to exit");
        }
    }
}

/// Shortest update interval among the monitored entries.
fn coordinator_interval(monitors: &[EntryMonitor], fallback: Duration) -> Duration {
    monitors
        .iter()
        .map(EntryMonitor::update_interval)
        .min()
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use powercuts_store::{ConfigEntry, Settings};

    #[test]
    fn test_interval_follows_coordinators() {
        let settings = Settings {
            scan_interval_secs: 120,
            ..Settings::default()
        };
        let monitors = vec![EntryMonitor::new(ConfigEntry::new("NE1 1AA", "Home"), &settings)];

        assert_eq!(
            coordinator_interval(&monitors, Duration::from_secs(5)),
            Duration::from_secs(120)
        );
        assert_eq!(
            coordinator_interval(&[], Duration::from_secs(5)),
            Duration::from_secs(5)
        );
    }
}
