//! Status command - refresh once and show every sensor.

use anyhow::{Result, bail};
use clap::Args;
use futures::future::join_all;
use powercuts_core::PostcodeQuery;
use powercuts_core::consts::DEFAULT_NAME;
use powercuts_store::{ConfigEntry, Settings};
use tracing::info;

use crate::monitor::{EntryMonitor, EntryReport};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for status command.
#[derive(Args, Default)]
pub struct StatusArgs {
    /// Only this config entry.
    #[arg(long, short)]
    pub entry: Option<String>,

    /// Look up a postcode without configuring it.
    #[arg(long, short, conflicts_with = "entry")]
    pub postcode: Option<String>,
}

/// Entries selected by `--entry` / `--postcode`, or all configured ones.
pub fn select_entries(
    settings: &Settings,
    entry: Option<&str>,
    postcode: Option<&str>,
) -> Result<Vec<ConfigEntry>> {
    if let Some(postcode) = postcode {
        PostcodeQuery::parse(postcode)?;
        return Ok(vec![ConfigEntry::new(postcode, DEFAULT_NAME)]);
    }

    if let Some(entry_id) = entry {
        return match settings.entry(entry_id) {
            Some(entry) => Ok(vec![entry.clone()]),
            None => bail!("Unknown config entry: {entry_id}"),
        };
    }

    if settings.entries.is_empty() {
        bail!("No postcodes configured. Add one with `powercuts config add <POSTCODE>`");
    }
    Ok(settings.entries.clone())
}

/// Refreshes every monitor concurrently.
pub async fn refresh_all(monitors: &mut [EntryMonitor]) -> Vec<EntryReport> {
    join_all(monitors.iter_mut().map(|m| m.refresh())).await
}

/// Prints reports in the selected format.
pub fn print_reports(reports: &[EntryReport], cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let blocks: Vec<String> = reports.iter().map(|r| formatter.format_report(r)).collect();
            println!("{}", blocks.join("\n\n"));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_reports(reports)?);
        }
    }
    Ok(())
}

/// Runs the status command.
pub async fn run(args: &StatusArgs, cli: &Cli) -> Result<()> {
    let settings = cli.load_settings().await?.get().await;
    let entries = select_entries(&settings, args.entry.as_deref(), args.postcode.as_deref())?;

    info!(entries = entries.len(), "Refreshing");

    let mut monitors: Vec<EntryMonitor> = entries
        .into_iter()
        .map(|entry| EntryMonitor::new(entry, &settings))
        .collect();
    let reports = refresh_all(&mut monitors).await;

    print_reports(&reports, cli)?;

    let failed = reports.iter().filter(|r| !r.last_update_success).count();
    if failed > 0 {
        bail!("{failed} of {} refreshes failed", reports.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            entries: vec![
                ConfigEntry::new("NE1 1AA", "Home"),
                ConfigEntry::new("DH1 3LE", "Office"),
            ],
            ..Settings::default()
        }
    }

    #[test]
    fn test_select_all_entries() {
        let entries = select_entries(&settings(), None, None).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_select_one_entry() {
        let entries = select_entries(&settings(), Some("dh13le"), None).unwrap();
        assert_eq!(entries[0].name(), "Office");
        assert!(select_entries(&settings(), Some("missing"), None).is_err());
    }

    #[test]
    fn test_adhoc_postcode() {
        let entries = select_entries(&Settings::default(), None, Some("ne1 1aa")).unwrap();
        assert_eq!(entries[0].entry_id, "ne11aa");
        assert_eq!(entries[0].name(), DEFAULT_NAME);
        assert!(select_entries(&Settings::default(), None, Some("NE1")).is_err());
    }

    #[test]
    fn test_nothing_configured() {
        assert!(select_entries(&Settings::default(), None, None).is_err());
    }
}
