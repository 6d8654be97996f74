//! Config command - manage configuration.

use anyhow::{Result, anyhow, bail};
use clap::{Args, Subcommand};
use powercuts_store::{
    ConfigFlow, FlowErrors, FlowResult, OptionsFlow, SettingsStore, UserInput,
    default_config_dir,
};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Monitor a postcode.
    Add {
        /// Postcode, e.g. "NE1 1AA".
        postcode: String,

        /// Base name for the sensors.
        #[arg(long, short)]
        name: Option<String>,
    },

    /// Change the postcode or name of an entry.
    Options {
        /// Config entry id.
        entry_id: String,

        /// New postcode.
        #[arg(long, short)]
        postcode: Option<String>,

        /// New name.
        #[arg(long, short)]
        name: Option<String>,
    },

    /// Stop monitoring an entry.
    Remove {
        /// Config entry id.
        entry_id: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Add { postcode, name } => add_entry(postcode, name.as_deref(), cli).await,
        ConfigAction::Options {
            entry_id,
            postcode,
            name,
        } => set_options(entry_id, postcode.as_deref(), name.as_deref(), cli).await,
        ConfigAction::Remove { entry_id } => remove_entry(entry_id, cli).await,
        ConfigAction::Reset => reset_config(cli).await,
    }
}

/// Saves the store if anything changed since `changes` was taken.
async fn persist(store: &SettingsStore, changes: &watch::Receiver<u64>) -> Result<()> {
    if changes.has_changed().unwrap_or(false) {
        store.save().await?;
    } else {
        debug!("Settings unchanged, not saving");
    }
    Ok(())
}

fn describe_errors(errors: &FlowErrors) -> String {
    errors
        .iter()
        .map(|(field, code)| format!("{field}: {code}"))
        .collect::<Vec<_>>()
        .join(", ")
}

async fn show_config(cli: &Cli) -> Result<()> {
    let settings = cli.load_settings().await?.get().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_settings(&settings));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = cli.settings_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn add_entry(postcode: &str, name: Option<&str>, cli: &Cli) -> Result<()> {
    let store = cli.load_settings().await?;
    let changes = store.subscribe();
    let flow = ConfigFlow::new(&store.get().await);

    let mut input = UserInput::postcode(postcode);
    if let Some(name) = name {
        input = input.with_name(name);
    }

    match flow.step_user(&store, input).await {
        FlowResult::CreateEntry { entry } => {
            persist(&store, &changes).await?;
            info!(entry_id = %entry.entry_id, "Config entry created");
            println!("Added {} (entry id: {})", entry.title, entry.entry_id);
            Ok(())
        }
        FlowResult::ShowForm { errors, .. } => bail!("Invalid input: {}", describe_errors(&errors)),
        FlowResult::Abort { reason } => bail!("Aborted: {reason}"),
        other => bail!("Unexpected flow result: {other:?}"),
    }
}

async fn set_options(
    entry_id: &str,
    postcode: Option<&str>,
    name: Option<&str>,
    cli: &Cli,
) -> Result<()> {
    let store = cli.load_settings().await?;
    let changes = store.subscribe();
    let entry = store
        .entry(entry_id)
        .await
        .ok_or_else(|| anyhow!("Unknown config entry: {entry_id}"))?;

    let mut input = OptionsFlow::defaults(&entry);
    if let Some(postcode) = postcode {
        input.postcode = postcode.to_string();
    }
    if let Some(name) = name {
        input.name = Some(name.to_string());
    }

    match OptionsFlow::new(entry_id).step_init(&store, input).await? {
        FlowResult::UpdateEntry { entry } => {
            persist(&store, &changes).await?;
            println!(
                "Updated {}: postcode {}, name {}",
                entry.entry_id,
                entry.postcode(),
                entry.name()
            );
            Ok(())
        }
        FlowResult::ShowForm { errors, .. } => bail!("Invalid input: {}", describe_errors(&errors)),
        FlowResult::Abort { reason } => bail!("Aborted: {reason}"),
        other => bail!("Unexpected flow result: {other:?}"),
    }
}

async fn remove_entry(entry_id: &str, cli: &Cli) -> Result<()> {
    let store = cli.load_settings().await?;
    let changes = store.subscribe();
    let entry = store.remove_entry(entry_id).await?;
    persist(&store, &changes).await?;

    println!("Removed {}", entry.title);
    Ok(())
}

async fn reset_config(cli: &Cli) -> Result<()> {
    let store = cli.load_settings().await?;
    let changes = store.subscribe();

    store.reset().await;
    persist(&store, &changes).await?;

    info!(path = %store.path().display(), "Settings reset");
    println!("Configuration reset to defaults");
    Ok(())
}
