//! Check command - is the API reachable?

use anyhow::{Result, bail};
use powercuts_fetch::Probe;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the check command.
pub async fn run(cli: &Cli) -> Result<()> {
    let settings = cli.load_settings().await?.get().await;
    let fetch = settings.fetch_settings();

    let result = Probe::new(&fetch.endpoint)
        .with_timeout(fetch.timeout)
        .check(&fetch.build_client())
        .await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_probe(&fetch.endpoint, &result));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_probe(&fetch.endpoint, &result)?);
        }
    }

    if !result.success() {
        bail!("{} is not reachable", fetch.endpoint);
    }
    Ok(())
}
