mod cli;
mod config;
mod convert;
mod logging;
mod pipeline;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::cli::Cli;
use crate::config::MisoConfig;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = MisoConfig::load(cli.config.as_deref())?;
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let settings = convert::build_settings(&config, home.as_deref())?;

    let today = chrono::Local::now().date_naive();
    let anchor = miso_calendar::resolve_anchor(cli.date.as_deref(), today)?;

    let outcome = pipeline::run(&settings, anchor)?;
    for path in &outcome.outputs {
        info!(path = %path.display(), "index written");
    }
    if let Some(path) = &outcome.summary {
        info!(path = %path.display(), "summary written");
    }
    Ok(())
}
