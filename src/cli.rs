use std::path::PathBuf;

use clap::Parser;

/// EEOF-based monsoon intraseasonal oscillation index from ensemble forecasts.
#[derive(Parser)]
#[command(
    name = "miso",
    version,
    about = "Compute MISO1/MISO2 indices from ensemble forecasts"
)]
pub struct Cli {
    /// Forecast date as YYYYMMDD; the latest Thursday on or before it is
    /// used. Defaults to today.
    pub date: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file [default: miso.toml if present].
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
