//! Neighbor discovery rate analysis for a single Cooja or testbed log.

use clap::Parser;
use color_eyre::Result;

use ndstats::cli::{run_discovery, LogArgs};

#[derive(Parser, Debug)]
#[command(name = "discovery")]
#[command(about = "Neighbor discovery rate analysis for Cooja and testbed logs")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: LogArgs,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = cli.args.prepare()?;
    run_discovery(&cli.args, &config)
}
