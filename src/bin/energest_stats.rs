//! Energest duty cycle analysis for a single Cooja or testbed log.

use clap::Parser;
use color_eyre::Result;

use ndstats::cli::{run_energy, LogArgs};

#[derive(Parser, Debug)]
#[command(name = "energest-stats")]
#[command(about = "Radio duty cycle analysis from Energest samples")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: LogArgs,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = cli.args.prepare()?;
    run_energy(&cli.args, &config)
}
