use clap::{Parser, Subcommand};
use color_eyre::Result;

use ndstats::cli::{run_all, run_discovery, run_energy, LogArgs};

/// Discovery rate and duty cycle analysis for Cooja and testbed logs
#[derive(Parser, Debug)]
#[command(name = "ndstats", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Neighbor discovery rate per node
    Discovery(LogArgs),

    /// Energest radio duty cycle per node
    Energy(LogArgs),

    /// Both analyses over the same log
    All(LogArgs),
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    match &cli.command {
        Commands::Discovery(args) => {
            let config = args.prepare()?;
            run_discovery(args, &config)
        }
        Commands::Energy(args) => {
            let config = args.prepare()?;
            run_energy(args, &config)
        }
        Commands::All(args) => {
            let config = args.prepare()?;
            run_all(args, &config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["ndstats", "energy", "-t", "test.log"]);
        match cli.command {
            Commands::Energy(args) => {
                assert!(args.testbed);
                assert_eq!(args.logfile, PathBuf::from("test.log"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_all_subcommand() {
        let cli = Cli::parse_from(["ndstats", "all", "test.log", "--config", "ndstats.yaml"]);
        assert!(matches!(cli.command, Commands::All(ref args) if args.config.is_some()));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["ndstats"]).is_err());
    }
}
