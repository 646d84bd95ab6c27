//! Command-line surface shared by the analyzer binaries.

use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;

use crate::analysis::{self, LogSource};
use crate::config::AnalysisConfig;
use crate::config_loader;

/// Diagnostics go to stderr; keep them quiet unless asked so stdout is just the report
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Data collection logfile to be parsed and analyzed
    pub logfile: PathBuf,

    /// Flag for testbed experiments
    #[arg(short, long)]
    pub testbed: bool,

    /// Optional YAML analysis configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl LogArgs {
    pub fn source(&self) -> LogSource {
        LogSource::from_testbed_flag(self.testbed)
    }

    /// Load the configuration and initialize logging
    pub fn prepare(&self) -> Result<AnalysisConfig> {
        let config = config_loader::resolve_config(self.config.as_deref())?;

        let level = self
            .log_level
            .clone()
            .or_else(|| config.log_level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

        log::info!("Log file: {:?} ({} log)", self.logfile, self.source());
        Ok(config)
    }
}

/// Analyze the discovery rate and print the report
pub fn run_discovery(args: &LogArgs, config: &AnalysisConfig) -> Result<()> {
    let report = analysis::analyze_discovery(&args.logfile, args.source(), config)
        .wrap_err("Discovery rate analysis failed")?;
    analysis::print_report(&analysis::discovery_report_lines(&report));
    Ok(())
}

/// Analyze the duty cycle and print the report
pub fn run_energy(args: &LogArgs, config: &AnalysisConfig) -> Result<()> {
    let report = analysis::analyze_energy(&args.logfile, args.source(), config)
        .wrap_err("Duty cycle analysis failed")?;
    analysis::print_report(&analysis::energy_report_lines(&report));
    Ok(())
}

/// Run both analyses side by side and print discovery first
pub fn run_all(args: &LogArgs, config: &AnalysisConfig) -> Result<()> {
    let source = args.source();
    let (discovery, energy) = rayon::join(
        || analysis::analyze_discovery(&args.logfile, source, config),
        || analysis::analyze_energy(&args.logfile, source, config),
    );

    let discovery = discovery.wrap_err("Discovery rate analysis failed")?;
    let energy = energy.wrap_err("Duty cycle analysis failed")?;

    analysis::print_report(&analysis::discovery_report_lines(&discovery));
    analysis::print_report(&analysis::energy_report_lines(&energy));
    Ok(())
}
