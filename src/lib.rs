//! # ndstats - Neighbor-discovery and energy analysis for Contiki experiments
//!
//! This library extracts two per-node metrics from the text logs written by a
//! neighbor-discovery primitive running either in the Cooja simulator or on a
//! hardware testbed:
//!
//! - **Discovery rate**: neighbor observations a node reported at the end of
//!   each epoch, relative to the `(nodes - 1) * epochs` it could have made.
//! - **Duty cycle**: share of CPU + low-power-mode time the radio spent
//!   transmitting or receiving, from periodic `Energest:` samples.
//!
//! Each metric is summarized across nodes as mean, population standard
//! deviation, minimum and maximum.
//!
//! ## Architecture
//!
//! - `analysis`: line classification, per-node aggregation, statistics and
//!   report formatting
//! - `config` / `config_loader`: optional YAML analysis settings
//! - `cli`: argument handling shared by the `ndstats`, `discovery` and
//!   `energest-stats` binaries
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use ndstats::analysis::{self, LogSource};
//! use ndstats::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! let report = analysis::analyze_discovery(Path::new("test.log"), LogSource::Simulation, &config)?;
//! analysis::print_report(&analysis::discovery_report_lines(&report));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library functions return typed `thiserror` errors; the binaries wrap them
//! with `color_eyre` context. A missing or non-regular log file makes every
//! binary exit with status 1.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod config_loader;
