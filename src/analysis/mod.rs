//! Neighbor-discovery and energest analysis for Cooja and testbed logs.
//!
//! Both analyzers run the same two phases: scan the whole log folding
//! matched lines into per-node state, then reduce the final node set into a
//! report.

pub mod types;
pub mod log_parser;
pub mod stats;
pub mod discovery;
pub mod energy;
pub mod report;

pub use types::*;
pub use log_parser::{LogPatterns, DEFAULT_TESTBED_PLATFORM};
pub use stats::SummaryStatistics;
pub use discovery::analyze_discovery;
pub use energy::analyze_energy;
pub use report::{discovery_report_lines, energy_report_lines, print_report};
