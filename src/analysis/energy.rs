//! Energest duty-cycle analysis.

use std::io::BufRead;
use std::path::Path;

use super::log_parser::{open_log, scan_lines, LogPatterns};
use super::stats::SummaryStatistics;
use super::types::*;
use crate::config::AnalysisConfig;

/// Phase 1 accumulator
#[derive(Debug)]
pub struct EnergyAggregator {
    nodes: NodeSet<NodeEnergyState>,
    first_timestamp: Option<Timestamp>,
    warmup_samples: u64,
}

impl EnergyAggregator {
    pub fn new(warmup_samples: u64) -> Self {
        Self {
            nodes: NodeSet::new(),
            first_timestamp: None,
            warmup_samples,
        }
    }

    pub fn observe(&mut self, record: EnergyRecord) {
        self.nodes
            .entry(record.self_id)
            .record(&record, self.warmup_samples);
        if self.first_timestamp.is_none() {
            self.first_timestamp = Some(record.timestamp);
        }
    }

    pub fn nodes(&self) -> &NodeSet<NodeEnergyState> {
        &self.nodes
    }
}

/// Radio duty cycle in percent: `100 * (tx + rx) / (cpu + lpm)`
pub fn duty_cycle(state: &NodeEnergyState) -> Result<f64, Undefined> {
    let active = state.active_ticks();
    if active == 0 {
        return Err(Undefined::NoActiveTime);
    }
    Ok(100.0 * state.radio_ticks() as f64 / active as f64)
}

/// Phase 2: per-node duty cycles in ascending id order plus their summary
pub fn summarize(
    nodes: &NodeSet<NodeEnergyState>,
) -> (Vec<NodeEnergyResult>, Option<SummaryStatistics>) {
    let results: Vec<NodeEnergyResult> = nodes
        .iter()
        .map(|state| {
            let cycle = duty_cycle(state);
            if let Err(reason) = cycle {
                log::warn!("Node {}: duty cycle undefined ({})", state.self_id, reason);
            }
            NodeEnergyResult {
                self_id: state.self_id,
                cpu_total: state.cpu_total,
                lpm_total: state.lpm_total,
                tx_total: state.tx_total,
                rx_total: state.rx_total,
                duty_cycle: cycle,
                saturated: state.saturated,
            }
        })
        .collect();

    let cycles: Vec<f64> = results.iter().filter_map(|r| r.duty_cycle.ok()).collect();
    (results, SummaryStatistics::from_values(&cycles))
}

/// Run both phases over an already opened log
pub fn analyze_energy_reader<R: BufRead>(
    reader: R,
    log_file: &Path,
    patterns: &LogPatterns,
    config: &AnalysisConfig,
) -> Result<EnergyReport, AnalysisError> {
    let mut aggregator = EnergyAggregator::new(config.warmup_samples);

    let scan = scan_lines(reader, |line| match patterns.classify_energy(line) {
        Some(record) => {
            aggregator.observe(record);
            true
        }
        None => false,
    })
    .map_err(|source| AnalysisError::Io {
        path: log_file.to_path_buf(),
        source,
    })?;

    log::info!(
        "Energest scan: {} lines read, {} matched, {} skipped, {} nodes",
        scan.lines_read,
        scan.lines_matched,
        scan.lines_skipped(),
        aggregator.nodes().len()
    );

    let (nodes, summary) = summarize(aggregator.nodes());
    let reset_nodes: Vec<NodeId> = aggregator
        .nodes()
        .iter()
        .filter(|state| state.reset_detected)
        .map(|state| state.self_id)
        .collect();

    Ok(EnergyReport {
        log_file: log_file.to_path_buf(),
        source: patterns.source(),
        first_timestamp: aggregator.first_timestamp,
        nodes,
        summary,
        reset_nodes,
        scan,
    })
}

/// Analyze the radio duty cycle of every node in `log_file`
pub fn analyze_energy(
    log_file: &Path,
    source: LogSource,
    config: &AnalysisConfig,
) -> Result<EnergyReport, AnalysisError> {
    let reader = open_log(log_file)?;
    let patterns = LogPatterns::new(source, &config.testbed_platform)?;
    log::info!("Analyzing duty cycle in {} ({} log)", log_file.display(), source);
    analyze_energy_reader(reader, log_file, &patterns, config)
}
