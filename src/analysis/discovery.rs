//! Neighbor-discovery rate analysis.
//!
//! Phase 1 folds every `Epoch <n> finished Num NBR <m>` line into a
//! per-node state. Phase 2 compares each node's neighbor total against the
//! best it could have done, `(network_size - 1) * epochs`.

use std::io::BufRead;
use std::path::Path;

use super::log_parser::{open_log, scan_lines, LogPatterns};
use super::stats::SummaryStatistics;
use super::types::*;
use crate::config::AnalysisConfig;

/// Phase 1 accumulator
#[derive(Debug, Default)]
pub struct DiscoveryAggregator {
    nodes: NodeSet<NodeDiscoveryState>,
    first_timestamp: Option<Timestamp>,
}

impl DiscoveryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: DiscoveryRecord) {
        let state = self.nodes.entry(record.self_id);
        state.record(record.epoch_num, record.num_nbr);
        state.saturated |= record.saturated;
        if self.first_timestamp.is_none() {
            self.first_timestamp = Some(record.timestamp);
        }
    }

    pub fn nodes(&self) -> &NodeSet<NodeDiscoveryState> {
        &self.nodes
    }

    pub fn first_timestamp(&self) -> Option<&Timestamp> {
        self.first_timestamp.as_ref()
    }
}

/// Theoretical maximum and discovery rate (percent) for one node
pub fn discovery_rate(
    state: &NodeDiscoveryState,
    network_size: usize,
) -> (u128, Result<f64, Undefined>) {
    let available_nbrs = network_size.saturating_sub(1) as u128;
    let theoretical_max = available_nbrs * state.epochs();
    if theoretical_max == 0 {
        return (theoretical_max, Err(Undefined::SingleNodeNetwork));
    }
    let rate = state.total_nbr as f64 / theoretical_max as f64 * 100.0;
    (theoretical_max, Ok(rate))
}

/// Phase 2: per-node rates in ascending id order plus their summary.
///
/// Nodes with an undefined rate are reported but left out of the summary.
pub fn summarize(
    nodes: &NodeSet<NodeDiscoveryState>,
    network_size: usize,
) -> (Vec<NodeDiscoveryResult>, Option<SummaryStatistics>) {
    let results: Vec<NodeDiscoveryResult> = nodes
        .iter()
        .map(|state| {
            let (theoretical_max, rate) = discovery_rate(state, network_size);
            let result = NodeDiscoveryResult {
                self_id: state.self_id,
                total_nbr: state.total_nbr,
                sample_sum: state.sample_sum(),
                epochs: state.epochs(),
                theoretical_max,
                rate,
                saturated: state.saturated,
            };
            match result.rate {
                Err(reason) => {
                    log::warn!("Node {}: discovery rate undefined ({})", state.self_id, reason)
                }
                Ok(rate) if result.exceeds_max() => log::warn!(
                    "Node {}: discovery rate {:.2}% exceeds the theoretical maximum",
                    state.self_id,
                    rate
                ),
                Ok(_) => {}
            }
            result
        })
        .collect();

    let rates: Vec<f64> = results.iter().filter_map(|r| r.rate.ok()).collect();
    let summary = SummaryStatistics::from_values(&rates);

    (results, summary)
}

/// Run both phases over an already opened log
pub fn analyze_discovery_reader<R: BufRead>(
    reader: R,
    log_file: &Path,
    patterns: &LogPatterns,
    config: &AnalysisConfig,
) -> Result<DiscoveryReport, AnalysisError> {
    let mut aggregator = DiscoveryAggregator::new();

    let scan = scan_lines(reader, |line| match patterns.classify_discovery(line) {
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
        "Discovery scan: {} lines read, {} matched, {} skipped, {} nodes",
        scan.lines_read,
        scan.lines_matched,
        scan.lines_skipped(),
        aggregator.nodes().len()
    );

    let network_size = config.network_size.unwrap_or(aggregator.nodes().len());
    let (nodes, summary) = summarize(aggregator.nodes(), network_size);

    Ok(DiscoveryReport {
        log_file: log_file.to_path_buf(),
        source: patterns.source(),
        first_timestamp: aggregator.first_timestamp,
        network_size,
        node_ids: aggregator.nodes.ids(),
        nodes,
        summary,
        scan,
    })
}

/// Analyze the discovery rate of every node in `log_file`
pub fn analyze_discovery(
    log_file: &Path,
    source: LogSource,
    config: &AnalysisConfig,
) -> Result<DiscoveryReport, AnalysisError> {
    let reader = open_log(log_file)?;
    let patterns = LogPatterns::new(source, &config.testbed_platform)?;
    log::info!("Analyzing discovery rate in {} ({} log)", log_file.display(), source);
    analyze_discovery_reader(reader, log_file, &patterns, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(log: &str) -> DiscoveryReport {
        let patterns = LogPatterns::new(LogSource::Simulation, "firefly").unwrap();
        analyze_discovery_reader(
            log.as_bytes(),
            Path::new("test.log"),
            &patterns,
            &AnalysisConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rate_can_exceed_hundred_percent() {
        let report = run("1000 ID:1 App: Epoch 0 finished Num NBR 2\n\
                          1000 ID:2 App: Epoch 0 finished Num NBR 1\n");

        assert_eq!(report.network_size, 2);
        let node1 = &report.nodes[0];
        assert_eq!(node1.self_id, 1);
        assert_eq!(node1.theoretical_max, 1);
        assert_eq!(node1.rate, Ok(200.0));
        assert!(node1.exceeds_max());
        assert_eq!(report.nodes[1].rate, Ok(100.0));

        let summary = report.summary.unwrap();
        assert_eq!(summary.mean, 150.0);
        assert_eq!(summary.std_dev, 50.0);
        assert_eq!(summary.min, 100.0);
        assert_eq!(summary.max, 200.0);
    }

    #[test]
    fn test_last_epoch_line_wins() {
        let report = run("1 ID:1 Epoch 9 finished Num NBR 1\n\
                          2 ID:2 Epoch 0 finished Num NBR 1\n\
                          3 ID:1 Epoch 3 finished Num NBR 1\n");

        let node1 = &report.nodes[0];
        assert_eq!(node1.epochs, 4);
        assert_eq!(node1.theoretical_max, 4);
        assert_eq!(node1.total_nbr, 2);
        assert_eq!(node1.rate, Ok(50.0));
    }

    #[test]
    fn test_single_node_network_is_undefined() {
        let report = run("1 ID:5 Epoch 3 finished Num NBR 0\n");

        assert_eq!(report.nodes.len(), 1);
        assert_eq!(report.nodes[0].theoretical_max, 0);
        assert_eq!(report.nodes[0].rate, Err(Undefined::SingleNodeNetwork));
        assert!(report.summary.is_none());
    }

    #[test]
    fn test_network_size_override() {
        let patterns = LogPatterns::new(LogSource::Simulation, "firefly").unwrap();
        let config = AnalysisConfig {
            network_size: Some(5),
            ..AnalysisConfig::default()
        };
        let report = analyze_discovery_reader(
            "1 ID:5 Epoch 1 finished Num NBR 4\n".as_bytes(),
            Path::new("test.log"),
            &patterns,
            &config,
        )
        .unwrap();

        assert_eq!(report.network_size, 5);
        assert_eq!(report.nodes[0].theoretical_max, 8);
        assert_eq!(report.nodes[0].rate, Ok(50.0));
    }

    #[test]
    fn test_first_timestamp_and_counters() {
        let report = run("boot\n\
                          00:01.000 ID:2 Epoch 0 finished Num NBR 1\n\
                          00:01.500 ID:1 Epoch 0 finished Num NBR 1\n");

        assert_eq!(
            report.first_timestamp,
            Some(Timestamp::Simulation("00:01.000".to_string()))
        );
        assert_eq!(report.node_ids, vec![1, 2]);
        assert_eq!(report.scan.lines_read, 3);
        assert_eq!(report.scan.lines_matched, 2);
    }
}
