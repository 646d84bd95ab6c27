//! Human-readable reports for discovery and duty-cycle analysis.
//!
//! Formatting only: every figure is computed before it reaches this module,
//! and rounding happens here for display.

use super::stats::SummaryStatistics;
use super::types::*;

/// Appended to node lines whose input had a field clamped to `u64::MAX`
const SATURATED_NOTE: &str = " (saturated input)";

/// Banner lines shared by both reports
fn header_lines(
    log_file: &std::path::Path,
    source: LogSource,
    first_timestamp: Option<&Timestamp>,
) -> Vec<String> {
    let mut lines = vec![
        format!("Logfile: {}", log_file.display()),
        source.banner().to_string(),
        String::new(),
    ];

    if source == LogSource::Testbed {
        match first_timestamp {
            Some(ts) => lines.push(format!("Time: {}", ts)),
            None => lines.push("Time: n/a".to_string()),
        }
    }

    lines
}

/// Statistics block with a fixed number of decimals
fn statistics_lines(
    label: &str,
    summary: Option<&SummaryStatistics>,
    precision: usize,
) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("----- {} Overall Statistics -----", label),
        String::new(),
    ];

    match summary {
        Some(s) => {
            lines.push(format!("Average {}: {:.*}%", label, precision, s.mean));
            lines.push(format!("Standard Deviation: {:.*}", precision, s.std_dev));
            lines.push(format!("Minimum: {:.*}%", precision, s.min));
            lines.push(format!("Maximum: {:.*}%", precision, s.max));
        }
        None => lines.push(format!("No data: no node has a defined {}", label.to_lowercase())),
    }
    lines.push(String::new());

    lines
}

fn id_list(ids: &[NodeId]) -> String {
    let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("[{}]", ids.join(", "))
}

/// Lines of the discovery-rate report
pub fn discovery_report_lines(report: &DiscoveryReport) -> Vec<String> {
    let mut lines = header_lines(&report.log_file, report.source, report.first_timestamp.as_ref());

    lines.push(format!("Nodes: {} {}", report.node_ids.len(), id_list(&report.node_ids)));
    if report.network_size != report.node_ids.len() {
        lines.push(format!("Network size: {}", report.network_size));
    }

    for node in &report.nodes {
        let prefix = format!(
            "Node {}: {} ({}) out of {} on {} epochs",
            node.self_id, node.total_nbr, node.sample_sum, node.theoretical_max, node.epochs
        );
        let mut line = match node.rate {
            Ok(rate) if node.exceeds_max() => {
                format!("{} = {:.2}% (exceeds theoretical maximum)", prefix, rate)
            }
            Ok(rate) => format!("{} = {:.2}%", prefix, rate),
            Err(reason) => format!("{} = n/a ({})", prefix, reason),
        };
        if node.saturated {
            line.push_str(SATURATED_NOTE);
        }
        lines.push(line);
    }

    lines.extend(statistics_lines("Discovery Rate", report.summary.as_ref(), 2));

    lines
}

/// Lines of the duty-cycle report
pub fn energy_report_lines(report: &EnergyReport) -> Vec<String> {
    let mut lines = header_lines(&report.log_file, report.source, report.first_timestamp.as_ref());

    for node in &report.nodes {
        let totals = format!(
            "(cpu {}, lpm {}, tx {}, rx {})",
            node.cpu_total, node.lpm_total, node.tx_total, node.rx_total
        );
        let mut line = match node.duty_cycle {
            Ok(dc) => format!("Node {}:  Duty Cycle: {:.3}% {}", node.self_id, dc, totals),
            Err(reason) => format!("Node {}:  Duty Cycle: n/a ({}) {}", node.self_id, reason, totals),
        };
        if node.saturated {
            line.push_str(SATURATED_NOTE);
        }
        lines.push(line);
    }

    lines.extend(statistics_lines("Duty Cycle", report.summary.as_ref(), 3));

    if !report.reset_nodes.is_empty() {
        lines.push("----- WARNING -----".to_string());
        lines.push(format!(
            "{} nodes reset during the simulation {}",
            report.reset_nodes.len(),
            id_list(&report.reset_nodes)
        ));
        lines.push(String::new());
    }

    lines
}

/// Print report lines to stdout
pub fn print_report(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn discovery_report() -> DiscoveryReport {
        DiscoveryReport {
            log_file: PathBuf::from("results/test_2_s10/test.log"),
            source: LogSource::Simulation,
            first_timestamp: Some(Timestamp::Simulation("1000".to_string())),
            network_size: 2,
            node_ids: vec![1, 2],
            nodes: vec![
                NodeDiscoveryResult {
                    self_id: 1,
                    total_nbr: 2,
                    sample_sum: 2,
                    epochs: 1,
                    theoretical_max: 1,
                    rate: Ok(200.0),
                    saturated: false,
                },
                NodeDiscoveryResult {
                    self_id: 2,
                    total_nbr: 1,
                    sample_sum: 1,
                    epochs: 1,
                    theoretical_max: 1,
                    rate: Ok(100.0),
                    saturated: false,
                },
            ],
            summary: SummaryStatistics::from_values(&[200.0, 100.0]),
            scan: ScanStats::default(),
        }
    }

    #[test]
    fn test_discovery_report_layout() {
        let lines = discovery_report_lines(&discovery_report());
        assert_eq!(
            lines,
            vec![
                "Logfile: results/test_2_s10/test.log",
                "Cooja simulation",
                "",
                "Nodes: 2 [1, 2]",
                "Node 1: 2 (2) out of 1 on 1 epochs = 200.00% (exceeds theoretical maximum)",
                "Node 2: 1 (1) out of 1 on 1 epochs = 100.00%",
                "",
                "----- Discovery Rate Overall Statistics -----",
                "",
                "Average Discovery Rate: 150.00%",
                "Standard Deviation: 50.00",
                "Minimum: 100.00%",
                "Maximum: 200.00%",
                "",
            ]
        );
    }

    #[test]
    fn test_testbed_report_has_time_line() {
        let mut report = discovery_report();
        report.source = LogSource::Testbed;
        report.first_timestamp = None;
        let lines = discovery_report_lines(&report);
        assert_eq!(lines[1], "Testbed experiment");
        assert_eq!(lines[3], "Time: n/a");
    }

    #[test]
    fn test_empty_energy_report() {
        let report = EnergyReport {
            log_file: PathBuf::from("empty.log"),
            source: LogSource::Simulation,
            first_timestamp: None,
            nodes: Vec::new(),
            summary: None,
            reset_nodes: Vec::new(),
            scan: ScanStats::default(),
        };
        let lines = energy_report_lines(&report);
        assert!(lines.contains(&"No data: no node has a defined duty cycle".to_string()));
        assert!(!lines.iter().any(|l| l.contains("WARNING")));
    }

    #[test]
    fn test_energy_node_lines() {
        let report = EnergyReport {
            log_file: PathBuf::from("test_dc.log"),
            source: LogSource::Simulation,
            first_timestamp: None,
            nodes: vec![
                NodeEnergyResult {
                    self_id: 1,
                    cpu_total: 20,
                    lpm_total: 10,
                    tx_total: 4,
                    rx_total: 4,
                    duty_cycle: Ok(100.0 * 8.0 / 30.0),
                    saturated: false,
                },
                NodeEnergyResult {
                    self_id: 2,
                    cpu_total: 0,
                    lpm_total: 0,
                    tx_total: 0,
                    rx_total: 0,
                    duty_cycle: Err(Undefined::NoActiveTime),
                    saturated: true,
                },
            ],
            summary: SummaryStatistics::from_values(&[100.0 * 8.0 / 30.0]),
            reset_nodes: vec![2],
            scan: ScanStats::default(),
        };
        let lines = energy_report_lines(&report);
        assert_eq!(lines[3], "Node 1:  Duty Cycle: 26.667% (cpu 20, lpm 10, tx 4, rx 4)");
        assert_eq!(
            lines[4],
            "Node 2:  Duty Cycle: n/a (no qualifying energest samples) (cpu 0, lpm 0, tx 0, rx 0) (saturated input)"
        );
        assert!(lines.contains(&"Average Duty Cycle: 26.667%".to_string()));
        assert!(lines.contains(&"Standard Deviation: 0.000".to_string()));
        assert!(lines.contains(&"1 nodes reset during the simulation [2]".to_string()));
    }
}
