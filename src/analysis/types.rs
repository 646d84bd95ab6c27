//! Core data types for neighbor-discovery and energest log analysis.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use super::stats::SummaryStatistics;

/// Node identifier as printed in the `ID:<n>` / `<platform>.<n>` tag
pub type NodeId = u64;

/// Which log format is active for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogSource {
    /// Cooja simulator output: `<time>\tID:<n>\t<message>`
    #[default]
    Simulation,
    /// Testbed collector output: `[YYYY-MM-DD HH:MM:SS,mmm] INFO:<platform>.<n>: ...`
    Testbed,
}

impl LogSource {
    pub fn from_testbed_flag(testbed: bool) -> Self {
        if testbed {
            LogSource::Testbed
        } else {
            LogSource::Simulation
        }
    }

    /// Human-readable banner printed under the log file name
    pub fn banner(&self) -> &'static str {
        match self {
            LogSource::Simulation => "Cooja simulation",
            LogSource::Testbed => "Testbed experiment",
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSource::Simulation => write!(f, "simulation"),
            LogSource::Testbed => write!(f, "testbed"),
        }
    }
}

/// Timestamp of a matched line.
///
/// Simulator timestamps are opaque tokens and are kept verbatim; testbed
/// timestamps are parsed so the experiment start can be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    Simulation(String),
    Testbed(NaiveDateTime),
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Simulation(raw) => write!(f, "{}", raw),
            Timestamp::Testbed(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.3f")),
        }
    }
}

/// One `Epoch <n> finished Num NBR <m>` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRecord {
    pub timestamp: Timestamp,
    pub self_id: NodeId,
    pub epoch_num: u64,
    pub num_nbr: u64,
    /// A numeric field did not fit in `u64` and was clamped to `u64::MAX`
    pub saturated: bool,
}

/// One `Energest: <cnt> <cpu> <lpm> <tx> <rx>` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyRecord {
    pub timestamp: Timestamp,
    pub self_id: NodeId,
    pub sample_count: u64,
    pub cpu: u64,
    pub lpm: u64,
    pub tx: u64,
    pub rx: u64,
    /// A numeric field did not fit in `u64` and was clamped to `u64::MAX`
    pub saturated: bool,
}

/// Per-node accumulator created on the first sighting of a node id
pub trait NodeState {
    fn new(self_id: NodeId) -> Self;
}

/// Discovery accumulation for a single node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDiscoveryState {
    pub self_id: NodeId,
    /// Epoch number of the most recently matched line (not the maximum)
    pub latest_epoch_num: u64,
    /// Neighbor counts in arrival order
    pub num_nbr_samples: Vec<u64>,
    pub total_nbr: u128,
    /// At least one folded line carried a clamped field
    pub saturated: bool,
}

impl NodeState for NodeDiscoveryState {
    fn new(self_id: NodeId) -> Self {
        Self {
            self_id,
            latest_epoch_num: 0,
            num_nbr_samples: Vec::new(),
            total_nbr: 0,
            saturated: false,
        }
    }
}

impl NodeDiscoveryState {
    /// Fold one epoch report into the node.
    ///
    /// The epoch counter is overwritten by every line, so an out-of-order
    /// line can move it backwards.
    pub fn record(&mut self, epoch_num: u64, num_nbr: u64) {
        self.latest_epoch_num = epoch_num;
        self.num_nbr_samples.push(num_nbr);
        self.total_nbr += u128::from(num_nbr);
    }

    /// Sum recomputed from the stored samples; always equals `total_nbr`
    pub fn sample_sum(&self) -> u128 {
        self.num_nbr_samples.iter().map(|&n| u128::from(n)).sum()
    }

    /// Elapsed epochs, counting epoch 0
    pub fn epochs(&self) -> u128 {
        u128::from(self.latest_epoch_num) + 1
    }
}

/// Energest accumulation for a single node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEnergyState {
    pub self_id: NodeId,
    pub cpu_total: u128,
    pub lpm_total: u128,
    pub tx_total: u128,
    pub rx_total: u128,
    /// Records seen for this node, qualifying or not
    pub records_seen: usize,
    /// Records that passed the warm-up filter
    pub records_accumulated: usize,
    pub last_sample_count: Option<u64>,
    /// Set once the sample counter was seen going backwards
    pub reset_detected: bool,
    /// At least one folded line carried a clamped field
    pub saturated: bool,
}

impl NodeState for NodeEnergyState {
    fn new(self_id: NodeId) -> Self {
        Self {
            self_id,
            cpu_total: 0,
            lpm_total: 0,
            tx_total: 0,
            rx_total: 0,
            records_seen: 0,
            records_accumulated: 0,
            last_sample_count: None,
            reset_detected: false,
            saturated: false,
        }
    }
}

impl NodeEnergyState {
    /// Fold one energest sample into the node.
    ///
    /// Samples numbered below `warmup_samples` are counted but contribute
    /// nothing to the tick totals.
    pub fn record(&mut self, record: &EnergyRecord, warmup_samples: u64) {
        if let Some(previous) = self.last_sample_count {
            if record.sample_count < previous && !self.reset_detected {
                log::warn!(
                    "Node {} reset: energest sample counter went from {} to {}",
                    self.self_id,
                    previous,
                    record.sample_count
                );
                self.reset_detected = true;
            }
        }
        self.last_sample_count = Some(record.sample_count);
        self.records_seen += 1;
        self.saturated |= record.saturated;

        if record.sample_count >= warmup_samples {
            self.cpu_total += u128::from(record.cpu);
            self.lpm_total += u128::from(record.lpm);
            self.tx_total += u128::from(record.tx);
            self.rx_total += u128::from(record.rx);
            self.records_accumulated += 1;
        }
    }

    /// CPU plus low-power-mode ticks
    pub fn active_ticks(&self) -> u128 {
        self.cpu_total + self.lpm_total
    }

    /// Transmit plus receive ticks
    pub fn radio_ticks(&self) -> u128 {
        self.tx_total + self.rx_total
    }
}

/// All nodes seen during one analysis run, keyed by id.
///
/// Iteration is always in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSet<S> {
    nodes: BTreeMap<NodeId, S>,
}

impl<S> Default for NodeSet<S> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }
}

impl<S: NodeState> NodeSet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// State for `self_id`, created on first sight
    pub fn entry(&mut self, self_id: NodeId) -> &mut S {
        self.nodes.entry(self_id).or_insert_with(|| {
            log::debug!("First record for node {}", self_id);
            S::new(self_id)
        })
    }

    pub fn get(&self, self_id: NodeId) -> Option<&S> {
        self.nodes.get(&self_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn iter(&self) -> btree_map::Values<'_, NodeId, S> {
        self.nodes.values()
    }
}

/// Line counters from the scan pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub lines_read: usize,
    pub lines_matched: usize,
    /// Lines that were not valid UTF-8
    pub lines_undecodable: usize,
}

impl ScanStats {
    pub fn lines_skipped(&self) -> usize {
        self.lines_read - self.lines_matched
    }
}

/// Why a per-node ratio has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Undefined {
    /// Fewer than two nodes, so there is nobody to discover
    SingleNodeNetwork,
    /// No qualifying energest ticks were accumulated
    NoActiveTime,
}

impl fmt::Display for Undefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Undefined::SingleNodeNetwork => write!(f, "single-node network"),
            Undefined::NoActiveTime => write!(f, "no qualifying energest samples"),
        }
    }
}

/// Derived discovery figures for one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDiscoveryResult {
    pub self_id: NodeId,
    pub total_nbr: u128,
    pub sample_sum: u128,
    pub epochs: u128,
    pub theoretical_max: u128,
    /// Discovery rate in percent, unclamped
    pub rate: Result<f64, Undefined>,
    pub saturated: bool,
}

impl NodeDiscoveryResult {
    pub fn exceeds_max(&self) -> bool {
        matches!(self.rate, Ok(rate) if rate > 100.0)
    }
}

/// Derived duty-cycle figures for one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEnergyResult {
    pub self_id: NodeId,
    pub cpu_total: u128,
    pub lpm_total: u128,
    pub tx_total: u128,
    pub rx_total: u128,
    /// Radio duty cycle in percent
    pub duty_cycle: Result<f64, Undefined>,
    pub saturated: bool,
}

/// Everything the discovery report prints
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryReport {
    pub log_file: PathBuf,
    pub source: LogSource,
    pub first_timestamp: Option<Timestamp>,
    /// Node count used for the theoretical maximum
    pub network_size: usize,
    pub node_ids: Vec<NodeId>,
    pub nodes: Vec<NodeDiscoveryResult>,
    pub summary: Option<SummaryStatistics>,
    pub scan: ScanStats,
}

/// Everything the duty-cycle report prints
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReport {
    pub log_file: PathBuf,
    pub source: LogSource,
    pub first_timestamp: Option<Timestamp>,
    pub nodes: Vec<NodeEnergyResult>,
    pub summary: Option<SummaryStatistics>,
    /// Nodes whose energest counter restarted
    pub reset_nodes: Vec<NodeId>,
    pub scan: ScanStats,
}

/// Errors raised before or while reading a log file
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("The logfile argument {} does not exist", path.display())]
    LogFileNotFound { path: PathBuf },

    #[error("The logfile argument {} is not a file", path.display())]
    NotAFile { path: PathBuf },

    #[error("Failed to read log file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid record pattern: {0}")]
    Pattern(#[from] regex::Error),
}
