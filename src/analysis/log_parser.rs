//! Line classification for Cooja and testbed logs.
//!
//! Each log line is tried against one compiled pattern per metric. Lines
//! that do not match are skipped silently; a typical log is mostly noise.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDateTime;
use regex::{Captures, Regex};

use super::types::*;

/// Default hardware tag used by the testbed collector
pub const DEFAULT_TESTBED_PLATFORM: &str = "firefly";

// Numeric captures use `[0-9]`: `\d` also matches non-ASCII digits, which
// `str::parse` rejects.

/// Match: "<time>\tID:<n>\t" at the start of a Cooja line
const SIMULATION_RECORD_PATTERN: &str = r"^(?P<time>[\w:.]+)\s+ID:(?P<self_id>[0-9]+)\s+";

/// Match: "Epoch <n> finished Num NBR <m>"
const DISCOVERY_PAYLOAD: &str =
    r"Epoch (?P<epoch_num>[0-9]+) finished Num NBR (?P<num_nbr>[0-9]+)";

/// Match: "Energest: <cnt> <cpu> <lpm> <tx> <rx>"
const ENERGY_PAYLOAD: &str = r"Energest: (?P<cnt>[0-9]+) (?P<cpu>[0-9]+) (?P<lpm>[0-9]+) (?P<tx>[0-9]+) (?P<rx>[0-9]+)";

/// Testbed timestamp after the millisecond comma has been turned into a dot
const TESTBED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Match: "[YYYY-MM-DD HH:MM:SS,mmm] INFO:<platform>.<n>: <k>.<platform> < b'"
fn testbed_record_pattern(platform: &str) -> String {
    let platform = regex::escape(platform);
    format!(
        r"^\[(?P<time>.{{23}})\] INFO:{p}\.(?P<self_id>[0-9]+): [0-9]+\.{p} < b'",
        p = platform
    )
}

/// Compiled record patterns for one log source
#[derive(Debug, Clone)]
pub struct LogPatterns {
    source: LogSource,
    discovery: Regex,
    energy: Regex,
}

impl LogPatterns {
    /// Compile the discovery and energy patterns for `source`.
    ///
    /// `platform` only matters for testbed logs, where it names the
    /// per-node source tag (`INFO:firefly.12: 12.firefly < b'...'`).
    pub fn new(source: LogSource, platform: &str) -> Result<Self, regex::Error> {
        let (discovery, energy) = match source {
            LogSource::Simulation => (
                format!("{}.*{}", SIMULATION_RECORD_PATTERN, DISCOVERY_PAYLOAD),
                format!("{}.*{}", SIMULATION_RECORD_PATTERN, ENERGY_PAYLOAD),
            ),
            LogSource::Testbed => {
                let prefix = testbed_record_pattern(platform);
                (
                    format!("{}.*{}", prefix, DISCOVERY_PAYLOAD),
                    format!("{}.*{}'", prefix, ENERGY_PAYLOAD),
                )
            }
        };

        Ok(Self {
            source,
            discovery: Regex::new(&discovery)?,
            energy: Regex::new(&energy)?,
        })
    }

    pub fn source(&self) -> LogSource {
        self.source
    }

    /// Extract a discovery record, or `None` if the line is not one.
    ///
    /// Numeric fields never reject a line; oversized values are clamped
    /// and the record is flagged.
    pub fn classify_discovery(&self, line: &str) -> Option<DiscoveryRecord> {
        let caps = self.discovery.captures(line)?;
        let timestamp = self.parse_time(&caps)?;
        let mut fields = NumericFields::new(&caps, line);
        Some(DiscoveryRecord {
            timestamp,
            self_id: fields.get("self_id"),
            epoch_num: fields.get("epoch_num"),
            num_nbr: fields.get("num_nbr"),
            saturated: fields.saturated,
        })
    }

    /// Extract an energest record, or `None` if the line is not one
    pub fn classify_energy(&self, line: &str) -> Option<EnergyRecord> {
        let caps = self.energy.captures(line)?;
        let timestamp = self.parse_time(&caps)?;
        let mut fields = NumericFields::new(&caps, line);
        Some(EnergyRecord {
            timestamp,
            self_id: fields.get("self_id"),
            sample_count: fields.get("cnt"),
            cpu: fields.get("cpu"),
            lpm: fields.get("lpm"),
            tx: fields.get("tx"),
            rx: fields.get("rx"),
            saturated: fields.saturated,
        })
    }

    fn parse_time(&self, caps: &Captures<'_>) -> Option<Timestamp> {
        let raw = caps.name("time")?.as_str();
        match self.source {
            LogSource::Simulation => Some(Timestamp::Simulation(raw.to_string())),
            LogSource::Testbed => parse_testbed_timestamp(raw).map(Timestamp::Testbed),
        }
    }
}

/// Parse a testbed timestamp.
/// Format: "2023-05-04 10:21:07,512"
pub fn parse_testbed_timestamp(s: &str) -> Option<NaiveDateTime> {
    let normalized = s.replacen(',', ".", 1);
    match NaiveDateTime::parse_from_str(&normalized, TESTBED_TIME_FORMAT) {
        Ok(dt) => Some(dt),
        Err(e) => {
            log::debug!("Unparseable testbed timestamp {:?}: {}", s, e);
            None
        }
    }
}

/// Digit captures of one matched line
struct NumericFields<'c, 'h> {
    caps: &'c Captures<'h>,
    line: &'h str,
    saturated: bool,
}

impl<'c, 'h> NumericFields<'c, 'h> {
    fn new(caps: &'c Captures<'h>, line: &'h str) -> Self {
        Self {
            caps,
            line,
            saturated: false,
        }
    }

    /// Value of capture `name`, clamped to `u64::MAX` when it does not fit
    fn get(&mut self, name: &str) -> u64 {
        let text = self.caps.name(name).map_or("0", |m| m.as_str());
        match text.parse() {
            Ok(value) => value,
            Err(e) => {
                log::warn!(
                    "Field {} value {} clamped to {} ({}): {}",
                    name,
                    text,
                    u64::MAX,
                    e,
                    self.line
                );
                self.saturated = true;
                u64::MAX
            }
        }
    }
}

/// Check that `path` names an existing regular file
pub fn validate_log_file(path: &Path) -> Result<(), AnalysisError> {
    if !path.exists() {
        return Err(AnalysisError::LogFileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(AnalysisError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Validate and open a log file for line-by-line reading
pub fn open_log(path: &Path) -> Result<BufReader<File>, AnalysisError> {
    validate_log_file(path)?;
    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::with_capacity(64 * 1024, file))
}

/// Feed every line of `reader` to `on_line` in file order.
///
/// `on_line` returns whether the line matched. Lines that are not valid
/// UTF-8 are counted and skipped; any other read error aborts the scan.
pub fn scan_lines<R, F>(mut reader: R, mut on_line: F) -> std::io::Result<ScanStats>
where
    R: BufRead,
    F: FnMut(&str) -> bool,
{
    let mut stats = ScanStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines_read += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(l) => l.trim_end_matches(['\n', '\r']),
            Err(_) => {
                stats.lines_undecodable += 1;
                log::debug!("Skipping non UTF-8 line {}", stats.lines_read);
                continue;
            }
        };

        if on_line(line) {
            stats.lines_matched += 1;
        }
    }

    Ok(stats)
}
