use serde::Deserialize;

use crate::analysis::DEFAULT_TESTBED_PLATFORM;

/// Analysis settings, optionally read from a YAML file.
///
/// ```yaml
/// testbed_platform: firefly
/// warmup_samples: 2
/// log_level: info
/// network_size: 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Hardware tag in testbed source tags (`INFO:<platform>.<id>: <id>.<platform> < b'...'`)
    pub testbed_platform: String,
    /// Energest samples numbered below this are warm-up values and ignored
    pub warmup_samples: u64,
    /// Log level used when none is given on the command line
    pub log_level: Option<String>,
    /// Node count for the discovery theoretical maximum (default: nodes seen in the log)
    pub network_size: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            testbed_platform: DEFAULT_TESTBED_PLATFORM.to_string(),
            warmup_samples: 2,
            log_level: None,
            network_size: None,
        }
    }
}

impl AnalysisConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.testbed_platform.is_empty() {
            return Err(ValidationError::InvalidPlatform(
                "testbed_platform cannot be empty".to_string(),
            ));
        }
        if !self
            .testbed_platform
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ValidationError::InvalidPlatform(format!(
                "testbed_platform '{}' may only contain letters, digits, '_' and '-'",
                self.testbed_platform
            )));
        }

        if self.network_size == Some(0) {
            return Err(ValidationError::InvalidNetworkSize(
                "network_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid testbed platform: {0}")]
    InvalidPlatform(String),
    #[error("Invalid network size: {0}")]
    InvalidNetworkSize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.testbed_platform, "firefly");
        assert_eq!(config.warmup_samples, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AnalysisConfig = serde_yaml::from_str("network_size: 9\n").unwrap();
        assert_eq!(config.network_size, Some(9));
        assert_eq!(config.warmup_samples, 2);
        assert_eq!(config.testbed_platform, "firefly");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<AnalysisConfig, _> = serde_yaml::from_str("warmup: 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values() {
        let config = AnalysisConfig {
            testbed_platform: "fire fly".to_string(),
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidPlatform(_))));

        let config = AnalysisConfig {
            network_size: Some(0),
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidNetworkSize(_))));
    }
}
