use crate::config::AnalysisConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and validate analysis settings from a YAML file
pub fn load_config(config_path: &Path) -> Result<AnalysisConfig> {
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file '{}'", config_path.display()))?;

    let config: AnalysisConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file '{}'", config_path.display()))?;

    config.validate()?;

    info!("Loaded analysis configuration from {:?}", config_path);
    Ok(config)
}

/// Settings from `config_path` if given, otherwise the defaults
pub fn resolve_config(config_path: Option<&Path>) -> Result<AnalysisConfig> {
    match config_path {
        Some(path) => load_config(path),
        None => Ok(AnalysisConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "testbed_platform: m3\nwarmup_samples: 1").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.testbed_platform, "m3");
        assert_eq!(config.warmup_samples, 1);
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "testbed_platform: \"\"").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(load_config(Path::new("/nonexistent/ndstats.yaml")).is_err());
    }

    #[test]
    fn test_resolve_default() {
        assert_eq!(resolve_config(None).unwrap(), AnalysisConfig::default());
    }
}
