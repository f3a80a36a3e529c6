//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::BenchConfig;
use std::path::Path;

/// File name looked up inside the testbench directory.
pub const CONFIG_FILE_NAME: &str = "spicetb.toml";

/// Loads and validates a `spicetb.toml` configuration from a testbench directory.
///
/// Reads `<bench_dir>/spicetb.toml`, parses it, and validates the values.
pub fn load_config(bench_dir: &Path) -> Result<BenchConfig, ConfigError> {
    let config_path = bench_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `spicetb.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<BenchConfig, ConfigError> {
    let config: BenchConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that voltages, fractions, and run lengths are usable.
fn validate_config(config: &BenchConfig) -> Result<(), ConfigError> {
    let supply = &config.supply;
    if !(supply.vdd > 0.0) {
        return Err(ConfigError::ValidationError(format!(
            "supply.vdd must be positive, got {}",
            supply.vdd
        )));
    }
    if !(supply.threshold_fraction > 0.0 && supply.threshold_fraction < 1.0) {
        return Err(ConfigError::ValidationError(format!(
            "supply.threshold_fraction must lie in (0, 1), got {}",
            supply.threshold_fraction
        )));
    }
    let debounce = &config.debounce;
    if !(debounce.low < debounce.high) {
        return Err(ConfigError::ValidationError(format!(
            "debounce.low ({}) must be below debounce.high ({})",
            debounce.low, debounce.high
        )));
    }
    if debounce.min_run == 0 {
        return Err(ConfigError::ValidationError(
            "debounce.min_run must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DebounceConfig, SupplyConfig};
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[supply]
vdd = 3.3
threshold_fraction = 0.5

[debounce]
low = 1.0
high = 2.0
min_run = 5

[report]
every_sample = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(
            config.supply,
            SupplyConfig {
                vdd: 3.3,
                threshold_fraction: 0.5
            }
        );
        assert_eq!(
            config.debounce,
            DebounceConfig {
                low: 1.0,
                high: 2.0,
                min_run: 5
            }
        );
        assert!(config.report.every_sample);
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn non_positive_vdd_rejected() {
        let err = load_config_from_str("[supply]\nvdd = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn threshold_fraction_out_of_range_rejected() {
        let err = load_config_from_str("[supply]\nthreshold_fraction = 1.2\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn inverted_band_rejected() {
        let err = load_config_from_str("[debounce]\nlow = 0.6\nhigh = 0.4\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_run_length_rejected() {
        let err = load_config_from_str("[debounce]\nmin_run = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "[supply]\nvdd = 1.2").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.supply.vdd, 1.2);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
