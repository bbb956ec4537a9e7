use super::types::*;
use crate::error_handling::types::ConfigError;
use chrono::{Local, NaiveDateTime, SubsecRound};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Timestamp layout shared by the flat file, the anchor setting and reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Application configuration resolved once at the process boundary.
///
/// This structure holds every path, seed and rendering option used by the
/// pipeline stages. It is deserialized from a TOML file with the `toml` crate;
/// each section falls back to its defaults when absent, so an empty file is a
/// valid configuration. Command-line flags parsed with `clap` are applied on
/// top of it in `main` before any stage runs.
///
/// # Examples
///
/// ```
/// use claimlab::configuration::config::Config;
///
/// let config = Config::from_toml_str("[generator]\nrecord_count = 10\n").unwrap();
/// assert_eq!(config.generator.record_count, 10);
/// assert_eq!(config.paths.table, "claims");
/// ```
///
/// # Fields Overview
///
/// - `paths`: input flat file, relational store, audit file, chart directory and workbook
/// - `generator`: record count, seed and generation instant of the synthetic data
/// - `charts`: premium simulation seed and the CJK font families to try
#[derive(Debug, PartialEq, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub generator: GeneratorConfig,
    pub charts: ChartsConfig,
}

impl Config {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    /// Returns `ConfigError::IoError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML for this structure and
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file when one is given, otherwise the defaults.
    ///
    /// The result is not validated: command-line overrides are applied on top
    /// of it first, and `validate` runs once on the final values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                debug!("Reading configuration from {}", p.display());
                Self::parse_toml(&fs::read_to_string(p)?)
            }
            None => Ok(Self::default()),
        }
    }

    fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator.record_count == 0 {
            return Err(ConfigError::InvalidValue(
                "generator.record_count must be greater than 0".into(),
            ));
        }
        if self.paths.table.trim().is_empty() {
            return Err(ConfigError::InvalidValue("paths.table must not be empty".into()));
        }
        if let Some(ref anchor) = self.generator.anchor {
            parse_timestamp(anchor)?;
        }
        Ok(())
    }

    /// The instant synthetic claims are dated back from.
    pub fn generation_anchor(&self) -> Result<NaiveDateTime, ConfigError> {
        match self.generator.anchor {
            Some(ref anchor) => parse_timestamp(anchor),
            None => Ok(Local::now().naive_local().trunc_subsecs(0)),
        }
    }
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ConfigError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        ConfigError::InvalidValue(format!(
            "'{}' is not a {} timestamp: {}",
            value, TIMESTAMP_FORMAT, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_pipeline_layout() {
        let config = Config::default();
        assert_eq!(config.generator.record_count, 1000);
        assert_eq!(config.generator.seed, 42);
        assert_eq!(config.charts.premium_seed, 42);
        assert_eq!(config.paths.table, "claims");
        assert_eq!(
            config.paths.claims_csv,
            PathBuf::from("data/car_insurance_claims.csv")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[paths]\noutput_dir = \"/tmp/charts\"\n\n[generator]\nseed = 7\nanchor = \"2024-06-30 08:15:00\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.paths.output_dir, PathBuf::from("/tmp/charts"));
        assert_eq!(config.paths.database, PathBuf::from("insurance.db"));
        assert_eq!(config.generator.seed, 7);
        assert_eq!(config.generator.record_count, 1000);
        assert_eq!(
            config.generation_anchor().unwrap(),
            parse_timestamp("2024-06-30 08:15:00").unwrap()
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        let zero = Config::from_toml_str("[generator]\nrecord_count = 0\n");
        assert!(matches!(zero, Err(ConfigError::InvalidValue(_))));

        let anchor = Config::from_toml_str("[generator]\nanchor = \"yesterday\"\n");
        assert!(matches!(anchor, Err(ConfigError::InvalidValue(_))));

        let table = Config::from_toml_str("[paths]\ntable = \"  \"\n");
        assert!(matches!(table, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Config::from_toml_str("[generator\nseed = 1");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_load_defers_validation() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[generator]\nrecord_count = 0").unwrap();

        let mut config = Config::load(Some(file.path())).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
        config.generator.record_count = 10;
        assert!(config.validate().is_ok());

        assert!(matches!(
            Config::load(Some(Path::new("/definitely/not/here.toml"))),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_wall_clock_anchor_has_whole_seconds() {
        use chrono::Timelike;
        let anchor = Config::default().generation_anchor().unwrap();
        assert_eq!(anchor.nanosecond(), 0);
    }
}
