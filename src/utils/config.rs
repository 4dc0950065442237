use crate::analysis::DriftConfig;
use crate::brief::BriefConfig;
use crate::ingest::PeriodMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub drift: DriftConfig,
    pub brief: BriefConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CMS provider/service CSV
    pub path: PathBuf,
    pub periods: PeriodMode,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/claims.csv"),
            periods: PeriodMode::Column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "json" or "pretty"
    pub output: String,
    /// Empty for stderr
    pub file_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: "pretty".to_string(),
            file_path: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from CONFIG_FILE, the default path, or built-in defaults
    pub fn load() -> Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_file(path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            Err(_) => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        self.drift.validate().context("invalid [drift] section")?;
        url::Url::parse(&self.brief.endpoint).context("brief.endpoint is not a valid URL")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.drift.stable_min, 80);
        assert!(!config.brief.enabled);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml(
            r#"
            [data]
            path = "claims/cms_2023.csv"
            periods = { mode = "pseudo_split", early = 2022, late = 2023 }

            [drift]
            driver_threshold = 30

            [brief]
            enabled = true
            model = "gemini-test"

            [logging]
            output = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.path, PathBuf::from("claims/cms_2023.csv"));
        assert_eq!(
            config.data.periods,
            PeriodMode::PseudoSplit { early: 2022, late: 2023 }
        );
        assert_eq!(config.drift.driver_threshold, 30);
        assert_eq!(config.drift.entropy_weight, DriftConfig::default().entropy_weight);
        assert!(config.brief.enabled);
        assert_eq!(config.brief.model, "gemini-test");
        assert_eq!(config.logging.output, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let result = Config::from_toml("[drift]\nstable_min = 50\nwatch_min = 70\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_negative_weight() {
        let result = Config::from_toml("[drift]\nintensity_weight = -1.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let result = Config::from_toml("[brief]\nendpoint = \"not a url\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::from_file("config/does-not-exist.toml").is_err());
    }

    #[test]
    fn test_shipped_default_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = Config::from_file(path).unwrap();
        assert_eq!(config.drift, DriftConfig::default());
    }
}
