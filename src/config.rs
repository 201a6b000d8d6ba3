use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use crate::execution::aggregator::Granularity;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub fetch: FetchOptions,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SystemConfig {
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    #[serde(default = "default_averages_path")]
    pub averages_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            averages_path: default_averages_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchOptions {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            follow_redirects: default_follow_redirects(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_granularities")]
    pub granularities: Vec<Granularity>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            granularities: default_granularities(),
        }
    }
}

fn default_history_path() -> PathBuf { PathBuf::from("price_history.json") }
fn default_averages_path() -> PathBuf { PathBuf::from("price_averages.json") }
fn default_timeout() -> u64 { 15 }
fn default_user_agent() -> String { "Mozilla/5.0 (compatible; SurfParkPriceTracker/1.0)".to_string() }
fn default_follow_redirects() -> bool { true }
fn default_max_concurrent() -> usize { 4 }
fn default_granularities() -> Vec<Granularity> { vec![Granularity::All, Granularity::Month] }

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub config_path: PathBuf,
    pub history_path: Option<PathBuf>,
    pub averages_path: Option<PathBuf>,
    pub dry_run: Option<bool>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// The config file is optional; every section has defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn apply_env(mut self, env: &EnvConfig) -> Self {
        if let Some(path) = &env.history_path {
            self.storage.history_path = path.clone();
        }
        if let Some(path) = &env.averages_path {
            self.storage.averages_path = path.clone();
        }
        if let Some(dry_run) = env.dry_run {
            self.system.dry_run = dry_run;
        }
        self
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let dry_run = match std::env::var("DRY_RUN") {
            Ok(v) => Some(parse_flag(&v).with_context(|| {
                format!("DRY_RUN must be true/false, 1/0, yes/no or on/off, got {:?}", v)
            })?),
            Err(_) => None,
        };

        Ok(Self {
            config_path: std::env::var("TRACKER_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("tracker.toml")),
            history_path: std::env::var("HISTORY_FILE").ok().map(PathBuf::from),
            averages_path: std::env::var("AVERAGES_FILE").ok().map(PathBuf::from),
            dry_run,
        })
    }
}

/// Boolean env flag; case-insensitive, surrounding whitespace ignored.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert!(!config.system.dry_run);
        assert_eq!(config.storage.history_path, PathBuf::from("price_history.json"));
        assert_eq!(config.fetch.timeout_secs, 15);
        assert!(config.fetch.follow_redirects);
        assert_eq!(config.aggregation.granularities, vec![Granularity::All, Granularity::Month]);
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [fetch]
            timeout_secs = 5
            follow_redirects = false

            [aggregation]
            granularities = ["day"]
            "#,
        )
        .unwrap();

        assert_eq!(config.fetch.timeout_secs, 5);
        assert!(!config.fetch.follow_redirects);
        assert_eq!(config.fetch.max_concurrent, 4);
        assert_eq!(config.aggregation.granularities, vec![Granularity::Day]);
        assert_eq!(config.storage.averages_path, PathBuf::from("price_averages.json"));
    }

    #[test]
    fn test_env_overrides() {
        let env = EnvConfig {
            config_path: PathBuf::from("tracker.toml"),
            history_path: Some(PathBuf::from("/data/history.json")),
            averages_path: None,
            dry_run: Some(true),
        };

        let config = Config::default().apply_env(&env);
        assert_eq!(config.storage.history_path, PathBuf::from("/data/history.json"));
        assert_eq!(config.storage.averages_path, PathBuf::from("price_averages.json"));
        assert!(config.system.dry_run);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("tracker.toml")).unwrap();
        assert_eq!(config.fetch.max_concurrent, 4);
    }

    #[test]
    fn test_env_flag_spellings() {
        for on in ["true", "TRUE", "1", "yes", " on "] {
            assert_eq!(parse_flag(on), Some(true), "{:?}", on);
        }
        for off in ["false", "0", "No", "off", ""] {
            assert_eq!(parse_flag(off), Some(false), "{:?}", off);
        }
        assert_eq!(parse_flag("maybe"), None);
    }
}
