//! TOML configuration loading and validation.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "glidepath.toml";

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_dir")]
    pub dir: String,
}

fn default_store_dir() -> String {
    "./funds".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataConfig {
    #[serde(default = "default_prices_dir")]
    pub dir: String,
}

fn default_prices_dir() -> String {
    "./prices".into()
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            dir: default_prices_dir(),
        }
    }
}

/// Age range covered by the `glide-path` schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_min_age")]
    pub min_age: i32,
    #[serde(default = "default_max_age")]
    pub max_age: i32,
}

fn default_min_age() -> i32 {
    15
}
fn default_max_age() -> i32 {
    95
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            min_age: default_min_age(),
            max_age: default_max_age(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given; otherwise [`DEFAULT_CONFIG_FILE`] if it exists, else defaults.
    ///
    /// An explicitly named file that does not exist is an error.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.store.dir.is_empty() {
            return Err(Error::Config("store dir must not be empty".into()));
        }
        if self.market_data.dir.is_empty() {
            return Err(Error::Config("market_data dir must not be empty".into()));
        }
        if self.schedule.min_age < 0 {
            return Err(Error::Config("schedule min_age must be >= 0".into()));
        }
        if self.schedule.min_age > self.schedule.max_age {
            return Err(Error::Config(format!(
                "schedule min_age ({}) exceeds max_age ({})",
                self.schedule.min_age, self.schedule.max_age
            )));
        }
        if self.logging.audit_file.is_empty() {
            return Err(Error::Config("audit_file must not be empty".into()));
        }
        Ok(())
    }

    pub fn store_dir(&self) -> PathBuf {
        PathBuf::from(&self.store.dir)
    }

    pub fn prices_dir(&self) -> PathBuf {
        PathBuf::from(&self.market_data.dir)
    }

    /// Inclusive age range for schedules.
    pub fn ages(&self) -> RangeInclusive<i32> {
        self.schedule.min_age..=self.schedule.max_age
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}
