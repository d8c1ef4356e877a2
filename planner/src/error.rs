//! Error types for the planner.

use std::path::PathBuf;

/// All errors that can occur while planning.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("fund '{0}' not found")]
    FundNotFound(String),

    #[error("fund '{0}' already exists")]
    FundExists(String),

    #[error("invalid fund id '{0}'")]
    InvalidFundId(String),

    #[error("failed to access {path}: {source}")]
    Store {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse fund JSON: {0}")]
    FundParse(#[from] serde_json::Error),

    #[error("market data for {symbol}: {reason}")]
    MarketData { symbol: String, reason: String },

    #[error("invalid input: {0}")]
    Input(String),

    #[error("invalid configuration: {0}")]
    Validation(#[from] glidepath::Error),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

impl Error {
    /// Process exit code: 2 for rejected input or configuration, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_) | Error::Input(_) | Error::InvalidFundId(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
