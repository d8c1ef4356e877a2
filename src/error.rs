//! Validation errors raised at the configuration and input boundary.
//!
//! The engine functions themselves never fail: once a [`FundConfig`] has
//! passed [`FundConfig::validate`] its invariants are trusted.
//!
//! [`FundConfig`]: crate::FundConfig
//! [`FundConfig::validate`]: crate::FundConfig::validate

use crate::types::AssetClass;

/// Errors returned by configuration and input validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The glide path has no entries, so no target can be derived.
    #[error("glide path is empty")]
    EmptyGlidePath,

    /// Two glide-path entries share an age.
    #[error("glide path has more than one entry for age {0}")]
    DuplicateAge(i32),

    /// A glide-path row does not sum to 100%.
    #[error("allocations at age {age} must total 100%, got {total}%")]
    AllocationSum { age: i32, total: f64 },

    /// A glide-path row has a negative or non-finite percentage.
    #[error("allocation for {asset_class} at age {age} is invalid: {value}")]
    InvalidAllocation {
        age: i32,
        asset_class: AssetClass,
        value: f64,
    },

    /// An asset class's fund weights do not sum to 100%.
    #[error("fund weights for {asset_class} must total 100%, got {total}%")]
    FundWeightSum { asset_class: AssetClass, total: f64 },

    /// A fund weight is negative or non-finite.
    #[error("weight for {symbol} in {asset_class} is invalid: {value}")]
    InvalidWeight {
        asset_class: AssetClass,
        symbol: String,
        value: f64,
    },

    /// A ticker is empty, too long, or not ASCII.
    #[error("invalid fund symbol '{0}'")]
    InvalidSymbol(String),

    /// A holding value is negative or non-finite.
    #[error("holding for {symbol} is invalid: {value}")]
    InvalidHolding { symbol: String, value: f64 },

    /// Cash to invest is negative or non-finite.
    #[error("cash to invest is invalid: {0}")]
    InvalidCash(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
