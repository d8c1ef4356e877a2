//! # glidepath
//!
//! Age-based glide-path allocation and contribution rebalancing for
//! retirement portfolios.
//!
//! ## Features
//!
//! - **Glide-path interpolation**: sparse age → allocation schedule, clamped at
//!   both ends, linearly interpolated per asset class in between
//! - **Contribution rebalancing**: split new cash across underweight funds in
//!   proportion to their dollar shortfall, never proposing a sale
//! - **Performance aggregation**: per-fund period returns weighted by the
//!   current model allocation into an overall portfolio view
//! - **Pure engine**: no I/O, no clock; the "as of" date is always passed in
//!
//! ## Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use glidepath::{AssetClass, FundConfig, FundWeight, GlidePathEntry, Holdings, Symbol};
//! use glidepath::rebalance;
//!
//! let mut config = FundConfig::new("Retirement");
//! config.birth_year = 1986;
//! config.asset_classes.insert(
//!     AssetClass::new("us_stock"),
//!     vec![FundWeight::new(Symbol::new("VTI"), 100.0)],
//! );
//! config.asset_classes.insert(
//!     AssetClass::new("us_bond"),
//!     vec![FundWeight::new(Symbol::new("BND"), 100.0)],
//! );
//! config.glide_path = vec![
//!     GlidePathEntry::new(30, [("us_stock", 90.0), ("us_bond", 10.0)]),
//!     GlidePathEntry::new(50, [("us_stock", 50.0), ("us_bond", 50.0)]),
//! ];
//! config.validate().unwrap();
//!
//! // Age 40 → halfway: 70% stock, 30% bond
//! let holdings: Holdings = [(Symbol::new("VTI"), 7_000.0)].into_iter().collect();
//! let as_of = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
//! let plan = rebalance(&holdings, 3_000.0, &config, as_of);
//!
//! assert_eq!(plan.age, 40);
//! assert_eq!(plan.invest_for(&Symbol::new("BND")), 3_000.0);
//! assert_eq!(plan.invest_for(&Symbol::new("VTI")), 0.0);
//! ```
//!
//! ## Degenerate results
//!
//! The engine never fails on data-quality issues. A plan whose outcome is not
//! [`RebalanceOutcome::Invest`] has all-zero investment amounts, and the
//! outcome says why (already balanced, no cash, no target). Missing market
//! data surfaces as N/A returns, never as an error.

pub mod error;
pub mod fund;
pub mod glide_path;
pub mod performance;
pub mod rebalance;
mod types;

// Re-export public API
pub use error::{Error, Result};
pub use fund::{FundConfig, FundWeight, SUM_TOLERANCE};
pub use glide_path::{GlidePath, GlidePathEntry, interpolate, schedule};
pub use performance::{
    FundInput, FundPerformance, FundReport, MarketSeries, PerformanceReport, Period,
    PeriodReturn, PeriodReturns, PricePoint, analyze, period_return,
};
pub use rebalance::{FundPlan, RebalanceOutcome, RebalancePlan, rebalance, validate_inputs};
pub use types::{Allocation, AssetClass, Holdings, Symbol};
