//! Command workflows: load configuration → run the engine → audit.
//!
//! Every function here returns data; printing is left to the binary.

use std::ops::RangeInclusive;
use std::path::Path;

use chrono::NaiveDate;
use glidepath::{
    Allocation, FundConfig, Holdings, PerformanceReport, RebalancePlan, Symbol, analyze, rebalance,
    schedule, validate_inputs,
};
use log::{info, warn};
use rustc_hash::FxHashSet;

use crate::audit::{self, AuditLog};
use crate::error::{Error, Result};
use crate::market::{self, MarketData};
use crate::store::{ConfigStore, FundSummary, parse_config};

/// Parse a `SYMBOL=VALUE` holding argument.
pub fn parse_holding(arg: &str) -> Result<(Symbol, f64)> {
    let (symbol, value) = arg
        .split_once('=')
        .ok_or_else(|| Error::Input(format!("expected SYMBOL=VALUE, got '{arg}'")))?;
    let symbol: Symbol = symbol.parse()?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| Error::Input(format!("invalid holding value '{value}' for {symbol}")))?;
    Ok((symbol, value))
}

/// Collect holdings, summing repeated symbols.
pub fn holdings_from(pairs: &[(Symbol, f64)]) -> Holdings {
    let mut holdings = Holdings::default();
    for &(symbol, value) in pairs {
        *holdings.entry(symbol).or_insert(0.0) += value;
    }
    holdings
}

pub fn list_funds(store: &dyn ConfigStore) -> Result<Vec<FundSummary>> {
    store.list()
}

/// Create a default fund and record it in the audit trail.
pub fn create_fund(store: &dyn ConfigStore, audit: &mut AuditLog, name: &str) -> Result<String> {
    let id = store.create(name)?;
    audit::log_fund_created(audit, &id, name.trim())?;
    Ok(id)
}

pub fn show_fund(store: &dyn ConfigStore, fund_id: &str) -> Result<FundConfig> {
    store.get(fund_id)
}

/// Validate a JSON configuration file and save it under `fund_id`.
pub fn import_fund(
    store: &dyn ConfigStore,
    audit: &mut AuditLog,
    fund_id: &str,
    file: &Path,
) -> Result<FundConfig> {
    let contents = std::fs::read_to_string(file).map_err(|e| Error::Store {
        path: file.to_path_buf(),
        source: e,
    })?;
    let config = parse_config(&contents)?;
    store.save(fund_id, &config)?;
    audit::log_config_saved(audit, fund_id, &config)?;
    Ok(config)
}

/// Target allocation for every age in `ages`.
pub fn glide_path_schedule(
    store: &dyn ConfigStore,
    fund_id: &str,
    ages: RangeInclusive<i32>,
) -> Result<Vec<(i32, Allocation)>> {
    let config = store.get(fund_id)?;
    config.ensure_glide_path()?;
    Ok(schedule(&config.glide_path, ages))
}

/// Compute and audit a contribution plan.
pub fn plan_contribution(
    store: &dyn ConfigStore,
    audit: &mut AuditLog,
    fund_id: &str,
    holdings: &Holdings,
    cash_to_invest: f64,
    as_of: NaiveDate,
) -> Result<RebalancePlan> {
    validate_inputs(holdings, cash_to_invest)?;
    let config = store.get(fund_id)?;
    config.ensure_glide_path()?;

    let plan = rebalance(holdings, cash_to_invest, &config, as_of);

    for class in config.unfunded_classes(&plan.target) {
        warn!(
            "{} has a {:.2}% target but no funds; that share stays uninvested",
            class.display_name(),
            plan.target.get(&class).copied().unwrap_or(0.0)
        );
    }
    let configured: FxHashSet<Symbol> = config.symbols().into_iter().collect();
    for symbol in holdings.keys().filter(|s| !configured.contains(*s)) {
        warn!("Holding {symbol} is not part of fund {fund_id}; counted in the total only");
    }

    info!(
        "Fund {fund_id}: age {}, {} ({:.2} of {:.2} placed)",
        plan.age,
        plan.outcome,
        plan.total_invested(),
        plan.cash_to_invest
    );
    audit::log_rebalance(audit, fund_id, &plan)?;
    Ok(plan)
}

/// Per-fund and overall performance at the fund's current model weights.
pub fn performance(
    store: &dyn ConfigStore,
    market: &dyn MarketData,
    fund_id: &str,
    as_of: NaiveDate,
) -> Result<PerformanceReport> {
    let config = store.get(fund_id)?;
    config.ensure_glide_path()?;
    let inputs = market::gather(market, &config.symbols());
    Ok(analyze(&inputs, &config, as_of))
}
