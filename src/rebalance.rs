//! Contribution rebalancer: holdings + new cash → buy amount per fund.
//!
//! The target basis is current holdings plus the new cash, so a contribution
//! corrects drift instead of topping up existing weights. Only buys are ever
//! proposed: an overweight fund needs 0 and receives 0.
//!
//! ```
//! use chrono::NaiveDate;
//! use glidepath::{AssetClass, FundConfig, FundWeight, GlidePathEntry, Holdings, Symbol};
//! use glidepath::{RebalanceOutcome, rebalance};
//!
//! let mut config = FundConfig::new("Solo");
//! config.birth_year = 1990;
//! config.asset_classes.insert(
//!     AssetClass::new("us_stock"),
//!     vec![FundWeight::new(Symbol::new("VTI"), 100.0)],
//! );
//! config.glide_path = vec![GlidePathEntry::new(20, [("us_stock", 100.0)])];
//!
//! let as_of = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
//! let plan = rebalance(&Holdings::default(), 1_000.0, &config, as_of);
//!
//! assert_eq!(plan.outcome, RebalanceOutcome::Invest);
//! assert_eq!(plan.invest_for(&Symbol::new("VTI")), 1_000.0);
//! ```

use std::fmt;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::fund::FundConfig;
use crate::glide_path::interpolate;
use crate::types::{Allocation, Holdings, Symbol};

/// How a rebalancing computation ended.
///
/// Every variant other than [`RebalanceOutcome::Invest`] means all investment
/// amounts are zero; the variant says why.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RebalanceOutcome {
    /// Cash was split across underweight funds.
    Invest,
    /// Every fund is at or above its target; nothing to buy.
    Balanced,
    /// Some funds are underweight but there is no cash to invest.
    AwaitingCash,
    /// No target could be derived (empty glide path or no funds configured).
    NoTarget,
}

impl fmt::Display for RebalanceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalanceOutcome::Invest => write!(f, "invest"),
            RebalanceOutcome::Balanced => write!(f, "already balanced"),
            RebalanceOutcome::AwaitingCash => write!(f, "underweight, no cash to invest"),
            RebalanceOutcome::NoTarget => write!(f, "no target allocation"),
        }
    }
}

/// Per-fund line of a rebalance plan (dollar amounts).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FundPlan {
    pub symbol: Symbol,
    pub current: f64,
    pub desired: f64,
    /// Shortfall to target, never negative.
    pub needed: f64,
    pub invest: f64,
}

/// Result of [`rebalance`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalancePlan {
    pub age: i32,
    pub target: Allocation,
    pub cash_to_invest: f64,
    /// Holdings plus cash: the basis the target percentages apply to.
    pub total_value: f64,
    pub total_needed: f64,
    pub funds: Vec<FundPlan>,
    pub outcome: RebalanceOutcome,
}

impl RebalancePlan {
    /// Amount to invest in `symbol` (0 if not part of the plan).
    pub fn invest_for(&self, symbol: &Symbol) -> f64 {
        self.fund(symbol).map_or(0.0, |f| f.invest)
    }

    /// Shortfall of `symbol` (0 if not part of the plan).
    pub fn needed_for(&self, symbol: &Symbol) -> f64 {
        self.fund(symbol).map_or(0.0, |f| f.needed)
    }

    pub fn fund(&self, symbol: &Symbol) -> Option<&FundPlan> {
        self.funds.iter().find(|f| f.symbol == *symbol)
    }

    pub fn total_invested(&self) -> f64 {
        self.funds.iter().map(|f| f.invest).sum()
    }

    /// `(symbol, invest)` pairs in plan order.
    pub fn invest_per_fund(&self) -> Vec<(Symbol, f64)> {
        self.funds.iter().map(|f| (f.symbol, f.invest)).collect()
    }

    /// `(symbol, needed)` pairs in plan order.
    pub fn needed_per_fund(&self) -> Vec<(Symbol, f64)> {
        self.funds.iter().map(|f| (f.symbol, f.needed)).collect()
    }

    /// True when nothing is to be bought, whatever the reason.
    pub fn is_noop(&self) -> bool {
        self.outcome != RebalanceOutcome::Invest
    }
}

/// Check holdings and cash at the input boundary.
///
/// [`rebalance`] itself assumes finite, non-negative amounts.
pub fn validate_inputs(holdings: &Holdings, cash_to_invest: f64) -> Result<()> {
    if !cash_to_invest.is_finite() || cash_to_invest < 0.0 {
        return Err(Error::InvalidCash(cash_to_invest));
    }
    for (symbol, &value) in holdings {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidHolding {
                symbol: symbol.to_string(),
                value,
            });
        }
    }
    Ok(())
}

/// Compute how `cash_to_invest` should be split across the configured funds.
///
/// # Arguments
/// - `holdings`: current dollar value per fund; symbols outside the configuration are ignored
/// - `cash_to_invest`: new cash, part of the target basis
/// - `config`: validated fund configuration
/// - `as_of`: date used to derive the investor's age
///
/// Cash is split strictly in proportion to each fund's dollar shortfall. It is
/// not capped at the shortfall, so cash beyond the total need follows the
/// same proportions.
pub fn rebalance(
    holdings: &Holdings,
    cash_to_invest: f64,
    config: &FundConfig,
    as_of: NaiveDate,
) -> RebalancePlan {
    let age = config.age_on(as_of);
    let target = interpolate(age, &config.glide_path);

    let total_value = holdings.values().sum::<f64>() + cash_to_invest;

    // fund_weights is on the 0–100 scale: class_pct * fund_pct / 100
    let mut funds: Vec<FundPlan> = config
        .fund_weights(&target)
        .into_iter()
        .map(|(symbol, weight)| {
            let current = holdings.get(&symbol).copied().unwrap_or(0.0);
            let desired = total_value * weight / 100.0;
            FundPlan {
                symbol,
                current,
                desired,
                needed: (desired - current).max(0.0),
                invest: 0.0,
            }
        })
        .collect();

    let total_needed: f64 = funds.iter().map(|f| f.needed).sum();

    let outcome = if funds.is_empty() {
        RebalanceOutcome::NoTarget
    } else if total_needed <= 0.0 {
        RebalanceOutcome::Balanced
    } else if cash_to_invest <= 0.0 {
        RebalanceOutcome::AwaitingCash
    } else {
        RebalanceOutcome::Invest
    };

    if outcome == RebalanceOutcome::Invest {
        for fund in &mut funds {
            fund.invest = cash_to_invest * (fund.needed / total_needed);
        }
    }

    RebalancePlan {
        age,
        target,
        cash_to_invest,
        total_value,
        total_needed,
        funds,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fund::FundWeight;
    use crate::glide_path::GlidePathEntry;
    use crate::types::AssetClass;

    fn vti() -> Symbol {
        Symbol::new("VTI")
    }
    fn vxus() -> Symbol {
        Symbol::new("VXUS")
    }
    fn bnd() -> Symbol {
        Symbol::new("BND")
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    /// Born 1986 → age 40 in 2026; flat 60/20/20 target.
    fn config() -> FundConfig {
        let mut config = FundConfig::new("Core");
        config.birth_year = 1986;
        config.asset_classes.insert(
            AssetClass::new("us_stock"),
            vec![FundWeight::new(vti(), 100.0)],
        );
        config.asset_classes.insert(
            AssetClass::new("intl_stock"),
            vec![FundWeight::new(vxus(), 100.0)],
        );
        config.asset_classes.insert(
            AssetClass::new("us_bond"),
            vec![FundWeight::new(bnd(), 100.0)],
        );
        config.glide_path = vec![GlidePathEntry::new(
            40,
            [("us_stock", 60.0), ("intl_stock", 20.0), ("us_bond", 20.0)],
        )];
        config
    }

    fn holdings(pairs: &[(Symbol, f64)]) -> Holdings {
        pairs.iter().copied().collect()
    }

    #[test]
    fn single_fund_gets_all_cash() {
        let mut config = FundConfig::new("Solo");
        config.birth_year = 1990;
        config.asset_classes.insert(
            AssetClass::new("us_stock"),
            vec![FundWeight::new(vti(), 100.0)],
        );
        config.glide_path = vec![GlidePathEntry::new(30, [("us_stock", 100.0)])];

        let plan = rebalance(&holdings(&[(vti(), 0.0)]), 1000.0, &config, as_of());
        assert_eq!(plan.outcome, RebalanceOutcome::Invest);
        assert_eq!(plan.invest_per_fund(), vec![(vti(), 1000.0)]);
        assert_eq!(plan.needed_per_fund(), vec![(vti(), 1000.0)]);
        assert_eq!(plan.age, 36);
    }

    #[test]
    fn cash_follows_deficits() {
        // Basis 10_000: desired VTI 6000, VXUS 2000, BND 2000
        let h = holdings(&[(vti(), 5000.0), (vxus(), 2000.0), (bnd(), 1000.0)]);
        let plan = rebalance(&h, 2000.0, &config(), as_of());

        assert_eq!(plan.total_value, 10_000.0);
        assert_eq!(plan.needed_for(&vti()), 1000.0);
        assert_eq!(plan.needed_for(&vxus()), 0.0);
        assert_eq!(plan.needed_for(&bnd()), 1000.0);
        assert_eq!(plan.invest_for(&vti()), 1000.0);
        assert_eq!(plan.invest_for(&vxus()), 0.0);
        assert_eq!(plan.invest_for(&bnd()), 1000.0);
    }

    #[test]
    fn overweight_fund_never_negative() {
        let h = holdings(&[(vti(), 9000.0), (vxus(), 0.0), (bnd(), 0.0)]);
        let plan = rebalance(&h, 1000.0, &config(), as_of());

        // desired VTI 6000 < 9000 held
        assert_eq!(plan.needed_for(&vti()), 0.0);
        assert_eq!(plan.invest_for(&vti()), 0.0);
        assert!(plan.funds.iter().all(|f| f.needed >= 0.0 && f.invest >= 0.0));
        assert!((plan.total_invested() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn partial_cash_split_proportionally() {
        // Basis 1000: desired 600/200/200, all needed; 1000 cash total
        let plan = rebalance(&Holdings::default(), 1000.0, &config(), as_of());
        assert!((plan.invest_for(&vti()) - 600.0).abs() < 1e-9);
        assert!((plan.invest_for(&vxus()) - 200.0).abs() < 1e-9);
        assert!((plan.invest_for(&bnd()) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn balanced_portfolio_invests_nothing() {
        let h = holdings(&[(vti(), 600.0), (vxus(), 200.0), (bnd(), 200.0)]);
        let plan = rebalance(&h, 0.0, &config(), as_of());
        assert_eq!(plan.outcome, RebalanceOutcome::Balanced);
        assert!(plan.funds.iter().all(|f| f.invest == 0.0 && f.needed == 0.0));
        assert_eq!(plan.funds.len(), 3);
    }

    #[test]
    fn underweight_without_cash() {
        let h = holdings(&[(vti(), 1000.0)]);
        let plan = rebalance(&h, 0.0, &config(), as_of());
        assert_eq!(plan.outcome, RebalanceOutcome::AwaitingCash);
        assert!(plan.needed_for(&bnd()) > 0.0);
        assert_eq!(plan.total_invested(), 0.0);
    }

    #[test]
    fn empty_glide_path_is_no_target() {
        let mut config = config();
        config.glide_path.clear();
        let plan = rebalance(&Holdings::default(), 500.0, &config, as_of());
        assert_eq!(plan.outcome, RebalanceOutcome::NoTarget);
        assert!(plan.target.is_empty());
        assert!(plan.funds.is_empty());
        assert!(plan.is_noop());
    }

    #[test]
    fn unfunded_class_is_skipped() {
        let mut config = config();
        config
            .asset_classes
            .insert(AssetClass::new("us_bond"), Vec::new());
        let plan = rebalance(&Holdings::default(), 1000.0, &config, as_of());
        assert!(plan.fund(&bnd()).is_none());
        // The 20% bond target goes unfilled; cash still fully placed
        assert_eq!(plan.invest_for(&vti()), 750.0);
        assert_eq!(plan.invest_for(&vxus()), 250.0);
    }

    #[test]
    fn holdings_outside_config_count_toward_basis_only() {
        let h = holdings(&[(Symbol::new("GLD"), 1000.0)]);
        let plan = rebalance(&h, 0.0, &config(), as_of());
        assert!(plan.fund(&Symbol::new("GLD")).is_none());
        assert_eq!(plan.total_value, 1000.0);
        assert_eq!(plan.needed_for(&vti()), 600.0);
    }

    #[test]
    fn single_short_fund_takes_all_cash() {
        // basis 1300 + 700 = 2000 → desired 1200/400/400, only VTI short
        let h = holdings(&[(vti(), 500.0), (vxus(), 400.0), (bnd(), 400.0)]);
        let plan = rebalance(&h, 700.0, &config(), as_of());
        assert_eq!(plan.total_needed, 700.0);
        assert_eq!(plan.invest_for(&vti()), 700.0);
        assert_eq!(plan.invest_for(&vxus()), 0.0);
    }

    #[test]
    fn cash_beyond_total_need_is_not_capped() {
        let mut config = config();
        config
            .asset_classes
            .insert(AssetClass::new("us_bond"), Vec::new());
        // desired 600/200 against 1000 of cash
        let plan = rebalance(&Holdings::default(), 1000.0, &config, as_of());
        assert_eq!(plan.total_needed, 800.0);
        assert!(plan.total_needed < plan.cash_to_invest);
        assert!(plan.invest_for(&vti()) > plan.needed_for(&vti()));
        assert!(plan.invest_for(&vxus()) > plan.needed_for(&vxus()));
        assert!((plan.total_invested() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn validate_inputs_rejects_bad_amounts() {
        assert!(validate_inputs(&Holdings::default(), 100.0).is_ok());
        assert_eq!(
            validate_inputs(&Holdings::default(), -1.0),
            Err(Error::InvalidCash(-1.0))
        );
        assert!(validate_inputs(&Holdings::default(), f64::NAN).is_err());
        let h = holdings(&[(vti(), -5.0)]);
        assert!(matches!(
            validate_inputs(&h, 0.0),
            Err(Error::InvalidHolding { .. })
        ));
    }

    #[test]
    fn outcome_display() {
        assert_eq!(format!("{}", RebalanceOutcome::Balanced), "already balanced");
    }
}
