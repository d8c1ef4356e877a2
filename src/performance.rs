//! Performance aggregation: per-fund returns weighted into a portfolio view.
//!
//! Weights are the model weights of the current-age target (the same
//! `class_pct * fund_pct / 100` decomposition the rebalancer uses), not the
//! dollar weights of actual holdings. Performance is reported against the
//! intended policy.
//!
//! Missing market data never aborts a report: a fund without history becomes
//! [`FundReport::Unavailable`], a period without enough observations becomes
//! an N/A [`PeriodReturn`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use rustc_hash::FxHashMap;

use crate::fund::FundConfig;
use crate::glide_path::interpolate;
use crate::types::{Allocation, Symbol, round2};

/// One dated price observation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Standard lookback periods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Period {
    #[cfg_attr(feature = "serde", serde(rename = "1d"))]
    OneDay,
    #[cfg_attr(feature = "serde", serde(rename = "5d"))]
    FiveDays,
    #[cfg_attr(feature = "serde", serde(rename = "1mo"))]
    OneMonth,
    #[cfg_attr(feature = "serde", serde(rename = "3mo"))]
    ThreeMonths,
    #[cfg_attr(feature = "serde", serde(rename = "6mo"))]
    SixMonths,
    #[cfg_attr(feature = "serde", serde(rename = "1y"))]
    OneYear,
    #[cfg_attr(feature = "serde", serde(rename = "2y"))]
    TwoYears,
    #[cfg_attr(feature = "serde", serde(rename = "5y"))]
    FiveYears,
    #[cfg_attr(feature = "serde", serde(rename = "10y"))]
    TenYears,
    #[cfg_attr(feature = "serde", serde(rename = "ytd"))]
    YearToDate,
    #[cfg_attr(feature = "serde", serde(rename = "max"))]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// Slice an ascending daily history down to this lookback.
    ///
    /// `1d`/`5d` count trading days (observations) back from the last one;
    /// month and year periods go back in calendar time from the last date;
    /// `ytd` starts on January 1 of the last date's year.
    pub fn window<'a>(&self, history: &'a [PricePoint]) -> &'a [PricePoint] {
        let Some(last) = history.last() else {
            return history;
        };

        let months = match self {
            Period::OneDay => return tail(history, 2),
            Period::FiveDays => return tail(history, 6),
            Period::Max => return history,
            Period::YearToDate => {
                let start = NaiveDate::from_ymd_opt(last.date.year(), 1, 1).unwrap_or(last.date);
                return since(history, start);
            }
            Period::OneMonth => 1,
            Period::ThreeMonths => 3,
            Period::SixMonths => 6,
            Period::OneYear => 12,
            Period::TwoYears => 24,
            Period::FiveYears => 60,
            Period::TenYears => 120,
        };

        match last.date.checked_sub_months(Months::new(months)) {
            Some(start) => since(history, start),
            None => history,
        }
    }
}

fn tail(history: &[PricePoint], n: usize) -> &[PricePoint] {
    &history[history.len().saturating_sub(n)..]
}

fn since(history: &[PricePoint], start: NaiveDate) -> &[PricePoint] {
    let idx = history.partition_point(|p| p.date < start);
    &history[idx..]
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A percentage return, or N/A when the data could not support one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PeriodReturn(pub Option<f64>);

impl PeriodReturn {
    pub const NA: PeriodReturn = PeriodReturn(None);

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn is_available(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Display for PeriodReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => f.pad(&format!("{v:.2}")),
            None => f.pad("N/A"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PeriodReturn {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_str("N/A"),
        }
    }
}

/// Returns keyed by period, in [`Period::ALL`] order.
pub type PeriodReturns = BTreeMap<Period, PeriodReturn>;

/// Percentage return from the first to the last observation, rounded to 2 decimals.
///
/// N/A with fewer than two observations or a non-positive starting price.
pub fn period_return(prices: &[PricePoint]) -> PeriodReturn {
    match (prices.first(), prices.last()) {
        (Some(first), Some(last)) if prices.len() >= 2 && first.price > 0.0 => {
            PeriodReturn(Some(round2((last.price / first.price - 1.0) * 100.0)))
        }
        _ => PeriodReturn::NA,
    }
}

/// Market data gathered for one fund before aggregation.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketSeries {
    pub symbol: Symbol,
    /// Full ascending history.
    pub history: Vec<PricePoint>,
    pub returns: PeriodReturns,
}

impl MarketSeries {
    /// Build from a full history, computing each period over [`Period::window`].
    pub fn from_history(symbol: Symbol, mut history: Vec<PricePoint>) -> Self {
        history.sort_by_key(|p| p.date);
        let returns = Period::ALL
            .iter()
            .map(|&p| (p, period_return(p.window(&history))))
            .collect();
        Self {
            symbol,
            history,
            returns,
        }
    }
}

/// Input for one configured fund: its market data, or why there is none.
#[derive(Clone, Debug, PartialEq)]
pub enum FundInput {
    Series(MarketSeries),
    Missing { symbol: Symbol, reason: String },
}

impl FundInput {
    pub fn symbol(&self) -> Symbol {
        match self {
            FundInput::Series(s) => s.symbol,
            FundInput::Missing { symbol, .. } => *symbol,
        }
    }
}

/// Summary row for a fund with market data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FundPerformance {
    pub symbol: Symbol,
    pub current_price: f64,
    pub previous_close: f64,
    pub daily_change: f64,
    pub daily_change_pct: f64,
    /// Model weight of this fund in the whole portfolio (0–100).
    pub allocation_pct: f64,
    pub returns: PeriodReturns,
}

/// Per-fund line of a performance report.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
pub enum FundReport {
    Available(FundPerformance),
    Unavailable {
        symbol: Symbol,
        allocation_pct: f64,
        reason: String,
    },
}

impl FundReport {
    pub fn symbol(&self) -> Symbol {
        match self {
            FundReport::Available(p) => p.symbol,
            FundReport::Unavailable { symbol, .. } => *symbol,
        }
    }

    pub fn returns(&self) -> Option<&PeriodReturns> {
        match self {
            FundReport::Available(p) => Some(&p.returns),
            FundReport::Unavailable { .. } => None,
        }
    }
}

/// Full performance view for one fund configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PerformanceReport {
    pub age: i32,
    pub target: Allocation,
    pub funds: Vec<FundReport>,
    pub overall_returns: PeriodReturns,
    /// Synthetic weighted price series; a proxy, not a net asset value.
    pub overall_history: Vec<PricePoint>,
}

/// Summarize one fund's series at the given model weight.
///
/// An unchanged close reports a daily change of 0.00, not N/A; only a missing
/// history makes the fund unavailable.
pub fn summarize(series: &MarketSeries, allocation_pct: f64) -> FundReport {
    let (current, previous) = match series.history.as_slice() {
        [] => {
            return FundReport::Unavailable {
                symbol: series.symbol,
                allocation_pct: round2(allocation_pct),
                reason: format!("no historical data available for {}", series.symbol),
            };
        }
        [only] => (only.price, only.price),
        [.., prev, last] => (last.price, prev.price),
    };

    let daily_change = current - previous;
    let daily_change_pct = if previous != 0.0 {
        daily_change / previous * 100.0
    } else {
        0.0
    };

    FundReport::Available(FundPerformance {
        symbol: series.symbol,
        current_price: round2(current),
        previous_close: round2(previous),
        daily_change: round2(daily_change),
        daily_change_pct: round2(daily_change_pct),
        allocation_pct: round2(allocation_pct),
        returns: series.returns.clone(),
    })
}

/// Allocation-weighted portfolio return per period.
///
/// Each reporting fund contributes `(weight / total_weight) * return`, where
/// the total covers every weighted fund, reporting or not. A period is N/A
/// when no fund with a non-zero weight reports it.
pub fn overall_returns(
    weights: &[(Symbol, f64)],
    returns: &[(Symbol, &PeriodReturns)],
) -> PeriodReturns {
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let weight_of: FxHashMap<Symbol, f64> = weights.iter().copied().collect();

    Period::ALL
        .iter()
        .map(|&period| {
            if total <= 0.0 {
                return (period, PeriodReturn::NA);
            }
            let mut weighted = 0.0_f64;
            let mut share = 0.0_f64;
            for (symbol, fund_returns) in returns {
                let Some(r) = fund_returns.get(&period).and_then(|r| r.value()) else {
                    continue;
                };
                let w = weight_of.get(symbol).copied().unwrap_or(0.0) / total;
                weighted += w * r;
                share += w;
            }
            let value = (share > 0.0).then(|| round2(weighted));
            (period, PeriodReturn(value))
        })
        .collect()
}

/// Weighted sum of price series, outer-joined by date.
///
/// A fund missing a date contributes 0 on that date. Weights are on the
/// 0–100 scale and applied as fractions.
pub fn overall_history(
    weights: &[(Symbol, f64)],
    histories: &[(Symbol, &[PricePoint])],
) -> Vec<PricePoint> {
    let weight_of: FxHashMap<Symbol, f64> = weights.iter().copied().collect();
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for (symbol, history) in histories {
        let fraction = weight_of.get(symbol).copied().unwrap_or(0.0) / 100.0;
        for point in history.iter() {
            *by_date.entry(point.date).or_insert(0.0) += point.price * fraction;
        }
    }

    by_date
        .into_iter()
        .map(|(date, price)| PricePoint { date, price })
        .collect()
}

/// Build the performance report for `config` at its age on `as_of`.
pub fn analyze(inputs: &[FundInput], config: &FundConfig, as_of: NaiveDate) -> PerformanceReport {
    let age = config.age_on(as_of);
    let target = interpolate(age, &config.glide_path);
    let weights = config.fund_weights(&target);
    let weight_of: FxHashMap<Symbol, f64> = weights.iter().copied().collect();

    let funds: Vec<FundReport> = inputs
        .iter()
        .map(|input| {
            let allocation = weight_of.get(&input.symbol()).copied().unwrap_or(0.0);
            match input {
                FundInput::Series(series) => summarize(series, allocation),
                FundInput::Missing { symbol, reason } => FundReport::Unavailable {
                    symbol: *symbol,
                    allocation_pct: round2(allocation),
                    reason: reason.clone(),
                },
            }
        })
        .collect();

    let returns: Vec<(Symbol, &PeriodReturns)> = funds
        .iter()
        .filter_map(|f| f.returns().map(|r| (f.symbol(), r)))
        .collect();
    let overall_returns = overall_returns(&weights, &returns);

    let histories: Vec<(Symbol, &[PricePoint])> = inputs
        .iter()
        .filter_map(|input| match input {
            FundInput::Series(s) if !s.history.is_empty() => Some((s.symbol, s.history.as_slice())),
            _ => None,
        })
        .collect();
    let overall_history = overall_history(&weights, &histories);

    PerformanceReport {
        age,
        target,
        funds,
        overall_returns,
        overall_history,
    }
}
