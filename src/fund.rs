//! Fund configuration: birth year, per-class fund weights, and glide path.
//!
//! A [`FundConfig`] is validated once when it is written (see
//! [`FundConfig::validate`]); the engine then treats it as a read-only
//! snapshot and trusts its invariants.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::glide_path::{GlidePath, GlidePathEntry};
use crate::types::{Allocation, AssetClass, Symbol};

/// Allowed deviation from 100% for allocation rows and fund weight lists.
pub const SUM_TOLERANCE: f64 = 0.01;

/// Birth year given to newly created funds.
pub const DEFAULT_BIRTH_YEAR: i32 = 1990;

/// A concrete fund and its share of an asset class (0–100).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FundWeight {
    pub symbol: Symbol,
    pub percentage: f64,
}

impl FundWeight {
    pub fn new(symbol: Symbol, percentage: f64) -> Self {
        Self { symbol, percentage }
    }
}

/// Complete configuration of one retirement fund.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FundConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub fund_name: String,
    #[cfg_attr(feature = "serde", serde(alias = "date_of_birth"))]
    pub birth_year: i32,
    #[cfg_attr(feature = "serde", serde(alias = "funds"))]
    pub asset_classes: BTreeMap<AssetClass, Vec<FundWeight>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub glide_path: GlidePath,
}

impl FundConfig {
    /// A fresh configuration: standard asset classes with no funds, empty glide path.
    pub fn new(fund_name: impl Into<String>) -> Self {
        Self {
            fund_name: fund_name.into(),
            birth_year: DEFAULT_BIRTH_YEAR,
            asset_classes: AssetClass::standard()
                .into_iter()
                .map(|class| (class, Vec::new()))
                .collect(),
            glide_path: Vec::new(),
        }
    }

    /// Investor age on `as_of` (calendar-year difference, saturating).
    pub fn age_on(&self, as_of: NaiveDate) -> i32 {
        as_of.year().saturating_sub(self.birth_year)
    }

    /// Check the write-time invariants.
    ///
    /// Fund weights of every non-empty class and every glide-path row must
    /// total 100% within [`SUM_TOLERANCE`]; ages must be unique. An empty
    /// glide path is accepted here (new funds start that way); use
    /// [`FundConfig::ensure_glide_path`] before computing targets.
    pub fn validate(&self) -> Result<()> {
        for (class, funds) in &self.asset_classes {
            if funds.is_empty() {
                continue;
            }
            for fw in funds {
                if !fw.percentage.is_finite() || fw.percentage < 0.0 {
                    return Err(Error::InvalidWeight {
                        asset_class: class.clone(),
                        symbol: fw.symbol.to_string(),
                        value: fw.percentage,
                    });
                }
            }
            let total: f64 = funds.iter().map(|fw| fw.percentage).sum();
            if (total - 100.0).abs() > SUM_TOLERANCE {
                return Err(Error::FundWeightSum {
                    asset_class: class.clone(),
                    total,
                });
            }
        }

        let mut ages: Vec<i32> = self.glide_path.iter().map(|e| e.age).collect();
        ages.sort_unstable();
        if let Some(pair) = ages.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::DuplicateAge(pair[0]));
        }

        for entry in &self.glide_path {
            validate_entry(entry)?;
        }

        Ok(())
    }

    /// Fail with [`Error::EmptyGlidePath`] if no target can be derived.
    pub fn ensure_glide_path(&self) -> Result<()> {
        if self.glide_path.is_empty() {
            return Err(Error::EmptyGlidePath);
        }
        Ok(())
    }

    /// Every fund symbol in configuration order, without duplicates.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        for funds in self.asset_classes.values() {
            for fw in funds {
                if !symbols.contains(&fw.symbol) {
                    symbols.push(fw.symbol);
                }
            }
        }
        symbols
    }

    /// Model weight of each fund (0–100) under `target`.
    ///
    /// A fund's weight is `class_pct * fund_pct / 100`, summed if the fund
    /// appears under several classes. Classes with no funds contribute
    /// nothing. Order follows the target's classes, then each fund list.
    pub fn fund_weights(&self, target: &Allocation) -> Vec<(Symbol, f64)> {
        let mut weights: Vec<(Symbol, f64)> = Vec::new();
        let mut index: FxHashMap<Symbol, usize> = FxHashMap::default();

        for (class, class_pct) in target {
            let Some(funds) = self.asset_classes.get(class) else {
                continue;
            };
            for fw in funds {
                let weight = class_pct * fw.percentage / 100.0;
                match index.get(&fw.symbol) {
                    Some(&i) => weights[i].1 += weight,
                    None => {
                        index.insert(fw.symbol, weights.len());
                        weights.push((fw.symbol, weight));
                    }
                }
            }
        }

        weights
    }

    /// Target classes with a non-zero percentage but no funds to hold them.
    pub fn unfunded_classes(&self, target: &Allocation) -> Vec<AssetClass> {
        target
            .iter()
            .filter(|(class, pct)| {
                **pct > 0.0
                    && self
                        .asset_classes
                        .get(*class)
                        .is_none_or(|funds| funds.is_empty())
            })
            .map(|(class, _)| class.clone())
            .collect()
    }
}

fn validate_entry(entry: &GlidePathEntry) -> Result<()> {
    for (class, &value) in &entry.allocations {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidAllocation {
                age: entry.age,
                asset_class: class.clone(),
                value,
            });
        }
    }
    let total = entry.total();
    if (total - 100.0).abs() > SUM_TOLERANCE {
        return Err(Error::AllocationSum {
            age: entry.age,
            total,
        });
    }
    Ok(())
}
