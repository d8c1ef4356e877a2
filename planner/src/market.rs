//! Market data providers for performance reports.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use glidepath::{FundInput, MarketSeries, Period, PricePoint, Symbol};
use log::{debug, warn};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Historical prices per fund symbol.
pub trait MarketData {
    /// Ascending daily prices for `symbol` over `period`.
    ///
    /// Unknown symbols fail or return an empty series; callers treat both
    /// as missing data.
    fn history(&self, symbol: Symbol, period: Period) -> Result<Vec<PricePoint>>;
}

/// Reads `<dir>/<SYMBOL>.csv` files with a `date,price` header.
pub struct CsvMarketData {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    price: f64,
}

impl CsvMarketData {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: Symbol) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read(&self, symbol: Symbol, path: &Path) -> Result<Vec<PricePoint>> {
        let market_err = |reason: String| Error::MarketData {
            symbol: symbol.to_string(),
            reason,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| market_err(format!("cannot open {}: {e}", path.display())))?;

        let mut history = Vec::new();
        for row in reader.deserialize::<PriceRow>() {
            let row = row.map_err(|e| market_err(e.to_string()))?;
            if !row.price.is_finite() {
                return Err(market_err(format!("non-finite price on {}", row.date)));
            }
            history.push(PricePoint::new(row.date, row.price));
        }
        history.sort_by_key(|p| p.date);
        Ok(history)
    }
}

impl MarketData for CsvMarketData {
    fn history(&self, symbol: Symbol, period: Period) -> Result<Vec<PricePoint>> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(Error::MarketData {
                symbol: symbol.to_string(),
                reason: format!("no price file at {}", path.display()),
            });
        }
        debug!("Reading {period} history for {symbol} from {}", path.display());
        let history = self.read(symbol, &path)?;
        Ok(period.window(&history).to_vec())
    }
}

/// Fetch the full history of every symbol, turning failures into missing data.
pub fn gather(market: &dyn MarketData, symbols: &[Symbol]) -> Vec<FundInput> {
    symbols
        .iter()
        .map(|&symbol| match market.history(symbol, Period::Max) {
            Ok(history) if history.is_empty() => {
                warn!("No historical data for {symbol}");
                FundInput::Missing {
                    symbol,
                    reason: format!("no historical data available for {symbol}"),
                }
            }
            Ok(history) => FundInput::Series(MarketSeries::from_history(symbol, history)),
            Err(e) => {
                warn!("Market data unavailable: {e}");
                FundInput::Missing {
                    symbol,
                    reason: e.to_string(),
                }
            }
        })
        .collect()
}
