//! PriceBar and PriceSeries: the daily market data unit and its ordered container.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One trading day for a single ticker.
///
/// Prices are forward-adjusted by the provider before they reach the core;
/// the core never re-adjusts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Traded value for the day (price × volume in quote currency).
    pub amount: f64,
}

impl PriceBar {
    /// OHLC sanity: finite positive prices with high and low bracketing
    /// open and close.
    pub fn is_sane(&self) -> bool {
        if ![self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
        {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("duplicate bar for {symbol} on {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },

    #[error("malformed bar for {symbol} on {date}")]
    MalformedBar { symbol: String, date: NaiveDate },
}

/// Price history for one ticker, strictly increasing by date.
///
/// Gaps between dates are allowed; they simply leave rolling windows
/// spanning fewer calendar days than trading days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, sorting bars by date. Duplicate dates and bars that
    /// fail [`PriceBar::is_sane`] are rejected.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if let Some(bad) = bars.iter().find(|b| !b.is_sane()) {
            return Err(SeriesError::MalformedBar {
                symbol,
                date: bad.date,
            });
        }
        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SeriesError::DuplicateDate {
                symbol,
                date: pair[0].date,
            });
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
