//! Indicator rows: each price bar joined with its derived indicators.

use super::{DailyReturn, Indicator, RollingVolatility, Sma};
use crate::domain::{PriceBar, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const FAST_MA: usize = 5;
pub const MEDIUM_MA: usize = 20;
pub const SLOW_MA: usize = 60;
pub const VOLATILITY_WINDOW: usize = 20;

/// A price bar plus its trailing indicators. `None` means not enough history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    pub ma5: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub daily_return: Option<f64>,
    pub volatility: Option<f64>,
}

impl IndicatorRow {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }

    /// (MA5, MA20, MA60) when all three are defined.
    pub fn moving_averages(&self) -> Option<(f64, f64, f64)> {
        Some((self.ma5?, self.ma20?, self.ma60?))
    }
}

/// Compute every indicator row for a series.
///
/// Pure and deterministic: the same series always yields bit-identical rows.
pub fn compute_indicators(series: &PriceSeries) -> Vec<IndicatorRow> {
    let bars = series.bars();
    let ma5 = Sma::new(FAST_MA).compute(bars);
    let ma20 = Sma::new(MEDIUM_MA).compute(bars);
    let ma60 = Sma::new(SLOW_MA).compute(bars);
    let returns = DailyReturn.compute(bars);
    let volatility = RollingVolatility::new(VOLATILITY_WINDOW).from_returns(&returns);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            bar: bar.clone(),
            ma5: ma5[i],
            ma20: ma20[i],
            ma60: ma60[i],
            daily_return: returns[i],
            volatility: volatility[i],
        })
        .collect()
}

/// Indicator rows for one ticker, ordered by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerIndicators {
    pub symbol: String,
    /// Display name, when the universe list provides one.
    #[serde(default)]
    pub name: Option<String>,
    pub rows: Vec<IndicatorRow>,
}

impl TickerIndicators {
    pub fn from_series(series: &PriceSeries) -> Self {
        Self {
            symbol: series.symbol().to_string(),
            name: None,
            rows: compute_indicators(series),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The row dated exactly `date`, if the ticker traded that day.
    pub fn row_on(&self, date: NaiveDate) -> Option<&IndicatorRow> {
        self.rows
            .binary_search_by_key(&date, |r| r.date())
            .ok()
            .map(|i| &self.rows[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::new("TEST", make_bars(closes)).unwrap()
    }

    #[test]
    fn constant_series_has_flat_indicators() {
        let rows = compute_indicators(&series(&[42.0; 80]));
        assert_eq!(rows.len(), 80);
        assert!(rows[0].daily_return.is_none());
        for row in &rows[1..] {
            assert_eq!(row.daily_return, Some(0.0));
        }
        for row in &rows {
            for ma in [row.ma5, row.ma20, row.ma60].into_iter().flatten() {
                assert_approx(ma, 42.0, DEFAULT_EPSILON);
            }
        }
        assert!(rows[58].ma60.is_none());
        assert!(rows[59].ma60.is_some());
    }

    #[test]
    fn warmup_boundaries() {
        let closes: Vec<f64> = (1..=70).map(f64::from).collect();
        let rows = compute_indicators(&series(&closes));
        assert!(rows[3].ma5.is_none());
        assert_approx(rows[4].ma5.unwrap(), 3.0, DEFAULT_EPSILON);
        assert!(rows[18].ma20.is_none());
        assert_approx(rows[19].ma20.unwrap(), 10.5, DEFAULT_EPSILON);
        assert_approx(rows[59].ma60.unwrap(), 30.5, DEFAULT_EPSILON);
        assert!(rows[19].volatility.is_none());
        assert!(rows[20].volatility.is_some());
    }

    #[test]
    fn recomputation_is_bit_identical() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.37).sin() * 7.0).collect();
        let s = series(&closes);
        assert_eq!(compute_indicators(&s), compute_indicators(&s));
    }

    #[test]
    fn row_on_finds_exact_date_only() {
        let ti = TickerIndicators::from_series(&series(&[1.0, 2.0, 3.0]));
        let first = ti.rows[0].date();
        assert_eq!(ti.row_on(first).unwrap().close(), 1.0);
        assert!(ti.row_on(first - chrono::Duration::days(1)).is_none());
    }
}
