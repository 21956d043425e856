//! Technical indicators over a daily price series.
//!
//! Indicators are pure functions: bar history in, series of the same length
//! out. A value at bar t depends only on bars 0..=t. Warmup positions and
//! positions whose window touches bad data are `None`.

pub mod returns;
pub mod row;
pub mod sma;
pub mod volatility;

pub use returns::DailyReturn;
pub use row::{compute_indicators, IndicatorRow, TickerIndicators};
pub use sma::Sma;
pub use volatility::RollingVolatility;

use crate::domain::PriceBar;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ma20", "daily_return").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces a value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec` of the same length as `bars`; the first `lookback()`
    /// entries are `None`.
    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high/low = ±1 around the
/// body, volume = 1000, amount = close × volume.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
                amount: close * 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
