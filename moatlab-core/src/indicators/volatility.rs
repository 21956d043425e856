//! Rolling volatility: sample standard deviation of daily returns.
//!
//! The window holds the last `window` daily returns ending at bar t and is
//! defined only when every return in it is defined. Because the first bar
//! has no return, the first defined value sits at index `window`.

use super::returns::DailyReturn;
use super::Indicator;
use crate::domain::PriceBar;
use crate::stats::sample_std;

#[derive(Debug, Clone)]
pub struct RollingVolatility {
    window: usize,
    name: String,
}

impl RollingVolatility {
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "volatility window must be >= 2");
        Self {
            window,
            name: format!("volatility_{window}"),
        }
    }

    /// Rolling sample std over an already-computed return series.
    pub fn from_returns(&self, returns: &[Option<f64>]) -> Vec<Option<f64>> {
        let n = returns.len();
        let mut result = vec![None; n];
        if n < self.window {
            return result;
        }
        let mut buf = Vec::with_capacity(self.window);
        for i in (self.window - 1)..n {
            buf.clear();
            buf.extend(returns[(i + 1 - self.window)..=i].iter().flatten());
            if buf.len() == self.window {
                result[i] = sample_std(&buf);
            }
        }
        result
    }
}

impl Indicator for RollingVolatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        self.from_returns(&DailyReturn.compute(bars))
    }
}
