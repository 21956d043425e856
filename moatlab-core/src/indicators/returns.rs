//! Daily simple return.
//!
//! return[t] = close[t] / close[t-1] - 1
//! Lookback: 1. Undefined when either close is non-finite or the prior close is zero.

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone, Default)]
pub struct DailyReturn;

impl DailyReturn {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for DailyReturn {
    fn name(&self) -> &str {
        "daily_return"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let mut result = vec![None; bars.len()];
        for i in 1..bars.len() {
            let prev = bars[i - 1].close;
            let curr = bars[i].close;
            if prev.is_finite() && curr.is_finite() && prev != 0.0 {
                result[i] = Some(curr / prev - 1.0);
            }
        }
        result
    }
}
