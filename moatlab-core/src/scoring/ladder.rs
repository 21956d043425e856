//! Threshold ladders: ordered rungs mapping a metric value to a score bucket.
//!
//! Rungs are checked top to bottom and the first one that holds wins.
//! Each ladder is monotonic: a better value never lands on a lower rung.

use super::Score;
use crate::domain::Metric;

/// Comparison applied at a rung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// `value >= threshold`
    AtLeast(f64),
    /// `value > threshold`
    Above(f64),
    /// `value < threshold`
    Below(f64),
}

impl Bound {
    pub fn holds(self, value: f64) -> bool {
        match self {
            Bound::AtLeast(t) => value >= t,
            Bound::Above(t) => value > t,
            Bound::Below(t) => value < t,
        }
    }
}

/// An ordered set of rungs. Values matching no rung score zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ladder {
    rungs: &'static [(Bound, Score)],
}

impl Ladder {
    pub const fn new(rungs: &'static [(Bound, Score)]) -> Self {
        Self { rungs }
    }

    pub fn rungs(&self) -> &'static [(Bound, Score)] {
        self.rungs
    }

    pub fn bucket(&self, value: f64) -> Score {
        self.rungs
            .iter()
            .find(|(bound, _)| bound.holds(value))
            .map_or(Score::Zero, |&(_, score)| score)
    }
}

const ROIC: Ladder = Ladder::new(&[
    (Bound::AtLeast(15.0), Score::Full),
    (Bound::AtLeast(10.0), Score::Mid),
    (Bound::AtLeast(5.0), Score::Low),
]);

const ROE: Ladder = Ladder::new(&[
    (Bound::AtLeast(20.0), Score::Full),
    (Bound::AtLeast(15.0), Score::Mid),
    (Bound::AtLeast(10.0), Score::Low),
]);

const GROSS_MARGIN: Ladder = Ladder::new(&[
    (Bound::AtLeast(50.0), Score::Full),
    (Bound::AtLeast(40.0), Score::Mid),
    (Bound::AtLeast(30.0), Score::Low),
]);

const REVENUE_GROWTH: Ladder = Ladder::new(&[
    (Bound::AtLeast(0.15), Score::Full),
    (Bound::AtLeast(0.10), Score::Mid),
    (Bound::AtLeast(0.05), Score::Low),
]);

const FREE_CASH_FLOW: Ladder = Ladder::new(&[(Bound::Above(0.0), Score::Full)]);

// Lower leverage and lower earnings volatility score higher.
const DEBT_TO_EQUITY: Ladder = Ladder::new(&[
    (Bound::Below(0.5), Score::Full),
    (Bound::Below(1.0), Score::Mid),
    (Bound::Below(2.0), Score::Low),
]);

const EARNINGS_STABILITY: Ladder = Ladder::new(&[
    (Bound::Below(0.05), Score::Full),
    (Bound::Below(0.10), Score::Mid),
    (Bound::Below(0.15), Score::Low),
]);

impl Metric {
    /// The scoring ladder for this metric.
    pub fn ladder(self) -> Ladder {
        match self {
            Metric::Roic => ROIC,
            Metric::Roe => ROE,
            Metric::GrossMargin => GROSS_MARGIN,
            Metric::RevenueGrowth => REVENUE_GROWTH,
            Metric::FreeCashFlow => FREE_CASH_FLOW,
            Metric::DebtToEquity => DEBT_TO_EQUITY,
            Metric::EarningsStability => EARNINGS_STABILITY,
        }
    }

    /// Whether larger raw values are better for this metric.
    pub fn higher_is_better(self) -> bool {
        !matches!(self, Metric::DebtToEquity | Metric::EarningsStability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive_for_at_least() {
        assert_eq!(ROIC.bucket(15.0), Score::Full);
        assert_eq!(ROIC.bucket(14.999), Score::Mid);
        assert_eq!(ROIC.bucket(10.0), Score::Mid);
        assert_eq!(ROIC.bucket(5.0), Score::Low);
        assert_eq!(ROIC.bucket(4.999), Score::Zero);
    }

    #[test]
    fn boundaries_are_exclusive_for_below() {
        assert_eq!(DEBT_TO_EQUITY.bucket(0.49), Score::Full);
        assert_eq!(DEBT_TO_EQUITY.bucket(0.5), Score::Mid);
        assert_eq!(DEBT_TO_EQUITY.bucket(1.0), Score::Low);
        assert_eq!(DEBT_TO_EQUITY.bucket(2.0), Score::Zero);
    }

    #[test]
    fn free_cash_flow_is_binary() {
        assert_eq!(FREE_CASH_FLOW.bucket(0.01), Score::Full);
        assert_eq!(FREE_CASH_FLOW.bucket(0.0), Score::Zero);
        assert_eq!(FREE_CASH_FLOW.bucket(-5.0), Score::Zero);
    }

    #[test]
    fn every_ladder_orders_rungs_from_best_to_worst() {
        for metric in Metric::ALL {
            let scores: Vec<f64> = metric.ladder().rungs().iter().map(|(_, s)| s.value()).collect();
            assert!(
                scores.windows(2).all(|w| w[0] > w[1]),
                "{metric}: rungs not descending"
            );
        }
    }
}
