//! Screening criteria: threshold predicates applied to a TickerRecord.
//!
//! A record is admitted only when every predicate holds. A missing metric
//! fails its predicate.

use crate::domain::{Metric, TickerRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CriteriaError {
    #[error("criterion '{name}' must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("criterion '{name}' must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
}

/// Admission thresholds. Every field defaults independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaSet {
    /// Debt/equity must be strictly below this.
    pub max_debt_equity: f64,
    /// ROE must be strictly above this (fraction, 0.15 = 15%).
    pub min_roe: f64,
    /// Revenue growth must be strictly above this (fraction).
    pub min_revenue_growth: f64,
    /// Free cash flow must be strictly above this.
    pub min_free_cash_flow: f64,
}

impl Default for CriteriaSet {
    fn default() -> Self {
        Self {
            max_debt_equity: 0.5,
            min_roe: 0.15,
            min_revenue_growth: 0.05,
            min_free_cash_flow: 0.0,
        }
    }
}

/// Which predicate a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    DebtToEquity,
    Roe,
    RevenueGrowth,
    FreeCashFlow,
}

impl Rejection {
    pub fn metric(self) -> Metric {
        match self {
            Rejection::DebtToEquity => Metric::DebtToEquity,
            Rejection::Roe => Metric::Roe,
            Rejection::RevenueGrowth => Metric::RevenueGrowth,
            Rejection::FreeCashFlow => Metric::FreeCashFlow,
        }
    }
}

impl CriteriaSet {
    /// Reject nonsensical thresholds before any ticker is processed.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        let fields = [
            ("max_debt_equity", self.max_debt_equity),
            ("min_roe", self.min_roe),
            ("min_revenue_growth", self.min_revenue_growth),
            ("min_free_cash_flow", self.min_free_cash_flow),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(CriteriaError::NotFinite { name, value });
            }
            if value < 0.0 {
                return Err(CriteriaError::Negative { name, value });
            }
        }
        Ok(())
    }

    /// All failed predicates, in evaluation order. Empty means admitted.
    pub fn rejections(&self, record: &TickerRecord) -> Vec<Rejection> {
        let checks = [
            (
                Rejection::DebtToEquity,
                passes(record, Metric::DebtToEquity, |v| v < self.max_debt_equity),
            ),
            (Rejection::Roe, passes(record, Metric::Roe, |v| v > self.min_roe)),
            (
                Rejection::RevenueGrowth,
                passes(record, Metric::RevenueGrowth, |v| v > self.min_revenue_growth),
            ),
            (
                Rejection::FreeCashFlow,
                passes(record, Metric::FreeCashFlow, |v| v > self.min_free_cash_flow),
            ),
        ];
        checks
            .into_iter()
            .filter(|(_, ok)| !ok)
            .map(|(rejection, _)| rejection)
            .collect()
    }

    pub fn admits(&self, record: &TickerRecord) -> bool {
        self.rejections(record).is_empty()
    }
}

fn passes(record: &TickerRecord, metric: Metric, predicate: impl Fn(f64) -> bool) -> bool {
    record.get(metric).value().is_some_and(predicate)
}
