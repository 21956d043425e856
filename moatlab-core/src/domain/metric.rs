//! Fundamental metric identifiers and the value-or-missing wrapper.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven fundamental metrics that make up the moat score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Roic,
    Roe,
    GrossMargin,
    RevenueGrowth,
    FreeCashFlow,
    DebtToEquity,
    EarningsStability,
}

impl Metric {
    /// All metrics in canonical report order.
    pub const ALL: [Metric; 7] = [
        Metric::Roic,
        Metric::Roe,
        Metric::GrossMargin,
        Metric::RevenueGrowth,
        Metric::FreeCashFlow,
        Metric::DebtToEquity,
        Metric::EarningsStability,
    ];

    /// Human-readable column label.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Roic => "ROIC",
            Metric::Roe => "ROE",
            Metric::GrossMargin => "Gross Margin",
            Metric::RevenueGrowth => "Revenue Growth",
            Metric::FreeCashFlow => "Free Cash Flow",
            Metric::DebtToEquity => "Debt to Equity",
            Metric::EarningsStability => "Earnings Stability",
        }
    }

    /// Snake-case key used in CSV headers and JSON.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Roic => "roic",
            Metric::Roe => "roe",
            Metric::GrossMargin => "gross_margin",
            Metric::RevenueGrowth => "revenue_growth",
            Metric::FreeCashFlow => "free_cash_flow",
            Metric::DebtToEquity => "debt_to_equity",
            Metric::EarningsStability => "earnings_stability",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A metric value, or an explicit marker that the data was unavailable.
///
/// Missing is distinct from zero. Non-finite floats collapse to `Missing`
/// on construction so downstream comparisons never see NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum MetricValue {
    Value(f64),
    #[default]
    Missing,
}

impl MetricValue {
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            MetricValue::Value(value)
        } else {
            MetricValue::Missing
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(v),
            MetricValue::Missing => None,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, MetricValue::Missing)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::new(value)
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(MetricValue::Missing, MetricValue::new)
    }
}

impl From<MetricValue> for Option<f64> {
    fn from(value: MetricValue) -> Self {
        value.value()
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Value(v) => write!(f, "{v:.4}"),
            MetricValue::Missing => f.write_str("n/a"),
        }
    }
}
