//! Metric extraction from statement tables.
//!
//! Every function here is total: malformed or short tables produce
//! `MetricValue::Missing`, never an error or a panic.

use super::statement::{FinancialSnapshot, FinancialStatement};
use crate::domain::{Metric, MetricValue, TickerRecord};
use crate::stats::sample_std;

/// Number of periods the growth and stability measures look at.
pub const MIN_PERIODS: usize = 5;

/// Revenue growth across the most recent five periods.
///
/// `(revenue[4] - revenue[0]) / revenue[0]` with index 0 the oldest of the
/// five. Missing when fewer than five periods exist, either endpoint lacks
/// revenue, or the base is zero.
pub fn revenue_growth(statement: &FinancialStatement) -> MetricValue {
    let periods = statement.periods();
    if periods.len() < MIN_PERIODS {
        return MetricValue::Missing;
    }
    let window = &periods[periods.len() - MIN_PERIODS..];
    match (window[0].revenue, window[MIN_PERIODS - 1].revenue) {
        (Some(base), Some(last)) if base != 0.0 => MetricValue::new((last - base) / base),
        _ => MetricValue::Missing,
    }
}

/// Free cash flow of the latest period: operating cash flow plus capex.
///
/// Capex is already signed negative, so this is an addition. A period
/// without a capex line counts it as zero.
pub fn free_cash_flow(cash_flow: &FinancialStatement) -> MetricValue {
    let Some(latest) = cash_flow.latest() else {
        return MetricValue::Missing;
    };
    match latest.operating_cash_flow {
        Some(cfo) => MetricValue::new(cfo + latest.capital_expenditures.unwrap_or(0.0)),
        None => MetricValue::Missing,
    }
}

/// Sample standard deviation of period-over-period earnings changes.
///
/// Needs five periods with reported earnings. A 0 -> 0 change is undefined
/// and dropped. Any change off a zero base to a nonzero value is infinite
/// and makes the whole measure Missing, as do fewer than two usable changes.
pub fn earnings_stability(statement: &FinancialStatement) -> MetricValue {
    let earnings: Vec<f64> = statement
        .periods()
        .iter()
        .filter_map(|p| p.net_income)
        .filter(|v| v.is_finite())
        .collect();
    if earnings.len() < MIN_PERIODS {
        return MetricValue::Missing;
    }

    let changes: Vec<f64> = earnings
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .filter(|c| !c.is_nan())
        .collect();
    if changes.iter().any(|c| c.is_infinite()) {
        return MetricValue::Missing;
    }

    sample_std(&changes).map_or(MetricValue::Missing, MetricValue::new)
}

/// Build the full seven-metric record for a snapshot.
pub fn extract_record(snapshot: &FinancialSnapshot) -> TickerRecord {
    let info = &snapshot.info;
    TickerRecord::new(snapshot.symbol.clone())
        .with(Metric::Roic, info.return_on_invested_capital)
        .with(Metric::Roe, info.return_on_equity)
        .with(Metric::GrossMargin, info.gross_margin)
        .with(Metric::RevenueGrowth, revenue_growth(&snapshot.income_statement))
        .with(Metric::FreeCashFlow, free_cash_flow(&snapshot.cash_flow))
        .with(Metric::DebtToEquity, info.debt_to_equity)
        .with(
            Metric::EarningsStability,
            earnings_stability(&snapshot.income_statement),
        )
}
