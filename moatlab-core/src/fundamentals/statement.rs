//! Financial statement tables and the point-in-time info snapshot.
//!
//! Providers deliver statement columns in whatever order they like (most
//! vendors go newest-first). Every table is normalised to chronological
//! order on construction so the extractors never depend on provider order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One reporting period of a statement. Absent line items are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub period_end: NaiveDate,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub net_income: Option<f64>,
    #[serde(default)]
    pub operating_cash_flow: Option<f64>,
    /// Stored as a negative number when cash leaves the business.
    #[serde(default)]
    pub capital_expenditures: Option<f64>,
}

impl StatementPeriod {
    pub fn new(period_end: NaiveDate) -> Self {
        Self {
            period_end,
            revenue: None,
            net_income: None,
            operating_cash_flow: None,
            capital_expenditures: None,
        }
    }
}

/// Multi-period statement, oldest period first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<StatementPeriod>", into = "Vec<StatementPeriod>")]
pub struct FinancialStatement {
    periods: Vec<StatementPeriod>,
}

impl FinancialStatement {
    pub fn new(mut periods: Vec<StatementPeriod>) -> Self {
        periods.sort_by_key(|p| p.period_end);
        Self { periods }
    }

    /// Periods in chronological order.
    pub fn periods(&self) -> &[StatementPeriod] {
        &self.periods
    }

    pub fn latest(&self) -> Option<&StatementPeriod> {
        self.periods.last()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

impl From<Vec<StatementPeriod>> for FinancialStatement {
    fn from(periods: Vec<StatementPeriod>) -> Self {
        Self::new(periods)
    }
}

impl From<FinancialStatement> for Vec<StatementPeriod> {
    fn from(statement: FinancialStatement) -> Self {
        statement.periods
    }
}

/// Point-in-time ratios as reported by the provider, in the provider's units.
///
/// ROIC, ROE and gross margin feed the percent-point scoring ladders; the
/// screening predicate compares ROE and debt/equity as fractions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoSnapshot {
    #[serde(default)]
    pub return_on_invested_capital: Option<f64>,
    #[serde(default)]
    pub return_on_equity: Option<f64>,
    #[serde(default)]
    pub gross_margin: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
}

/// Everything a provider returns about one ticker's fundamentals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    /// Filled from the file name by the local store when absent.
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub info: InfoSnapshot,
    #[serde(default)]
    pub income_statement: FinancialStatement,
    #[serde(default)]
    pub cash_flow: FinancialStatement,
}

impl FinancialSnapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            info: InfoSnapshot::default(),
            income_statement: FinancialStatement::default(),
            cash_flow: FinancialStatement::default(),
        }
    }
}
