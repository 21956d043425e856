//! Fundamental data: statement tables and metric extraction.

pub mod extract;
pub mod statement;

pub use extract::{earnings_stability, extract_record, free_cash_flow, revenue_growth};
pub use statement::{FinancialSnapshot, FinancialStatement, InfoSnapshot, StatementPeriod};
