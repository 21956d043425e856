//! Market data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over data sources (local files,
//! synthetic data, vendor adapters living outside this workspace) so the
//! screening and indicator pipelines can be driven and mocked uniformly.

use crate::domain::PriceBar;
use crate::fundamentals::FinancialSnapshot;
use chrono::NaiveDate;
use thiserror::Error;

/// Structured error types for data retrieval.
///
/// Displayable in CLI output and log lines. A retrieval error skips one
/// ticker; it never aborts a batch.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("invalid symbol '{symbol}'")]
    InvalidSymbol { symbol: String },

    #[error("no local data for '{symbol}' ({kind})")]
    NoLocalData { symbol: String, kind: &'static str },

    #[error("malformed data for '{symbol}': {reason}")]
    Malformed { symbol: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for market data providers.
///
/// Implementations handle the specifics of one source. Retry, backoff and
/// rate limiting belong inside the implementation, not in the callers.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Point-in-time ratios plus multi-period income and cash-flow statements.
    fn fetch_financial_snapshot(&self, symbol: &str) -> Result<FinancialSnapshot, DataError>;

    /// Daily bars for `start..=end`, in any order; callers normalise ordering.
    fn fetch_price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_the_symbol() {
        let err = DataError::NoLocalData {
            symbol: "600519.SH".into(),
            kind: "prices",
        };
        assert_eq!(err.to_string(), "no local data for '600519.SH' (prices)");

        let err = DataError::Malformed {
            symbol: "X".into(),
            reason: "bad row".into(),
        };
        assert!(err.to_string().contains("'X'"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(DataError::from(io), DataError::Io(_)));
    }
}
