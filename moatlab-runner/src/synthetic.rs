//! Deterministic synthetic market data.
//!
//! Each symbol gets its own RNG seeded from the BLAKE3 hash of its name, so
//! the same symbol always yields the same prices and fundamentals. Prices
//! are a random walk with a per-symbol drift, generated from a fixed epoch
//! so that any window of the same symbol is a slice of one path. Weekends
//! are skipped.
//!
//! Synthetic data is a developer and test aid. It is clearly fake.

use chrono::{Datelike, NaiveDate, Weekday};
use moatlab_core::data::{DataError, LocalStore, MarketDataProvider};
use moatlab_core::domain::PriceBar;
use moatlab_core::fundamentals::{
    FinancialSnapshot, FinancialStatement, InfoSnapshot, StatementPeriod,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// First date of every synthetic price path.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

/// Number of annual statement periods generated per symbol.
const STATEMENT_YEARS: i32 = 5;
const LAST_FISCAL_YEAR: i32 = 2024;

#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider;

impl SyntheticProvider {
    pub fn new() -> Self {
        Self
    }
}

fn rng_for(symbol: &str, stream: &str) -> StdRng {
    let mut hasher = blake3::Hasher::new();
    hasher.update(stream.as_bytes());
    hasher.update(b":");
    hasher.update(symbol.as_bytes());
    StdRng::from_seed(*hasher.finalize().as_bytes())
}

/// Daily bars for `symbol` on weekdays in `start..=end`.
pub fn generate_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    let mut rng = rng_for(symbol, "prices");
    let drift: f64 = rng.gen_range(-0.0008..0.0012);
    let mut price: f64 = rng.gen_range(5.0..200.0);

    let mut bars = Vec::new();
    let mut current = epoch();
    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return = drift + rng.gen_range(-0.025..0.025);
        let open = price;
        let close = (price * (1.0 + daily_return)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000.0..5_000_000.0_f64).round();

        if current >= start {
            bars.push(PriceBar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
                amount: volume * (open + close) / 2.0,
            });
        }

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

/// Ratios plus five annual statement periods for `symbol`.
///
/// ROIC and gross margin are in percent points; ROE and debt/equity are
/// fractions, matching the units the scorer and the screen expect.
pub fn generate_snapshot(symbol: &str) -> FinancialSnapshot {
    let mut rng = rng_for(symbol, "fundamentals");

    let info = InfoSnapshot {
        return_on_invested_capital: Some(rng.gen_range(-5.0..30.0)),
        return_on_equity: Some(rng.gen_range(-0.05..0.40)),
        gross_margin: Some(rng.gen_range(10.0..75.0)),
        debt_to_equity: Some(rng.gen_range(0.0..2.5)),
    };

    let growth: f64 = rng.gen_range(-0.05..0.20);
    let margin: f64 = rng.gen_range(0.02..0.25);
    let mut revenue: f64 = rng.gen_range(1.0e8..5.0e10);

    let mut income = Vec::new();
    let mut cash_flow = Vec::new();
    for year in (LAST_FISCAL_YEAR - STATEMENT_YEARS + 1)..=LAST_FISCAL_YEAR {
        let Some(period_end) = NaiveDate::from_ymd_opt(year, 12, 31) else {
            continue;
        };
        let net_income = revenue * margin * (1.0 + rng.gen_range(-0.15..0.15));
        income.push(StatementPeriod {
            revenue: Some(revenue),
            net_income: Some(net_income),
            ..StatementPeriod::new(period_end)
        });
        let operating_cash_flow = net_income * rng.gen_range(0.8..1.4);
        cash_flow.push(StatementPeriod {
            operating_cash_flow: Some(operating_cash_flow),
            capital_expenditures: Some(-revenue * rng.gen_range(0.01..0.12)),
            ..StatementPeriod::new(period_end)
        });
        revenue *= 1.0 + growth + rng.gen_range(-0.03..0.03);
    }

    FinancialSnapshot {
        symbol: symbol.to_string(),
        info,
        income_statement: FinancialStatement::new(income),
        cash_flow: FinancialStatement::new(cash_flow),
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_financial_snapshot(&self, symbol: &str) -> Result<FinancialSnapshot, DataError> {
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidSymbol {
                symbol: symbol.to_string(),
            });
        }
        Ok(generate_snapshot(symbol))
    }

    fn fetch_price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError> {
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidSymbol {
                symbol: symbol.to_string(),
            });
        }
        Ok(generate_bars(symbol, start, end))
    }
}

/// Write synthetic prices and fundamentals for `symbols` into a local store.
pub fn populate_store(
    store: &LocalStore,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<usize, DataError> {
    for symbol in symbols {
        store.write_prices(symbol, &generate_bars(symbol, start, end))?;
        store.write_snapshot(&generate_snapshot(symbol))?;
        tracing::debug!(symbol, "synthetic data written");
    }
    Ok(symbols.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use moatlab_core::fundamentals::extract_record;
    use moatlab_core::domain::Metric;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn deterministic_per_symbol() {
        let a = generate_bars("AAPL", d(2024, 1, 1), d(2024, 3, 1));
        let b = generate_bars("AAPL", d(2024, 1, 1), d(2024, 3, 1));
        let c = generate_bars("MSFT", d(2024, 1, 1), d(2024, 3, 1));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(generate_snapshot("AAPL"), generate_snapshot("AAPL"));
    }

    #[test]
    fn windows_are_slices_of_one_path() {
        let wide = generate_bars("X", d(2024, 1, 1), d(2024, 6, 30));
        let narrow = generate_bars("X", d(2024, 3, 1), d(2024, 3, 31));
        let start = wide.iter().position(|b| b.date == narrow[0].date).unwrap();
        assert_eq!(&wide[start..start + narrow.len()], narrow.as_slice());
    }

    #[test]
    fn skips_weekends_and_bars_are_sane() {
        let bars = generate_bars("X", d(2024, 1, 1), d(2024, 12, 31));
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(bars.iter().all(PriceBar::is_sane));
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn snapshot_extracts_every_metric() {
        let record = extract_record(&generate_snapshot("TEST"));
        for metric in Metric::ALL {
            assert!(!record.get(metric).is_missing(), "{metric} missing");
        }
    }

    #[test]
    fn populate_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let n = populate_store(&store, &["A", "B"], d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            store.fetch_price_history("A", d(2024, 1, 1), d(2024, 2, 1)).unwrap(),
            generate_bars("A", d(2024, 1, 1), d(2024, 2, 1))
        );
        let loaded = store.fetch_financial_snapshot("B").unwrap();
        let expected = generate_snapshot("B");
        assert_eq!(loaded.symbol, "B");
        assert_eq!(loaded.income_statement.len(), expected.income_statement.len());
        assert_eq!(loaded.cash_flow.len(), expected.cash_flow.len());
    }
}
