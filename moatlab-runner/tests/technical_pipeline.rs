//! End-to-end: universe → price scan → indicator CSV → cross-sectional pick.

use chrono::NaiveDate;
use moatlab_core::data::{DataError, LocalStore, MarketDataProvider, Universe};
use moatlab_core::domain::PriceBar;
use moatlab_core::fundamentals::FinancialSnapshot;
use moatlab_core::selection::{cross_sectional_pick, AlignmentRule};
use moatlab_runner::{
    export_indicators_csv, import_indicators_csv, populate_store, scan_universe, ScanOptions,
    SyntheticProvider,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn window() -> ScanOptions {
    ScanOptions {
        start: d(2024, 9, 2),
        end: d(2025, 5, 21),
        parallel: true,
    }
}

fn universe(n: usize) -> Universe {
    Universe::from_symbols((0..n).map(|i| format!("{:06}", 600_000 + i)))
}

#[test]
fn reimported_scan_yields_identical_picks() {
    let report = scan_universe(&universe(40), &SyntheticProvider::new(), &window());
    let as_of = report.latest_date().unwrap();
    let direct = report.pick(as_of, &[], &AlignmentRule::default());

    let csv = export_indicators_csv(&report.batch).unwrap();
    let reloaded = import_indicators_csv(&csv).unwrap();
    let replayed = cross_sectional_pick(&reloaded, as_of, &[]);

    assert_eq!(direct, replayed);
}

#[test]
fn exclusion_list_applies() {
    let report = scan_universe(&universe(40), &SyntheticProvider::new(), &window());
    let as_of = report.latest_date().unwrap();
    let all = report.pick(as_of, &[], &AlignmentRule::default());
    if let Some(first) = all.first() {
        let exclude = vec![first.symbol.clone()];
        let rest = report.pick(as_of, &exclude, &AlignmentRule::default());
        assert_eq!(rest.len(), all.len() - 1);
        assert!(rest.iter().all(|p| p.symbol != first.symbol));
    }
}

#[test]
fn strict_rule_is_a_subset() {
    let report = scan_universe(&universe(40), &SyntheticProvider::new(), &window());
    let as_of = report.latest_date().unwrap();
    let loose = report.pick(as_of, &[], &AlignmentRule::default());
    let strict = report.pick(
        as_of,
        &[],
        &AlignmentRule {
            require_close_above_fast: true,
        },
    );
    assert!(strict.len() <= loose.len());
    for p in &strict {
        assert!(p.close >= p.ma5);
        assert!(loose.contains(p));
    }
}

/// Local store with one ticker missing: the scan reports it and continues.
#[test]
fn missing_prices_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    populate_store(&store, &["600000", "600002"], d(2024, 9, 2), d(2025, 5, 21)).unwrap();

    let u = Universe::from_symbols(["600000", "600001", "600002"]);
    let report = scan_universe(&u, &store, &window());
    let loaded: Vec<&str> = report.batch.iter().map(|t| t.symbol.as_str()).collect();
    assert_eq!(loaded, vec!["600000", "600002"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].symbol, "600001");
}

struct DuplicateDates;

impl MarketDataProvider for DuplicateDates {
    fn name(&self) -> &str {
        "duplicates"
    }

    fn fetch_financial_snapshot(&self, symbol: &str) -> Result<FinancialSnapshot, DataError> {
        Ok(FinancialSnapshot::new(symbol))
    }

    fn fetch_price_history(
        &self,
        _symbol: &str,
        start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError> {
        let bar = PriceBar {
            date: start,
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1.0,
            amount: 1.0,
        };
        Ok(vec![bar.clone(), bar])
    }
}

#[test]
fn duplicate_dates_are_a_ticker_failure() {
    let report = scan_universe(&Universe::from_symbols(["X"]), &DuplicateDates, &window());
    assert!(report.batch.is_empty());
    assert!(report.failures[0].error.contains("duplicate"));
}

struct NegativeClose;

impl MarketDataProvider for NegativeClose {
    fn name(&self) -> &str {
        "negative"
    }

    fn fetch_financial_snapshot(&self, symbol: &str) -> Result<FinancialSnapshot, DataError> {
        Ok(FinancialSnapshot::new(symbol))
    }

    fn fetch_price_history(
        &self,
        _symbol: &str,
        start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError> {
        Ok(vec![PriceBar {
            date: start,
            open: 1.0,
            high: 1.0,
            low: -2.0,
            close: -2.0,
            volume: 1.0,
            amount: 1.0,
        }])
    }
}

#[test]
fn malformed_bar_is_a_ticker_failure() {
    let report = scan_universe(&Universe::from_symbols(["X"]), &NegativeClose, &window());
    assert!(report.batch.is_empty());
    assert!(report.failures[0].error.contains("malformed bar"));
}
