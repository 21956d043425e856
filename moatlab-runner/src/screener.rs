//! Batch fundamental screen over a provider.
//!
//! Each ticker is fetched, extracted, scored and tested against the
//! criteria independently. Work fans out across the rayon pool; results are
//! collected back in input order. A ticker whose fetch fails is logged and
//! recorded as a failure, and the batch carries on.

use std::collections::HashSet;

use moatlab_core::data::{DataError, MarketDataProvider};
use moatlab_core::domain::TickerRecord;
use moatlab_core::fundamentals::extract_record;
use moatlab_core::scoring::{score, ScoreCard};
use moatlab_core::screening::{CriteriaError, CriteriaSet, Rejection};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current report schema version. Bumped when the serialized layout changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("invalid criteria: {0}")]
    Criteria(#[from] CriteriaError),
}

/// How the batch is run and how the admitted list is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenOptions {
    /// Order admitted tickers by descending moat score instead of input order.
    pub rank_by_moat: bool,
    /// Fan tickers out across the rayon pool.
    pub parallel: bool,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            rank_by_moat: false,
            parallel: true,
        }
    }
}

/// One successfully evaluated ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    pub record: TickerRecord,
    pub card: ScoreCard,
    /// Failed predicates; empty means admitted.
    pub rejections: Vec<Rejection>,
}

impl Candidate {
    pub fn admitted(&self) -> bool {
        self.rejections.is_empty()
    }

    pub fn moat_score(&self) -> f64 {
        self.card.moat_score
    }
}

/// A ticker that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub symbol: String,
    pub error: String,
}

/// Outcome of a screen run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenReport {
    pub schema_version: u32,
    pub provider: String,
    pub criteria: CriteriaSet,
    pub options: ScreenOptions,
    /// Every evaluated ticker, in input order.
    pub candidates: Vec<Candidate>,
    pub failures: Vec<Failure>,
}

impl ScreenReport {
    /// Admitted candidates: input order, or descending moat score when the
    /// run asked for ranking (ties keep input order).
    pub fn admitted(&self) -> Vec<&Candidate> {
        let mut admitted: Vec<&Candidate> =
            self.candidates.iter().filter(|c| c.admitted()).collect();
        if self.options.rank_by_moat {
            admitted.sort_by(|a, b| b.moat_score().total_cmp(&a.moat_score()));
        }
        admitted
    }

    pub fn admitted_symbols(&self) -> Vec<&str> {
        self.admitted().into_iter().map(|c| c.symbol.as_str()).collect()
    }

    pub fn rejected(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| !c.admitted())
    }
}

/// Evaluate one ticker without touching the criteria pass/fail summary.
pub fn evaluate_ticker(
    symbol: &str,
    provider: &dyn MarketDataProvider,
    criteria: &CriteriaSet,
) -> Result<Candidate, DataError> {
    let snapshot = provider.fetch_financial_snapshot(symbol)?;
    let mut record = extract_record(&snapshot);
    record.symbol = symbol.to_string();
    let card = score(&record);
    let rejections = criteria.rejections(&record);
    tracing::debug!(
        symbol,
        moat_score = card.moat_score,
        defined = record.defined_count(),
        admitted = rejections.is_empty(),
        "evaluated"
    );
    Ok(Candidate {
        symbol: symbol.to_string(),
        record,
        card,
        rejections,
    })
}

/// Screen `tickers` against `criteria`.
///
/// Criteria are validated before any fetch. Duplicate tickers are evaluated
/// once, at their first position.
pub fn filter_candidates(
    tickers: &[String],
    provider: &dyn MarketDataProvider,
    criteria: &CriteriaSet,
    options: &ScreenOptions,
) -> Result<ScreenReport, ScreenError> {
    criteria.validate()?;

    let mut seen = HashSet::new();
    let unique: Vec<&str> = tickers
        .iter()
        .map(String::as_str)
        .filter(|t| seen.insert(*t))
        .collect();

    tracing::info!(
        tickers = unique.len(),
        provider = provider.name(),
        parallel = options.parallel,
        "screen started"
    );

    let evaluate = |symbol: &&str| (symbol.to_string(), evaluate_ticker(symbol, provider, criteria));
    let results: Vec<(String, Result<Candidate, DataError>)> = if options.parallel {
        unique.par_iter().map(evaluate).collect()
    } else {
        unique.iter().map(evaluate).collect()
    };

    let mut candidates = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (symbol, result) in results {
        match result {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "ticker skipped");
                failures.push(Failure {
                    symbol,
                    error: e.to_string(),
                });
            }
        }
    }

    let report = ScreenReport {
        schema_version: SCHEMA_VERSION,
        provider: provider.name().to_string(),
        criteria: criteria.clone(),
        options: *options,
        candidates,
        failures,
    };
    tracing::info!(
        evaluated = report.candidates.len(),
        admitted = report.admitted().len(),
        failed = report.failures.len(),
        "screen finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use moatlab_core::domain::PriceBar;
    use moatlab_core::fundamentals::{FinancialSnapshot, FinancialStatement, StatementPeriod};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        snapshots: HashMap<String, FinancialSnapshot>,
        calls: AtomicUsize,
    }

    impl MarketDataProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn fetch_financial_snapshot(&self, symbol: &str) -> Result<FinancialSnapshot, DataError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.snapshots
                .get(symbol)
                .cloned()
                .ok_or_else(|| DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
        }

        fn fetch_price_history(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<PriceBar>, DataError> {
            Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }
    }

    fn snapshot(symbol: &str, de: f64, roe: f64, roic: f64) -> FinancialSnapshot {
        let mut s = FinancialSnapshot::new(symbol);
        s.info.debt_to_equity = Some(de);
        s.info.return_on_equity = Some(roe);
        s.info.return_on_invested_capital = Some(roic);
        s.income_statement = FinancialStatement::new(
            [100.0, 110.0, 120.0, 130.0, 150.0]
                .iter()
                .enumerate()
                .map(|(i, &rev)| StatementPeriod {
                    revenue: Some(rev),
                    ..StatementPeriod::new(NaiveDate::from_ymd_opt(2020 + i as i32, 12, 31).unwrap())
                })
                .collect(),
        );
        s.cash_flow = FinancialStatement::new(vec![StatementPeriod {
            operating_cash_flow: Some(1_000.0),
            capital_expenditures: Some(-200.0),
            ..StatementPeriod::new(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
        }]);
        s
    }

    fn provider() -> MockProvider {
        let snapshots = [
            snapshot("LOW", 0.3, 0.25, 6.0),
            snapshot("HIGH", 0.2, 0.30, 20.0),
            snapshot("DEBT", 1.2, 0.25, 20.0),
        ]
        .into_iter()
        .map(|s| (s.symbol.clone(), s))
        .collect();
        MockProvider {
            snapshots,
            calls: AtomicUsize::new(0),
        }
    }

    fn tickers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn admitted_in_input_order() {
        let report = filter_candidates(
            &tickers(&["LOW", "DEBT", "HIGH"]),
            &provider(),
            &CriteriaSet::default(),
            &ScreenOptions::default(),
        )
        .unwrap();
        assert_eq!(report.admitted_symbols(), vec!["LOW", "HIGH"]);
        let rejected: Vec<&str> = report.rejected().map(|c| c.symbol.as_str()).collect();
        assert_eq!(rejected, vec!["DEBT"]);
    }

    #[test]
    fn rank_by_moat_sorts_descending() {
        let options = ScreenOptions {
            rank_by_moat: true,
            parallel: false,
        };
        let report = filter_candidates(
            &tickers(&["LOW", "HIGH"]),
            &provider(),
            &CriteriaSet::default(),
            &options,
        )
        .unwrap();
        assert_eq!(report.admitted_symbols(), vec!["HIGH", "LOW"]);
    }

    #[test]
    fn failures_are_isolated() {
        let report = filter_candidates(
            &tickers(&["MISSING", "LOW"]),
            &provider(),
            &CriteriaSet::default(),
            &ScreenOptions::default(),
        )
        .unwrap();
        assert_eq!(report.admitted_symbols(), vec!["LOW"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].symbol, "MISSING");
    }

    #[test]
    fn duplicates_fetched_once() {
        let p = provider();
        let report = filter_candidates(
            &tickers(&["LOW", "LOW", "HIGH", "LOW"]),
            &p,
            &CriteriaSet::default(),
            &ScreenOptions::default(),
        )
        .unwrap();
        assert_eq!(report.candidates.len(), 2);
        assert_eq!(p.calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn invalid_criteria_fail_before_fetching() {
        let p = provider();
        let criteria = CriteriaSet {
            min_roe: -1.0,
            ..CriteriaSet::default()
        };
        let err = filter_candidates(&tickers(&["LOW"]), &p, &criteria, &ScreenOptions::default())
            .unwrap_err();
        assert!(matches!(err, ScreenError::Criteria(CriteriaError::Negative { .. })));
        assert_eq!(p.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn sequential_matches_parallel() {
        let list = tickers(&["HIGH", "DEBT", "MISSING", "LOW"]);
        let run = |parallel| {
            filter_candidates(
                &list,
                &provider(),
                &CriteriaSet::default(),
                &ScreenOptions {
                    rank_by_moat: false,
                    parallel,
                },
            )
            .unwrap()
        };
        let (a, b) = (run(true), run(false));
        assert_eq!(a.candidates, b.candidates);
        assert_eq!(a.failures, b.failures);
    }
}
