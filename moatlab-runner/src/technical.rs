//! Batch indicator scan and the cross-sectional pick on top of it.
//!
//! Price history for each universe member is fetched and turned into
//! indicator rows independently. Failures (fetch errors, duplicate dates,
//! empty histories) are per ticker and never abort the scan.

use chrono::NaiveDate;
use moatlab_core::data::{bare_code, DataError, MarketDataProvider, Universe};
use moatlab_core::domain::{PriceSeries, SeriesError};
use moatlab_core::indicators::TickerIndicators;
use moatlab_core::selection::{pick_with_rule, AlignmentRule, Pick};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::screener::Failure;

/// Why a single ticker dropped out of the scan.
#[derive(Debug, Error)]
pub enum TickerError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("no bars for '{symbol}' in {start}..={end}")]
    Empty {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub parallel: bool,
}

/// Indicator rows for every ticker that loaded, in universe order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub batch: Vec<TickerIndicators>,
    pub failures: Vec<Failure>,
}

impl ScanReport {
    /// Latest bar date across the batch; the natural evaluation date when
    /// none is configured.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.batch
            .iter()
            .filter_map(|t| t.rows.last().map(|r| r.date()))
            .max()
    }

    /// Batch symbols named by `exclude`, matched on the bare exchange code
    /// so `600519` and `600519.SH` exclude each other in either direction.
    pub fn excluded_symbols(&self, exclude: &[String]) -> Vec<String> {
        self.batch
            .iter()
            .filter(|t| {
                let code = bare_code(&t.symbol);
                exclude.iter().any(|e| bare_code(e) == code)
            })
            .map(|t| t.symbol.clone())
            .collect()
    }

    pub fn pick(&self, as_of: NaiveDate, exclude: &[String], rule: &AlignmentRule) -> Vec<Pick> {
        let picks = pick_with_rule(&self.batch, as_of, exclude, rule);
        tracing::info!(
            %as_of,
            scanned = self.batch.len(),
            picked = picks.len(),
            "cross-sectional pick"
        );
        picks
    }
}

/// Fetch and compute indicators for one ticker.
pub fn scan_ticker(
    symbol: &str,
    name: Option<&str>,
    provider: &dyn MarketDataProvider,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<TickerIndicators, TickerError> {
    let bars = provider.fetch_price_history(symbol, start, end)?;
    if bars.is_empty() {
        return Err(TickerError::Empty {
            symbol: symbol.to_string(),
            start,
            end,
        });
    }
    let series = PriceSeries::new(symbol, bars)?;
    tracing::debug!(symbol, bars = series.len(), "indicators computed");
    let indicators = TickerIndicators::from_series(&series);
    Ok(match name {
        Some(n) => indicators.with_name(n),
        None => indicators,
    })
}

/// Scan every member of `universe`.
pub fn scan_universe(
    universe: &Universe,
    provider: &dyn MarketDataProvider,
    options: &ScanOptions,
) -> ScanReport {
    tracing::info!(
        tickers = universe.len(),
        provider = provider.name(),
        start = %options.start,
        end = %options.end,
        "indicator scan started"
    );

    let scan = |m: &moatlab_core::data::Member| {
        (
            m.symbol.clone(),
            scan_ticker(&m.symbol, m.name.as_deref(), provider, options.start, options.end),
        )
    };
    let results: Vec<(String, Result<TickerIndicators, TickerError>)> = if options.parallel {
        universe.members.par_iter().map(scan).collect()
    } else {
        universe.members.iter().map(scan).collect()
    };

    let mut report = ScanReport::default();
    for (symbol, result) in results {
        match result {
            Ok(indicators) => report.batch.push(indicators),
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "ticker skipped");
                report.failures.push(Failure {
                    symbol,
                    error: e.to_string(),
                });
            }
        }
    }
    tracing::info!(
        loaded = report.batch.len(),
        failed = report.failures.len(),
        "indicator scan finished"
    );
    report
}
