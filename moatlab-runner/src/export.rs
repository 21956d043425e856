//! Export: CSV tables and JSON reports.
//!
//! Provides:
//! - **CSV**: screen results, indicator rows, daily percent changes, picks
//! - **JSON**: full screen report with schema versioning
//!
//! Indicator CSV re-imports losslessly: floats are written in shortest
//! round-trip form and an empty cell means "undefined". Unknown report
//! schema versions are rejected on load.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use moatlab_core::domain::{Metric, PriceBar};
use moatlab_core::indicators::{IndicatorRow, TickerIndicators};
use moatlab_core::selection::Pick;
use serde::Deserialize;

use crate::screener::{ScreenReport, SCHEMA_VERSION};

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ScreenReport` to pretty JSON.
pub fn export_report_json(report: &ScreenReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScreenReport to JSON")
}

/// Deserialize a `ScreenReport`, rejecting unknown schema versions.
pub fn import_report_json(json: &str) -> Result<ScreenReport> {
    let report: ScreenReport =
        serde_json::from_str(json).context("failed to deserialize ScreenReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── Screen CSV ─────────────────────────────────────────────────────

/// One row per evaluated ticker, in input order.
///
/// Columns: symbol, the seven metric values, the seven scores, moat_score,
/// admitted, rejections (`;`-separated).
pub fn export_screen_csv(report: &ScreenReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["symbol".to_string()];
    header.extend(Metric::ALL.iter().map(|m| m.key().to_string()));
    header.extend(Metric::ALL.iter().map(|m| format!("{}_score", m.key())));
    header.extend(["moat_score", "admitted", "rejections"].map(String::from));
    wtr.write_record(&header)?;

    for c in &report.candidates {
        let mut row = vec![c.symbol.clone()];
        row.extend(Metric::ALL.iter().map(|&m| cell(c.record.get(m).value())));
        row.extend(Metric::ALL.iter().map(|&m| c.card.get(m).to_string()));
        row.push(format!("{:.4}", c.moat_score()));
        row.push(c.admitted().to_string());
        row.push(
            c.rejections
                .iter()
                .map(|r| r.metric().key())
                .collect::<Vec<_>>()
                .join(";"),
        );
        wtr.write_record(&row)?;
    }

    finish(wtr)
}

// ─── Indicator CSV ──────────────────────────────────────────────────

const INDICATOR_HEADER: [&str; 14] = [
    "symbol",
    "name",
    "date",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "amount",
    "ma5",
    "ma20",
    "ma60",
    "daily_return",
    "volatility",
];

/// Every indicator row of every ticker, tickers in batch order.
pub fn export_indicators_csv(batch: &[TickerIndicators]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(INDICATOR_HEADER)?;
    for t in batch {
        let name = t.name.as_deref().unwrap_or("");
        for r in &t.rows {
            wtr.write_record([
                t.symbol.as_str(),
                name,
                &r.date().to_string(),
                &r.bar.open.to_string(),
                &r.bar.high.to_string(),
                &r.bar.low.to_string(),
                &r.bar.close.to_string(),
                &r.bar.volume.to_string(),
                &r.bar.amount.to_string(),
                &cell(r.ma5),
                &cell(r.ma20),
                &cell(r.ma60),
                &cell(r.daily_return),
                &cell(r.volatility),
            ])?;
        }
    }
    finish(wtr)
}

#[derive(Deserialize)]
struct IndicatorCsvRow {
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    amount: f64,
    ma5: Option<f64>,
    ma20: Option<f64>,
    ma60: Option<f64>,
    daily_return: Option<f64>,
    volatility: Option<f64>,
}

/// Parse an indicator CSV written by [`export_indicators_csv`] back into
/// per-ticker batches, so a saved scan can be re-filtered without refetching.
///
/// Tickers keep first-appearance order; rows are sorted by date.
pub fn import_indicators_csv(text: &str) -> Result<Vec<TickerIndicators>> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    let mut batch: Vec<TickerIndicators> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (line, record) in rdr.deserialize::<IndicatorCsvRow>().enumerate() {
        let row = record.with_context(|| format!("bad indicator row {}", line + 2))?;
        let slot = *index.entry(row.symbol.clone()).or_insert_with(|| {
            batch.push(TickerIndicators {
                symbol: row.symbol.clone(),
                name: None,
                rows: Vec::new(),
            });
            batch.len() - 1
        });
        let ticker = &mut batch[slot];
        if ticker.name.is_none() {
            ticker.name = row.name.filter(|n| !n.is_empty());
        }
        ticker.rows.push(IndicatorRow {
            bar: PriceBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
                amount: row.amount,
            },
            ma5: row.ma5,
            ma20: row.ma20,
            ma60: row.ma60,
            daily_return: row.daily_return,
            volatility: row.volatility,
        });
    }

    for ticker in &mut batch {
        ticker.rows.sort_by_key(IndicatorRow::date);
        if let Some(w) = ticker.rows.windows(2).find(|w| w[0].date() == w[1].date()) {
            bail!("duplicate date {} for '{}'", w[0].date(), ticker.symbol);
        }
    }
    Ok(batch)
}

/// Daily percent change per ticker: `daily_return × 100`, empty when undefined.
///
/// Columns: symbol, date, close, pct_change
pub fn export_pct_change_csv(batch: &[TickerIndicators]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["symbol", "date", "close", "pct_change"])?;
    for t in batch {
        for r in &t.rows {
            wtr.write_record([
                t.symbol.as_str(),
                &r.date().to_string(),
                &r.close().to_string(),
                &r.daily_return.map(|v| format!("{:.4}", v * 100.0)).unwrap_or_default(),
            ])?;
        }
    }
    finish(wtr)
}

// ─── Picks CSV ──────────────────────────────────────────────────────

/// Columns: symbol, name, date, close, ma5, ma20, ma60
pub fn export_picks_csv(picks: &[Pick]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["symbol", "name", "date", "close", "ma5", "ma20", "ma60"])?;
    for p in picks {
        wtr.write_record([
            p.symbol.as_str(),
            p.name.as_deref().unwrap_or(""),
            &p.date.to_string(),
            &format!("{:.4}", p.close),
            &format!("{:.4}", p.ma5),
            &format!("{:.4}", p.ma20),
            &format!("{:.4}", p.ma60),
        ])?;
    }
    finish(wtr)
}
