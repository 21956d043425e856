//! Cross-sectional selection: one date, many tickers.
//!
//! Picks tickers whose moving averages are in bullish alignment
//! (MA5 ≥ MA20 ≥ MA60) on a fixed evaluation date. A ticker that did not
//! trade that day, or whose averages are not all defined yet, does not
//! qualify.

use crate::indicators::{IndicatorRow, TickerIndicators};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Options for the alignment screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentRule {
    /// Additionally require close ≥ MA5.
    pub require_close_above_fast: bool,
}

impl AlignmentRule {
    pub fn matches(&self, row: &IndicatorRow) -> bool {
        let Some((ma5, ma20, ma60)) = row.moving_averages() else {
            return false;
        };
        let aligned = ma5 >= ma20 && ma20 >= ma60;
        aligned && (!self.require_close_above_fast || row.close() >= ma5)
    }
}

/// A selected ticker with the values that qualified it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub symbol: String,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub close: f64,
    pub ma5: f64,
    pub ma20: f64,
    pub ma60: f64,
}

/// Select aligned tickers on `as_of`, skipping anything in `exclude`.
///
/// Output keeps the batch order; a symbol appearing twice is picked once.
pub fn cross_sectional_pick(
    batch: &[TickerIndicators],
    as_of: NaiveDate,
    exclude: &[String],
) -> Vec<Pick> {
    pick_with_rule(batch, as_of, exclude, &AlignmentRule::default())
}

pub fn pick_with_rule(
    batch: &[TickerIndicators],
    as_of: NaiveDate,
    exclude: &[String],
    rule: &AlignmentRule,
) -> Vec<Pick> {
    let excluded: HashSet<&str> = exclude.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    batch
        .iter()
        .filter(|t| !excluded.contains(t.symbol.as_str()))
        .filter_map(|t| {
            let row = t.row_on(as_of)?;
            if !rule.matches(row) {
                return None;
            }
            let (ma5, ma20, ma60) = row.moving_averages()?;
            Some((t, row, ma5, ma20, ma60))
        })
        .filter(|(t, ..)| seen.insert(t.symbol.as_str()))
        .map(|(t, row, ma5, ma20, ma60)| Pick {
            symbol: t.symbol.clone(),
            name: t.name.clone(),
            date: row.date(),
            close: row.close(),
            ma5,
            ma20,
            ma60,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceBar;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    fn row(day: u32, close: f64, mas: (Option<f64>, Option<f64>, Option<f64>)) -> IndicatorRow {
        IndicatorRow {
            bar: PriceBar {
                date: date(day),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
                amount: 0.0,
            },
            ma5: mas.0,
            ma20: mas.1,
            ma60: mas.2,
            daily_return: None,
            volatility: None,
        }
    }

    fn ticker(symbol: &str, rows: Vec<IndicatorRow>) -> TickerIndicators {
        TickerIndicators {
            symbol: symbol.into(),
            name: None,
            rows,
        }
    }

    #[test]
    fn selects_aligned_tickers_in_batch_order() {
        let batch = vec![
            ticker("B", vec![row(20, 12.0, (Some(12.0), Some(11.0), Some(10.0)))]),
            ticker("A", vec![row(20, 12.0, (Some(10.0), Some(11.0), Some(12.0)))]),
            ticker("C", vec![row(20, 10.0, (Some(10.0), Some(10.0), Some(10.0)))]),
        ];
        let picks = cross_sectional_pick(&batch, date(20), &[]);
        let symbols: Vec<&str> = picks.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["B", "C"]);
        assert_eq!(picks[0].ma20, 11.0);
    }

    #[test]
    fn excludes_undefined_moving_averages() {
        let batch = vec![ticker("NEW", vec![row(20, 5.0, (Some(5.0), Some(4.0), None))])];
        assert!(cross_sectional_pick(&batch, date(20), &[]).is_empty());
    }

    #[test]
    fn uses_only_the_evaluation_date() {
        let batch = vec![ticker(
            "X",
            vec![
                row(19, 5.0, (Some(3.0), Some(2.0), Some(1.0))),
                row(20, 5.0, (Some(1.0), Some(2.0), Some(3.0))),
            ],
        )];
        assert!(cross_sectional_pick(&batch, date(20), &[]).is_empty());
        assert_eq!(cross_sectional_pick(&batch, date(19), &[]).len(), 1);
        assert!(cross_sectional_pick(&batch, date(21), &[]).is_empty());
    }

    #[test]
    fn excluded_symbol_is_skipped() {
        let aligned = (Some(3.0), Some(2.0), Some(1.0));
        let batch = vec![
            ticker("600519", vec![row(20, 5.0, aligned)]),
            ticker("000001", vec![row(20, 5.0, aligned)]),
        ];
        let picks = cross_sectional_pick(&batch, date(20), &["600519".to_string()]);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].symbol, "000001");
    }

    #[test]
    fn close_above_fast_rule() {
        let batch = vec![ticker("X", vec![row(20, 2.5, (Some(3.0), Some(2.0), Some(1.0)))])];
        let strict = AlignmentRule {
            require_close_above_fast: true,
        };
        assert_eq!(cross_sectional_pick(&batch, date(20), &[]).len(), 1);
        assert!(pick_with_rule(&batch, date(20), &[], &strict).is_empty());
    }

    #[test]
    fn duplicate_symbols_picked_once() {
        let aligned = (Some(3.0), Some(2.0), Some(1.0));
        let batch = vec![
            ticker("X", vec![row(20, 5.0, aligned)]),
            ticker("X", vec![row(20, 5.0, aligned)]),
        ];
        assert_eq!(cross_sectional_pick(&batch, date(20), &[]).len(), 1);
    }
}
