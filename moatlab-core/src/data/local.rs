//! File-backed provider over a local data directory.
//!
//! Layout:
//! - `{root}/prices/{SYMBOL}.csv` with columns `date,open,high,low,close,volume,amount`
//! - `{root}/fundamentals/{SYMBOL}.json` holding a `FinancialSnapshot`
//!
//! Writes are atomic (write to .tmp, rename into place).

use super::provider::{DataError, MarketDataProvider};
use crate::domain::PriceBar;
use crate::fundamentals::FinancialSnapshot;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn prices_path(&self, symbol: &str) -> Result<PathBuf, DataError> {
        check_symbol(symbol)?;
        Ok(self.root.join("prices").join(format!("{symbol}.csv")))
    }

    fn snapshot_path(&self, symbol: &str) -> Result<PathBuf, DataError> {
        check_symbol(symbol)?;
        Ok(self.root.join("fundamentals").join(format!("{symbol}.json")))
    }

    /// Write the full price history for a symbol, replacing any existing file.
    pub fn write_prices(&self, symbol: &str, bars: &[PriceBar]) -> Result<(), DataError> {
        let path = self.prices_path(symbol)?;
        let mut wtr = csv::Writer::from_writer(vec![]);
        for bar in bars {
            wtr.serialize(bar).map_err(|e| malformed(symbol, e))?;
        }
        let data = wtr
            .into_inner()
            .map_err(|e| DataError::Other(format!("flush CSV writer: {e}")))?;
        write_atomic(&path, &data)
    }

    pub fn write_snapshot(&self, snapshot: &FinancialSnapshot) -> Result<(), DataError> {
        let path = self.snapshot_path(&snapshot.symbol)?;
        let json =
            serde_json::to_vec_pretty(snapshot).map_err(|e| malformed(&snapshot.symbol, e))?;
        write_atomic(&path, &json)
    }

    /// Every symbol that has a price file, sorted.
    pub fn price_symbols(&self) -> Result<Vec<String>, DataError> {
        let dir = self.root.join("prices");
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut symbols = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

impl MarketDataProvider for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    fn fetch_financial_snapshot(&self, symbol: &str) -> Result<FinancialSnapshot, DataError> {
        let path = self.snapshot_path(symbol)?;
        if !path.exists() {
            return Err(DataError::NoLocalData {
                symbol: symbol.to_string(),
                kind: "fundamentals",
            });
        }
        tracing::debug!(symbol, path = %path.display(), "reading snapshot");
        let content = fs::read_to_string(&path)?;
        let mut snapshot: FinancialSnapshot =
            serde_json::from_str(&content).map_err(|e| malformed(symbol, e))?;
        if snapshot.symbol.is_empty() {
            snapshot.symbol = symbol.to_string();
        }
        Ok(snapshot)
    }

    fn fetch_price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError> {
        let path = self.prices_path(symbol)?;
        if !path.exists() {
            return Err(DataError::NoLocalData {
                symbol: symbol.to_string(),
                kind: "prices",
            });
        }
        tracing::debug!(symbol, path = %path.display(), "reading prices");
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| malformed(symbol, e))?;
        let mut bars = Vec::new();
        for record in rdr.deserialize::<PriceBar>() {
            let bar = record.map_err(|e| malformed(symbol, e))?;
            if bar.date >= start && bar.date <= end {
                bars.push(bar);
            }
        }
        Ok(bars)
    }
}

fn check_symbol(symbol: &str) -> Result<(), DataError> {
    let bad = symbol.is_empty()
        || symbol.starts_with('.')
        || symbol.contains(['/', '\\'])
        || symbol.chars().any(char::is_whitespace);
    if bad {
        return Err(DataError::InvalidSymbol {
            symbol: symbol.to_string(),
        });
    }
    Ok(())
}

fn malformed(symbol: &str, e: impl std::fmt::Display) -> DataError {
    DataError::Malformed {
        symbol: symbol.to_string(),
        reason: e.to_string(),
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DataError::Io(e)
    })
}
