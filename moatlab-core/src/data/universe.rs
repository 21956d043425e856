//! Universe lists: the tickers a batch run walks over.
//!
//! A universe is stored either as TOML (`[[members]]` tables with `symbol`
//! and an optional `name`) or as a two-column `code,name` CSV exported from
//! an exchange listing. A-share codes from such listings are bare six-digit
//! numbers; `qualify_a_share` attaches the exchange suffix.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse universe TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("parse universe CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported universe file extension: {0}")]
    UnknownFormat(String),
}

/// One ticker in a universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Deserialize)]
struct CsvRow {
    code: String,
    #[serde(default)]
    name: Option<String>,
}

impl Universe {
    /// Build from bare symbols, dropping repeats.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = symbols
            .into_iter()
            .map(|s| Member {
                symbol: s.into(),
                name: None,
            })
            .collect();
        Self { members }.deduped()
    }

    /// Load by extension: `.toml` or `.csv`.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("csv") => Self::from_csv(&content),
            other => Err(UniverseError::UnknownFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let universe: Universe = toml::from_str(content)?;
        Ok(universe.deduped())
    }

    /// Parse a `code,name` listing. Codes are kept as written; call
    /// [`Universe::qualified`] to attach A-share exchange suffixes.
    pub fn from_csv(content: &str) -> Result<Self, UniverseError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut members = Vec::new();
        for row in rdr.deserialize::<CsvRow>() {
            let row = row?;
            if row.code.is_empty() {
                continue;
            }
            members.push(Member {
                symbol: row.code,
                name: row.name.filter(|n| !n.is_empty()),
            });
        }
        Ok(Self { members }.deduped())
    }

    /// Copy with every bare A-share code qualified with its exchange suffix.
    pub fn qualified(&self) -> Self {
        let members = self
            .members
            .iter()
            .map(|m| Member {
                symbol: qualify_a_share(&m.symbol),
                name: m.name.clone(),
            })
            .collect();
        Self { members }.deduped()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.symbol.as_str()).collect()
    }

    pub fn name_of(&self, symbol: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.symbol == symbol)
            .and_then(|m| m.name.as_deref())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    fn deduped(mut self) -> Self {
        let mut seen = HashSet::new();
        self.members.retain(|m| seen.insert(m.symbol.clone()));
        self
    }
}

/// Attach the Shanghai (`.SH`) or Shenzhen (`.SZ`) suffix to a bare A-share
/// code. Codes starting with `6` list in Shanghai. Symbols that already carry
/// a suffix are returned unchanged.
pub fn qualify_a_share(code: &str) -> String {
    let code = code.trim();
    if code.contains('.') {
        return code.to_string();
    }
    if code.starts_with('6') {
        format!("{code}.SH")
    } else {
        format!("{code}.SZ")
    }
}

/// Strip an exchange suffix: `600519.SH` → `600519`.
pub fn bare_code(symbol: &str) -> &str {
    symbol.split_once('.').map_or(symbol, |(code, _)| code)
}
