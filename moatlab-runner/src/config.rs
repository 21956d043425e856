//! Serializable run configuration.
//!
//! A single TOML file drives both the fundamental screen and the technical
//! scan. Every section and every field is optional; an empty file is the
//! default configuration.

use chrono::NaiveDate;
use moatlab_core::screening::{CriteriaError, CriteriaSet};
use moatlab_core::selection::AlignmentRule;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::screener::ScreenOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid criteria: {0}")]
    Criteria(#[from] CriteriaError),

    #[error("start_date {start} is after end_date {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },

    #[error("as_of {as_of} is outside {start}..={end}")]
    AsOfOutOfRange {
        as_of: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub criteria: CriteriaSet,
    pub screen: ScreenSection,
    pub technical: TechnicalSection,
}

/// `[screen]`: which tickers to screen and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSection {
    pub tickers: Vec<String>,
    pub rank_by_moat: bool,
    pub parallel: bool,
}

impl Default for ScreenSection {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            rank_by_moat: false,
            parallel: true,
        }
    }
}

impl ScreenSection {
    pub fn options(&self) -> ScreenOptions {
        ScreenOptions {
            rank_by_moat: self.rank_by_moat,
            parallel: self.parallel,
        }
    }
}

/// `[technical]`: price window and evaluation date for the indicator scan.
///
/// Unset dates are resolved at run time: `end_date` to today, `start_date`
/// to [`DEFAULT_LOOKBACK_DAYS`] before the end, `as_of` to the latest date
/// present in the scanned batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalSection {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub as_of: Option<NaiveDate>,
    pub exclude: Vec<String>,
    pub require_close_above_fast: bool,
}

/// Calendar days of history fetched when no start date is configured.
/// Covers the 60-session slow average with room for holidays.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 270;

impl TechnicalSection {
    pub fn rule(&self) -> AlignmentRule {
        AlignmentRule {
            require_close_above_fast: self.require_close_above_fast,
        }
    }

    /// Concrete `(start, end)` for a run on `today`.
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = self.end_date.unwrap_or(today);
        let start = self
            .start_date
            .unwrap_or(end - chrono::Duration::days(DEFAULT_LOOKBACK_DAYS));
        (start, end)
    }
}

impl ScreenConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ScreenConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.criteria.validate()?;
        let t = &self.technical;
        if let (Some(start), Some(end)) = (t.start_date, t.end_date) {
            if start > end {
                return Err(ConfigError::DateRange { start, end });
            }
            if let Some(as_of) = t.as_of {
                if as_of < start || as_of > end {
                    return Err(ConfigError::AsOfOutOfRange { as_of, start, end });
                }
            }
        }
        Ok(())
    }

    /// Content hash of the configuration, used to tag exported reports.
    ///
    /// Two configs with the same effective values hash identically no matter
    /// how the source TOML was formatted.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
