//! MoatLab Runner: batch screening, indicator scans, run configuration, export.
//!
//! This crate builds on `moatlab-core` to provide:
//! - Parallel fundamental screen with per-ticker failure isolation
//! - Universe-wide indicator scan feeding the cross-sectional pick
//! - TOML run configuration with a content fingerprint
//! - Deterministic synthetic data provider
//! - CSV and JSON export

pub mod config;
pub mod export;
pub mod screener;
pub mod synthetic;
pub mod technical;

pub use config::{ConfigError, ScreenConfig, ScreenSection, TechnicalSection};
pub use export::{
    export_indicators_csv, export_pct_change_csv, export_picks_csv, export_report_json,
    export_screen_csv, import_indicators_csv, import_report_json,
};
pub use screener::{
    evaluate_ticker, filter_candidates, Candidate, Failure, ScreenError, ScreenOptions,
    ScreenReport, SCHEMA_VERSION,
};
pub use synthetic::{populate_store, SyntheticProvider};
pub use technical::{scan_ticker, scan_universe, ScanOptions, ScanReport, TickerError};
