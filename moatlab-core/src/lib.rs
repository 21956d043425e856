//! MoatLab Core: metric extraction, moat scoring, screening, indicators, selection.
//!
//! This crate contains the pure computation layer:
//! - Domain types (price bars, metrics, ticker records)
//! - Fundamental metric extraction from statement tables
//! - Piecewise moat scoring and the fundamental screen
//! - Daily technical indicators and the cross-sectional MA-alignment pick
//! - The market data provider seam plus a file-backed local store

pub mod data;
pub mod domain;
pub mod fundamentals;
pub mod indicators;
pub mod scoring;
pub mod screening;
pub mod selection;
pub mod stats;
