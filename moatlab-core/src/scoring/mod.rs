//! Moat scoring: per-metric bucket scores and their composite mean.
//!
//! Scoring is total. A missing metric scores zero rather than being
//! skipped, so the composite is always the mean of exactly seven scores.

pub mod ladder;

pub use ladder::{Bound, Ladder};

use crate::domain::{Metric, MetricValue, TickerRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Discrete score bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub enum Score {
    Zero,
    Low,
    Mid,
    Full,
}

impl Score {
    pub fn value(self) -> f64 {
        match self {
            Score::Zero => 0.0,
            Score::Low => 0.4,
            Score::Mid => 0.7,
            Score::Full => 1.0,
        }
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.value()
    }
}

impl TryFrom<f64> for Score {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        [Score::Zero, Score::Low, Score::Mid, Score::Full]
            .into_iter()
            .find(|s| (s.value() - value).abs() < 1e-9)
            .ok_or_else(|| format!("{value} is not a score bucket (0, 0.4, 0.7, 1)"))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Score a single metric value. Missing scores zero.
pub fn score_metric(metric: Metric, value: MetricValue) -> Score {
    match value {
        MetricValue::Value(v) => metric.ladder().bucket(v),
        MetricValue::Missing => Score::Zero,
    }
}

/// Per-metric scores for one ticker plus the composite moat score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub symbol: String,
    pub scores: BTreeMap<Metric, Score>,
    /// Unweighted mean of the seven scores, in [0, 1].
    pub moat_score: f64,
}

impl ScoreCard {
    pub fn get(&self, metric: Metric) -> Score {
        self.scores.get(&metric).copied().unwrap_or(Score::Zero)
    }
}

/// Score every metric of a record.
pub fn score(record: &TickerRecord) -> ScoreCard {
    let scores: BTreeMap<Metric, Score> = record
        .values()
        .map(|(metric, value)| (metric, score_metric(metric, value)))
        .collect();
    let total: f64 = scores.values().map(|s| s.value()).sum();
    ScoreCard {
        symbol: record.symbol.clone(),
        moat_score: total / Metric::ALL.len() as f64,
        scores,
    }
}

/// Composite moat score of a record, in [0, 1].
pub fn compute_moat_score(record: &TickerRecord) -> f64 {
    score(record).moat_score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong_record() -> TickerRecord {
        TickerRecord::new("MOAT")
            .with(Metric::Roic, 18.0)
            .with(Metric::Roe, 25.0)
            .with(Metric::GrossMargin, 60.0)
            .with(Metric::RevenueGrowth, 0.2)
            .with(Metric::FreeCashFlow, 1_000.0)
            .with(Metric::DebtToEquity, 0.3)
            .with(Metric::EarningsStability, 0.02)
    }

    #[test]
    fn missing_scores_zero_for_every_metric() {
        for metric in Metric::ALL {
            assert_eq!(score_metric(metric, MetricValue::Missing), Score::Zero);
        }
    }

    #[test]
    fn ladder_examples_from_each_table() {
        assert_eq!(score_metric(Metric::Roe, MetricValue::Value(17.0)), Score::Mid);
        assert_eq!(score_metric(Metric::GrossMargin, MetricValue::Value(35.0)), Score::Low);
        assert_eq!(score_metric(Metric::RevenueGrowth, MetricValue::Value(0.10)), Score::Mid);
        assert_eq!(score_metric(Metric::EarningsStability, MetricValue::Value(0.12)), Score::Low);
        assert_eq!(score_metric(Metric::EarningsStability, MetricValue::Value(0.15)), Score::Zero);
    }

    #[test]
    fn strong_record_scores_one() {
        let card = score(&strong_record());
        assert_eq!(card.scores.len(), 7);
        assert!((card.moat_score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_record_scores_zero_over_seven_metrics() {
        let card = score(&TickerRecord::new("EMPTY"));
        assert_eq!(card.scores.len(), 7);
        assert_eq!(card.moat_score, 0.0);
    }

    #[test]
    fn composite_is_mean_of_seven() {
        // Full + Mid + Low, four missing → (1 + 0.7 + 0.4) / 7
        let record = TickerRecord::new("MIX")
            .with(Metric::Roic, 20.0)
            .with(Metric::Roe, 15.0)
            .with(Metric::DebtToEquity, 1.5);
        let expected = (1.0 + 0.7 + 0.4) / 7.0;
        assert!((compute_moat_score(&record) - expected).abs() < 1e-12);
    }

    #[test]
    fn score_round_trips_through_f64() {
        assert_eq!(Score::try_from(0.7), Ok(Score::Mid));
        assert!(Score::try_from(0.5).is_err());
        let json = serde_json::to_string(&Score::Low).unwrap();
        assert_eq!(json, "0.4");
    }
}
