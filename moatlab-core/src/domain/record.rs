//! TickerRecord: per-ticker fundamental metrics for one analysis run.

use super::metric::{Metric, MetricValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extracted fundamental metrics for a single ticker.
///
/// Built once by the extractor and read by the scorer and the screening
/// predicate. A metric absent from the map reads as `Missing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub symbol: String,
    metrics: BTreeMap<Metric, MetricValue>,
}

impl TickerRecord {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            metrics: BTreeMap::new(),
        }
    }

    /// Builder-style setter.
    pub fn with(mut self, metric: Metric, value: impl Into<MetricValue>) -> Self {
        self.metrics.insert(metric, value.into());
        self
    }

    pub fn get(&self, metric: Metric) -> MetricValue {
        self.metrics.get(&metric).copied().unwrap_or_default()
    }

    /// Metric/value pairs for all seven metrics in canonical order.
    pub fn values(&self) -> impl Iterator<Item = (Metric, MetricValue)> + '_ {
        Metric::ALL.iter().map(move |&m| (m, self.get(m)))
    }

    /// Number of metrics with a defined value.
    pub fn defined_count(&self) -> usize {
        self.values().filter(|(_, v)| !v.is_missing()).count()
    }
}
