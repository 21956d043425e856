//! Domain types for MoatLab

pub mod bar;
pub mod metric;
pub mod record;

pub use bar::{PriceBar, PriceSeries, SeriesError};
pub use metric::{Metric, MetricValue};
pub use record::TickerRecord;
