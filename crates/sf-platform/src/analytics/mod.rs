//! Analytics Aggregation
//!
//! Read-side aggregation for instructor and admin dashboards:
//! period-bounded totals with period-over-period percentage deltas.

pub mod period;
pub mod metrics;
pub mod service;
pub mod api;

pub use period::Period;
pub use metrics::{percent_change, MetricDelta};
pub use service::AnalyticsService;
