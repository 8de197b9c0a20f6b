//! Dashboard Metric Types
//!
//! Every dashboard figure is carried as a `MetricDelta`: the current
//! window's value, the previous window's value, and the percentage change
//! between them.

use serde::Serialize;
use utoipa::ToSchema;

/// Percentage change from `previous` to `current`.
///
/// - both zero: `Some(0.0)` (flat)
/// - previous zero, current non-zero: `None` (growth from nothing is
///   undefined, rendered as "new" by dashboards)
/// - otherwise: `Some(((current - previous) / previous) * 100)`
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        if current == 0.0 {
            return Some(0.0);
        }
        return None;
    }
    Some(((current - previous) / previous) * 100.0)
}

/// A metric value with its period-over-period comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricDelta {
    pub current: f64,
    pub previous: f64,
    /// None when the previous window was zero and the current is not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
}

impl MetricDelta {
    pub fn new(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            change_percent: percent_change(current, previous),
        }
    }

    pub fn from_counts(current: u64, previous: u64) -> Self {
        Self::new(current as f64, previous as f64)
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_growth() {
        assert_eq!(percent_change(150.0, 100.0), Some(50.0));
    }

    #[test]
    fn test_percent_change_decline() {
        assert_eq!(percent_change(50.0, 100.0), Some(-50.0));
    }

    #[test]
    fn test_percent_change_flat_zero() {
        assert_eq!(percent_change(0.0, 0.0), Some(0.0));
    }

    #[test]
    fn test_percent_change_from_zero_is_undefined() {
        assert_eq!(percent_change(10.0, 0.0), None);
    }

    #[test]
    fn test_percent_change_to_zero() {
        assert_eq!(percent_change(0.0, 80.0), Some(-100.0));
    }

    #[test]
    fn test_metric_delta_from_counts() {
        let delta = MetricDelta::from_counts(12, 8);
        assert_eq!(delta.current, 12.0);
        assert_eq!(delta.previous, 8.0);
        assert_eq!(delta.change_percent, Some(50.0));
    }
}
