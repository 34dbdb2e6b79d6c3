//! Project metrics
//!
//! Each metric is computed on its own from the item index (and the graph, for
//! `dependency_status`). Items lacking the data one metric needs are left out
//! of that metric only; a value that cannot be derived at all is reported as
//! [`Measured::Unavailable`] rather than as zero.

mod backlog;
mod completion;
mod cycle_time;
mod dependency;
mod distribution;

pub use backlog::{backlog_health, BacklogHealth, BacklogIssues};
pub use completion::{completion_rate, CompletionRate, Trend};
pub use cycle_time::{cycle_time, CycleTime, StatusDurations};
pub use dependency::{dependency_status, DependencyStatus};
pub use distribution::{priority_distribution, PriorityDistribution};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::config::MetricsConfig;
use crate::graph::DependencyGraph;
use crate::index::ItemIndex;
use crate::Error;

/// A metric family that can be requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    BacklogHealth,
    DependencyStatus,
    PriorityDistribution,
    CompletionRate,
    CycleTime,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::BacklogHealth,
        MetricKind::DependencyStatus,
        MetricKind::PriorityDistribution,
        MetricKind::CompletionRate,
        MetricKind::CycleTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::BacklogHealth => "backlog_health",
            MetricKind::DependencyStatus => "dependency_status",
            MetricKind::PriorityDistribution => "priority_distribution",
            MetricKind::CompletionRate => "completion_rate",
            MetricKind::CycleTime => "cycle_time",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::Other(format!("Unknown metric: {}", s)))
    }
}

/// A value that may not be derivable from the data at hand
///
/// Serializes as the inner value, or as the string `"unavailable"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measured<T> {
    Available(T),
    Unavailable,
}

impl<T> From<Option<T>> for Measured<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Measured::Unavailable, Measured::Available)
    }
}

impl<T: Serialize> Serialize for Measured<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Measured::Available(v) => v.serialize(serializer),
            Measured::Unavailable => serializer.serialize_str("unavailable"),
        }
    }
}

/// Requested metrics; absent entries were not requested
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backlog_health: Option<BacklogHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_status: Option<DependencyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_distribution: Option<PriorityDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<CompletionRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_time: Option<CycleTime>,
}

impl ProjectMetrics {
    /// Compute the requested metrics as of `now`
    pub fn compute(
        kinds: &[MetricKind],
        index: &ItemIndex<'_>,
        graph: &DependencyGraph,
        config: &MetricsConfig,
        status_field: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let mut metrics = Self::default();

        for kind in kinds {
            debug!(metric = %kind, items = index.len(), "Computing metric");
            match kind {
                MetricKind::BacklogHealth => {
                    metrics.backlog_health =
                        Some(backlog_health(index, status_field, config, now));
                }
                MetricKind::DependencyStatus => {
                    metrics.dependency_status = Some(dependency_status(index, graph));
                }
                MetricKind::PriorityDistribution => {
                    metrics.priority_distribution =
                        Some(priority_distribution(index, &config.priority_field));
                }
                MetricKind::CompletionRate => {
                    metrics.completion_rate = Some(completion_rate(index, config, now));
                }
                MetricKind::CycleTime => {
                    metrics.cycle_time = Some(cycle_time(index, &config.status_dates, now));
                }
            }
        }

        metrics
    }
}

pub(crate) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_kind_round_trip_names() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.as_str().parse::<MetricKind>().unwrap(), kind);
        }
        assert!("velocity".parse::<MetricKind>().is_err());
    }

    #[test]
    fn test_measured_serialization() {
        let available: Measured<f64> = Measured::Available(2.5);
        let unavailable: Measured<f64> = Measured::Unavailable;

        assert_eq!(serde_json::to_value(available).unwrap(), serde_json::json!(2.5));
        assert_eq!(
            serde_json::to_value(unavailable).unwrap(),
            serde_json::json!("unavailable")
        );
    }

    #[test]
    fn test_ratio_of_nothing_is_zero() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(1, 4), 0.25);
    }
}
