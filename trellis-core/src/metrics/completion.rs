//! Completion rate and trend

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::{ratio, Measured};
use crate::config::MetricsConfig;
use crate::index::ItemIndex;
use crate::model::Item;

/// Direction of the completion rate between the last two windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

/// Share of items closed, with a coarse trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRate {
    pub completed: usize,
    pub total: usize,
    pub rate: f64,
    /// Unavailable when either window has no item that can be placed in time
    pub trend: Measured<Trend>,
}

pub fn completion_rate(
    index: &ItemIndex<'_>,
    config: &MetricsConfig,
    now: DateTime<Utc>,
) -> CompletionRate {
    let total = index.len();
    let completed = index.items().filter(|item| item.is_closed()).count();

    CompletionRate {
        completed,
        total,
        rate: ratio(completed, total),
        trend: trend(index, config, now),
    }
}

/// Compare the window ending now with the one before it
///
fn trend(index: &ItemIndex<'_>, config: &MetricsConfig, now: DateTime<Utc>) -> Measured<Trend> {
    let window = match Duration::from_std(config.trend_window) {
        Ok(window) if window > Duration::zero() => window,
        _ => return Measured::Unavailable,
    };
    let Some(current_start) = now.checked_sub_signed(window) else {
        return Measured::Unavailable;
    };
    let Some(previous_start) = current_start.checked_sub_signed(window) else {
        return Measured::Unavailable;
    };

    let current = window_rate(index, current_start, now);
    let previous = window_rate(index, previous_start, current_start);

    let (Some(cur), Some(prev)) = (current, previous) else {
        return Measured::Unavailable;
    };
    Measured::Available(if cur - prev > config.trend_tolerance {
        Trend::Improving
    } else if prev - cur > config.trend_tolerance {
        Trend::Declining
    } else {
        Trend::Stable
    })
}

/// Items closed in `[start, end)` over items open at `start` or created inside
fn window_rate(index: &ItemIndex<'_>, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<f64> {
    let mut eligible = 0;
    let mut closed = 0;

    for item in index.items() {
        match window_membership(item, start, end) {
            Some(closed_inside) => {
                eligible += 1;
                closed += usize::from(closed_inside);
            }
            None => continue,
        }
    }

    (eligible > 0).then(|| ratio(closed, eligible))
}

/// `Some(closed_inside)` if the item was open at some point in the window
fn window_membership(item: &Item, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<bool> {
    let created = item.created_at?;
    if created >= end {
        return None;
    }

    match (item.is_closed(), item.closed_at) {
        (true, Some(closed)) if closed < start => None,
        (true, Some(closed)) => Some(closed < end),
        // Closed without a timestamp cannot be placed in time
        (true, None) => None,
        (false, _) => Some(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentKind, ItemState, Snapshot};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn days_ago(d: i64) -> DateTime<Utc> {
        now() - Duration::days(d)
    }

    fn open(id: &str, created: i64) -> Item {
        let mut item = Item::new(id, ContentKind::Issue);
        item.created_at = Some(days_ago(created));
        item
    }

    fn closed(id: &str, created: i64, closed: i64) -> Item {
        let mut item = open(id, created);
        item.state = ItemState::Closed;
        item.closed_at = Some(days_ago(closed));
        item
    }

    fn rate(items: Vec<Item>) -> CompletionRate {
        let snapshot = Snapshot::new("P", items);
        let index = ItemIndex::new(&snapshot, "Status");
        completion_rate(&index, &MetricsConfig::default(), now())
    }

    #[test]
    fn test_zero_items() {
        let r = rate(vec![]);
        assert_eq!(r.completed, 0);
        assert_eq!(r.total, 0);
        assert_eq!(r.rate, 0.0);
        assert_eq!(r.trend, Measured::Unavailable);
        assert_eq!(
            serde_json::to_value(&r).unwrap()["trend"],
            serde_json::json!("unavailable")
        );
    }

    #[test]
    fn test_rate_counts_closed_items() {
        let r = rate(vec![closed("A", 40, 5), open("B", 40), open("C", 2), closed("D", 3, 1)]);
        assert_eq!(r.completed, 2);
        assert_eq!(r.total, 4);
        assert_eq!(r.rate, 0.5);
    }

    #[test]
    fn test_improving_trend() {
        // Previous window (28..14 days ago): 4 open, none closed
        // Current window (14..0 days ago): same 4, three closed
        let r = rate(vec![
            closed("A", 30, 10),
            closed("B", 30, 5),
            closed("C", 30, 1),
            open("D", 30),
        ]);
        assert_eq!(r.trend, Measured::Available(Trend::Improving));
    }

    #[test]
    fn test_declining_trend() {
        let r = rate(vec![
            closed("A", 30, 20),
            closed("B", 30, 16),
            open("C", 30),
            open("D", 30),
        ]);
        assert_eq!(r.trend, Measured::Available(Trend::Declining));
    }

    #[test]
    fn test_trend_tolerance() {
        let r = rate(vec![
            closed("A", 30, 20),
            closed("B", 30, 10),
            open("C", 30),
            open("D", 30),
        ]);
        // previous 1/4, current 1/3
        assert_eq!(r.trend, Measured::Available(Trend::Improving));

        let r = rate(vec![closed("A", 30, 20), open("B", 30), closed("C", 10, 5)]);
        // previous 1/2, current 1/2
        assert_eq!(r.trend, Measured::Available(Trend::Stable));
    }

    #[test]
    fn test_missing_timestamps_leave_trend_unavailable() {
        let mut no_times = Item::new("A", ContentKind::DraftIssue);
        no_times.state = ItemState::Closed;
        let r = rate(vec![no_times]);
        assert_eq!(r.completed, 1);
        assert_eq!(r.rate, 1.0);
        assert_eq!(r.trend, Measured::Unavailable);
    }

    #[test]
    fn test_empty_previous_window_is_unavailable() {
        // Everything was created inside the current window
        let r = rate(vec![closed("A", 5, 1), open("B", 3)]);
        assert_eq!(r.trend, Measured::Unavailable);
    }

    #[test]
    fn test_zero_window_is_unavailable() {
        let snapshot = Snapshot::new("P", vec![closed("A", 30, 10), open("B", 30)]);
        let index = ItemIndex::new(&snapshot, "Status");
        let config = MetricsConfig {
            trend_window: std::time::Duration::ZERO,
            ..MetricsConfig::default()
        };
        assert_eq!(completion_rate(&index, &config, now()).trend, Measured::Unavailable);
    }
}
