//! Backlog health

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::MetricsConfig;
use crate::index::ItemIndex;
use crate::model::{Item, ItemStatus};

/// Counts of backlog problems
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BacklogIssues {
    /// Items with no status set at all
    pub ungroomed: usize,
    /// Items missing at least one required field
    pub missing_fields: usize,
    /// Open, unstarted items older than the staleness threshold
    pub stale: usize,
}

/// Backlog health summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacklogHealth {
    /// Share of items with none of the problems, 0 to 100
    pub score: f64,
    pub issues: BacklogIssues,
    pub total: usize,
}

pub fn backlog_health(
    index: &ItemIndex<'_>,
    status_field: &str,
    config: &MetricsConfig,
    now: DateTime<Utc>,
) -> BacklogHealth {
    let mut issues = BacklogIssues::default();
    let mut unhealthy = 0;
    let required = config.required_fields_for(status_field);

    for (item, status) in index.with_status() {
        let ungroomed = !item.has_field(status_field);
        let missing = required.iter().any(|field| !item.has_field(field));
        let stale = is_stale(item, ungroomed, status, config, now);

        issues.ungroomed += usize::from(ungroomed);
        issues.missing_fields += usize::from(missing);
        issues.stale += usize::from(stale);
        unhealthy += usize::from(ungroomed || missing || stale);
    }

    let total = index.len();
    let score = if total == 0 {
        100.0
    } else {
        let healthy = (total - unhealthy) as f64 / total as f64;
        (healthy * 1000.0).round() / 10.0
    };

    BacklogHealth {
        score,
        issues,
        total,
    }
}

fn is_stale(
    item: &Item,
    status_unset: bool,
    status: Option<ItemStatus>,
    config: &MetricsConfig,
    now: DateTime<Utc>,
) -> bool {
    if item.is_closed() || !(status_unset || status == Some(ItemStatus::Backlog)) {
        return false;
    }

    // Negative ages (clock skew) fail to_std and count as fresh
    item.created_at
        .and_then(|created| now.signed_duration_since(created).to_std().ok())
        .is_some_and(|age| age > config.stale_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentKind, FieldValue, ItemState, Snapshot};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn item(id: &str, fields: &[(&str, &str)], age_days: Option<i64>) -> Item {
        let mut item = Item::new(id, ContentKind::Issue);
        for (name, value) in fields {
            item.fields.insert(
                name.to_string(),
                FieldValue::SingleSelect(value.to_string()),
            );
        }
        item.created_at = age_days.map(|d| now() - Duration::days(d));
        item
    }

    fn health(items: Vec<Item>) -> BacklogHealth {
        let snapshot = Snapshot::new("P", items);
        let index = ItemIndex::new(&snapshot, "Status");
        backlog_health(&index, "Status", &MetricsConfig::default(), now())
    }

    #[test]
    fn test_empty_backlog() {
        let h = health(vec![]);
        assert_eq!(h.total, 0);
        assert_eq!(h.issues, BacklogIssues::default());
        assert_eq!(h.score, 100.0);
    }

    #[test]
    fn test_counts_each_problem() {
        let h = health(vec![
            // Healthy
            item("A", &[("Status", "Todo"), ("Priority", "High")], Some(90)),
            // Missing priority only
            item("B", &[("Status", "In Progress")], Some(1)),
            // No status: ungroomed, missing fields, stale
            item("C", &[("Priority", "Low")], Some(45)),
            // Backlog but recent
            item("D", &[("Status", "Backlog"), ("Priority", "Low")], Some(3)),
            // Backlog and old
            item("E", &[("Status", "Backlog"), ("Priority", "Low")], Some(31)),
        ]);

        assert_eq!(
            h.issues,
            BacklogIssues {
                ungroomed: 1,
                missing_fields: 2,
                stale: 2,
            }
        );
        assert_eq!(h.total, 5);
        // A and D are healthy
        assert_eq!(h.score, 40.0);
    }

    #[test]
    fn test_renamed_fields_are_required() {
        let items = vec![
            item("A", &[("State", "Todo"), ("Prio", "High")], Some(1)),
            item("B", &[("State", "Todo")], Some(1)),
        ];
        let snapshot = Snapshot::new("P", items);
        let index = ItemIndex::new(&snapshot, "State");
        let config = MetricsConfig {
            priority_field: "Prio".to_string(),
            ..MetricsConfig::default()
        };

        let h = backlog_health(&index, "State", &config, now());
        assert_eq!(h.issues.ungroomed, 0);
        assert_eq!(h.issues.missing_fields, 1);
        assert_eq!(h.score, 50.0);
    }

    #[test]
    fn test_missing_timestamps_never_stale() {
        let h = health(vec![item("A", &[], None)]);
        assert_eq!(h.issues.stale, 0);
        assert_eq!(h.issues.ungroomed, 1);
    }

    #[test]
    fn test_closed_items_not_stale() {
        let mut closed = item("A", &[], Some(100));
        closed.state = ItemState::Closed;
        let h = health(vec![closed]);
        assert_eq!(h.issues.stale, 0);
    }
}
