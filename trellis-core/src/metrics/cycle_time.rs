//! Cycle time and time in status

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::Measured;
use crate::config::StatusDateFields;
use crate::index::ItemIndex;
use crate::model::{FieldValue, Item, ItemStatus};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Average days spent in each lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusDurations {
    pub todo: Measured<f64>,
    pub in_progress: Measured<f64>,
    pub review: Measured<f64>,
    pub done: Measured<f64>,
}

/// Creation-to-close time of completed items
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleTime {
    pub average_days: Measured<f64>,
    pub by_status: Measured<StatusDurations>,
    /// Closed items with both timestamps
    pub sample_size: usize,
}

pub fn cycle_time(
    index: &ItemIndex<'_>,
    status_dates: &StatusDateFields,
    now: DateTime<Utc>,
) -> CycleTime {
    let durations: Vec<f64> = index
        .items()
        .filter(|item| item.is_closed())
        .filter_map(|item| {
            let elapsed = item.closed_at? - item.created_at?;
            (elapsed.num_seconds() >= 0).then(|| elapsed.num_seconds() as f64 / SECONDS_PER_DAY)
        })
        .collect();

    CycleTime {
        average_days: mean(&durations).into(),
        by_status: time_in_status(index, status_dates, now),
        sample_size: durations.len(),
    }
}

fn time_in_status(
    index: &ItemIndex<'_>,
    fields: &StatusDateFields,
    now: DateTime<Utc>,
) -> Measured<StatusDurations> {
    let mut samples: [Vec<f64>; 4] = Default::default();
    let mut any_dates = false;

    for item in index.items() {
        let entries = status_entries(item, fields);
        if entries.is_empty() {
            continue;
        }
        any_dates = true;

        let end = match (item.is_closed(), item.closed_at) {
            (true, Some(closed)) => closed.date_naive(),
            _ => now.date_naive(),
        };

        for (i, &(slot, entered)) in entries.iter().enumerate() {
            let left = entries.get(i + 1).map_or(end, |&(_, next)| next);
            let days = (left - entered).num_days();
            if days >= 0 {
                samples[slot].push(days as f64);
            }
        }
    }

    if !any_dates {
        return Measured::Unavailable;
    }

    let [todo, in_progress, review, done] = samples.map(|s| Measured::from(mean(&s)));
    Measured::Available(StatusDurations {
        todo,
        in_progress,
        review,
        done,
    })
}

/// Status entry dates present on an item, in lifecycle order
///
/// Each entry carries its position in [`ItemStatus::LIFECYCLE`].
fn status_entries(item: &Item, fields: &StatusDateFields) -> Vec<(usize, NaiveDate)> {
    ItemStatus::LIFECYCLE
        .iter()
        .enumerate()
        .filter_map(|(slot, status)| {
            let name = match status {
                ItemStatus::Todo => &fields.todo,
                ItemStatus::InProgress => &fields.in_progress,
                ItemStatus::Review => &fields.review,
                ItemStatus::Done => &fields.done,
                ItemStatus::Backlog => return None,
            };
            item.field(name)
                .and_then(FieldValue::as_date)
                .map(|date| (slot, date))
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentKind, ItemState, Snapshot};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn closed_after(id: &str, days: i64) -> Item {
        let mut item = Item::new(id, ContentKind::Issue);
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        item.created_at = Some(created);
        item.closed_at = Some(created + Duration::days(days));
        item.state = ItemState::Closed;
        item
    }

    fn compute(items: Vec<Item>) -> CycleTime {
        let snapshot = Snapshot::new("P", items);
        let index = ItemIndex::new(&snapshot, "Status");
        cycle_time(&index, &StatusDateFields::default(), now())
    }

    fn durations(ct: CycleTime) -> StatusDurations {
        match ct.by_status {
            Measured::Available(d) => d,
            Measured::Unavailable => panic!("expected time-in-status durations"),
        }
    }

    #[test]
    fn test_average_over_closed_items() {
        let mut open = Item::new("C", ContentKind::Issue);
        open.created_at = Some(now() - Duration::days(100));

        let ct = compute(vec![closed_after("A", 2), closed_after("B", 4), open]);
        assert_eq!(ct.average_days, Measured::Available(3.0));
        assert_eq!(ct.sample_size, 2);
    }

    #[test]
    fn test_no_timestamps_marked_unavailable() {
        let mut closed = Item::new("A", ContentKind::Issue);
        closed.state = ItemState::Closed;

        let ct = compute(vec![closed]);
        assert_eq!(ct.average_days, Measured::Unavailable);
        assert_eq!(ct.by_status, Measured::Unavailable);
        assert_eq!(ct.sample_size, 0);

        let json = serde_json::to_value(ct).unwrap();
        assert_eq!(json["average_days"], "unavailable");
        assert_eq!(json["by_status"], "unavailable");
    }

    #[test]
    fn test_time_in_status_from_date_fields() {
        let mut item = closed_after("A", 20);
        item.fields
            .insert("Todo Date".to_string(), FieldValue::Date(date(1)));
        item.fields
            .insert("In Progress Date".to_string(), FieldValue::Date(date(4)));
        item.fields
            .insert("Done Date".to_string(), FieldValue::Date(date(10)));

        let ct = compute(vec![item]);
        let by_status = durations(ct);

        assert_eq!(by_status.todo, Measured::Available(3.0));
        assert_eq!(by_status.in_progress, Measured::Available(6.0));
        assert_eq!(by_status.review, Measured::Unavailable);
        // Closed on June 21st
        assert_eq!(by_status.done, Measured::Available(11.0));
    }

    #[test]
    fn test_open_item_status_runs_until_now() {
        let mut item = Item::new("A", ContentKind::Issue);
        item.fields
            .insert("Review Date".to_string(), FieldValue::Date(date(25)));

        let ct = compute(vec![item]);
        let by_status = durations(ct);

        assert_eq!(by_status.review, Measured::Available(5.0));
        assert_eq!(by_status.todo, Measured::Unavailable);
        assert_eq!(ct.average_days, Measured::Unavailable);
    }

    #[test]
    fn test_out_of_order_dates_skip_negative_spans() {
        // Marked in progress before it was marked todo
        let mut item = Item::new("A", ContentKind::Issue);
        item.fields
            .insert("Todo Date".to_string(), FieldValue::Date(date(10)));
        item.fields
            .insert("In Progress Date".to_string(), FieldValue::Date(date(5)));
        item.fields
            .insert("Done Date".to_string(), FieldValue::Date(date(12)));

        let by_status = durations(compute(vec![item]));

        assert_eq!(by_status.todo, Measured::Unavailable);
        assert_eq!(by_status.in_progress, Measured::Available(7.0));
        assert_eq!(by_status.done, Measured::Available(18.0));
    }

    #[test]
    fn test_closed_before_created_is_ignored() {
        let mut item = closed_after("A", 3);
        item.closed_at = item.created_at.map(|c| c - Duration::days(1));

        let ct = compute(vec![item, closed_after("B", 4)]);
        assert_eq!(ct.average_days, Measured::Available(4.0));
        assert_eq!(ct.sample_size, 1);
    }
}
