//! Per-request item index
//!
//! Built once per snapshot and shared by the graph analyzer and the metrics.

use std::collections::HashMap;

use tracing::warn;

use crate::model::{Item, ItemStatus, Snapshot};

/// Items of a snapshot keyed by id, with statuses classified up front
#[derive(Debug)]
pub struct ItemIndex<'a> {
    items: Vec<&'a Item>,
    statuses: Vec<Option<ItemStatus>>,
    by_id: HashMap<&'a str, usize>,
}

impl<'a> ItemIndex<'a> {
    /// Index a snapshot
    ///
    /// If an id appears more than once, the first occurrence wins.
    pub fn new(snapshot: &'a Snapshot, status_field: &str) -> Self {
        let mut items = Vec::with_capacity(snapshot.items.len());
        let mut statuses = Vec::with_capacity(snapshot.items.len());
        let mut by_id = HashMap::with_capacity(snapshot.items.len());

        for item in &snapshot.items {
            if by_id.contains_key(item.id.as_str()) {
                warn!(item_id = %item.id, "Duplicate item in snapshot, keeping first");
                continue;
            }
            by_id.insert(item.id.as_str(), items.len());
            statuses.push(item.status(status_field));
            items.push(item);
        }

        Self {
            items,
            statuses,
            by_id,
        }
    }

    /// Items in snapshot order
    pub fn items(&self) -> impl Iterator<Item = &'a Item> + '_ {
        self.items.iter().copied()
    }

    /// Items paired with their classified status
    pub fn with_status(&self) -> impl Iterator<Item = (&'a Item, Option<ItemStatus>)> + '_ {
        self.items.iter().copied().zip(self.statuses.iter().copied())
    }

    pub fn get(&self, id: &str) -> Option<&'a Item> {
        self.by_id.get(id).map(|&i| self.items[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Classified status of an item, `None` if unknown id or unclassified
    pub fn status_of(&self, id: &str) -> Option<ItemStatus> {
        self.by_id.get(id).and_then(|&i| self.statuses[i])
    }

    /// An item counts as done when its status is done or it is closed
    pub fn is_done(&self, id: &str) -> bool {
        self.status_of(id) == Some(ItemStatus::Done) || self.get(id).is_some_and(Item::is_closed)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
