//! Priority distribution

use serde::Serialize;

use crate::index::ItemIndex;
use crate::model::FieldValue;
use crate::priority::Priority;

/// Items per priority bucket; the buckets always sum to the item count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unset: usize,
}

impl PriorityDistribution {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.unset
    }
}

pub fn priority_distribution(index: &ItemIndex<'_>, priority_field: &str) -> PriorityDistribution {
    let mut dist = PriorityDistribution::default();

    for item in index.items() {
        let priority = item
            .field(priority_field)
            .and_then(FieldValue::as_text)
            .and_then(|v| v.parse::<Priority>().ok());

        match priority {
            Some(Priority::High) => dist.high += 1,
            Some(Priority::Medium) => dist.medium += 1,
            Some(Priority::Low) => dist.low += 1,
            None => dist.unset += 1,
        }
    }

    dist
}
