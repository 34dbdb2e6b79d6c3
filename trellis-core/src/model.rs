//! Project item model
//!
//! Items are built fresh for every request from a snapshot of the project
//! and are never mutated while an analysis runs.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// What a project item points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Issue,
    PullRequest,
    DraftIssue,
}

/// Lifecycle state of the item's content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    #[default]
    Open,
    Closed,
}

/// Value of a single project field on an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Name of the selected option
    SingleSelect(String),
}

impl FieldValue {
    /// Textual form of the value, if it has one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::SingleSelect(s) => Some(s),
            _ => None,
        }
    }

    /// Date form of the value, if it is a date
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// Kind of a declared relationship between two items
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Blocks,
    BlockedBy,
    RelatedTo,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationshipKind::Blocks => "blocks",
            RelationshipKind::BlockedBy => "blocked_by",
            RelationshipKind::RelatedTo => "related_to",
        };
        f.write_str(s)
    }
}

/// Relationship references declared by an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationships {
    /// Items this one blocks
    #[serde(default)]
    pub blocks: Vec<String>,
    /// Items blocking this one
    #[serde(default)]
    pub blocked_by: Vec<String>,
    /// Loosely related items
    #[serde(default)]
    pub related_to: Vec<String>,
}

impl Relationships {
    /// Iterate over every declared reference with its kind
    pub fn iter(&self) -> impl Iterator<Item = (RelationshipKind, &str)> {
        let blocks = self
            .blocks
            .iter()
            .map(|t| (RelationshipKind::Blocks, t.as_str()));
        let blocked_by = self
            .blocked_by
            .iter()
            .map(|t| (RelationshipKind::BlockedBy, t.as_str()));
        let related_to = self
            .related_to
            .iter()
            .map(|t| (RelationshipKind::RelatedTo, t.as_str()));
        blocks.chain(blocked_by).chain(related_to)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.blocked_by.is_empty() && self.related_to.is_empty()
    }
}

/// Status classification of an item, read from the status field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Backlog,
    Todo,
    InProgress,
    Review,
    Done,
}

impl ItemStatus {
    /// Statuses on the lifecycle ordering, earliest first
    pub const LIFECYCLE: [ItemStatus; 4] = [
        ItemStatus::Todo,
        ItemStatus::InProgress,
        ItemStatus::Review,
        ItemStatus::Done,
    ];

    /// Classify a status option name
    ///
    /// Matching ignores case, spaces, hyphens and underscores, so "In Progress",
    /// "in-progress" and "IN_PROGRESS" are all the same status.
    pub fn classify(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "backlog" => Some(ItemStatus::Backlog),
            "todo" => Some(ItemStatus::Todo),
            "inprogress" => Some(ItemStatus::InProgress),
            "review" | "inreview" => Some(ItemStatus::Review),
            "done" => Some(ItemStatus::Done),
            _ => None,
        }
    }

    /// Position on the lifecycle ordering (todo < in_progress < review < done)
    ///
    /// `Backlog` is recognized but has no place on the ordering.
    pub fn lifecycle_rank(self) -> Option<u8> {
        match self {
            ItemStatus::Backlog => None,
            ItemStatus::Todo => Some(0),
            ItemStatus::InProgress => Some(1),
            ItemStatus::Review => Some(2),
            ItemStatus::Done => Some(3),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::Backlog => "backlog",
            ItemStatus::Todo => "todo",
            ItemStatus::InProgress => "in_progress",
            ItemStatus::Review => "review",
            ItemStatus::Done => "done",
        };
        f.write_str(s)
    }
}

/// A project item as seen in one snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Project item node id
    pub id: String,
    /// Kind of content behind the item
    pub kind: ContentKind,
    /// Open or closed
    #[serde(default)]
    pub state: ItemState,
    /// When the content was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the content was closed
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Field values keyed by field name
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    /// Declared relationships
    #[serde(default)]
    pub relationships: Relationships,
}

impl Item {
    /// Create an open item with no fields or relationships
    pub fn new(id: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            state: ItemState::Open,
            created_at: None,
            closed_at: None,
            fields: BTreeMap::new(),
            relationships: Relationships::default(),
        }
    }

    /// Look up a field by name, ignoring ASCII case
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).or_else(|| {
            self.fields
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Classified status read from the given status field
    pub fn status(&self, status_field: &str) -> Option<ItemStatus> {
        self.field(status_field)
            .and_then(FieldValue::as_text)
            .and_then(ItemStatus::classify)
    }

    pub fn is_closed(&self) -> bool {
        self.state == ItemState::Closed
    }
}

/// All items of one project, fetched for a single request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Project node id
    pub project_id: String,
    /// Items in the order the upstream returned them
    pub items: Vec<Item>,
}

impl Snapshot {
    pub fn new(project_id: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            project_id: project_id.into(),
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
