//! Project item operations and item decoding

use std::collections::BTreeMap;

use crate::graphql::{Connection, NodeData};
use crate::{Error, GitHubClient, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use trellis_core::{ContentKind, FieldValue, Item, ItemState};

const ITEMS_QUERY: &str = r#"
    query($projectId: ID!, $first: Int!, $after: String) {
        node(id: $projectId) {
            ... on ProjectV2 {
                items(first: $first, after: $after) {
                    pageInfo {
                        hasNextPage
                        endCursor
                    }
                    nodes {
                        id
                        type
                        content {
                            ... on Issue { title number state createdAt closedAt }
                            ... on PullRequest { title number state createdAt closedAt }
                            ... on DraftIssue { title createdAt }
                        }
                        fieldValues(first: 100) {
                            nodes {
                                __typename
                                ... on ProjectV2ItemFieldTextValue {
                                    text
                                    field { ... on ProjectV2FieldCommon { name } }
                                }
                                ... on ProjectV2ItemFieldNumberValue {
                                    number
                                    field { ... on ProjectV2FieldCommon { name } }
                                }
                                ... on ProjectV2ItemFieldDateValue {
                                    date
                                    field { ... on ProjectV2FieldCommon { name } }
                                }
                                ... on ProjectV2ItemFieldSingleSelectValue {
                                    name
                                    field { ... on ProjectV2FieldCommon { name } }
                                }
                            }
                        }
                        dependencies {
                            blocks { id }
                            blockedBy { id }
                            relatedTo { id }
                        }
                    }
                }
            }
        }
    }
"#;

/// A project item with the title and number of its content
#[derive(Debug, Clone, Serialize)]
pub struct ProjectItem {
    #[serde(flatten)]
    pub item: Item,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProjectItems {
    items: Connection<ItemNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum ItemType {
    Issue,
    PullRequest,
    DraftIssue,
    #[serde(other)]
    Redacted,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemNode {
    id: String,
    #[serde(rename = "type")]
    item_type: ItemType,
    content: Option<ContentNode>,
    field_values: Connection<FieldValueNode>,
    #[serde(default)]
    dependencies: Option<DependencyNodes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentNode {
    title: Option<String>,
    number: Option<u64>,
    state: Option<String>,
    created_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct FieldValueNode {
    #[serde(rename = "__typename", default)]
    typename: String,
    field: Option<FieldName>,
    text: Option<String>,
    number: Option<f64>,
    date: Option<NaiveDate>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FieldName {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DependencyNodes {
    #[serde(default)]
    blocks: Vec<IdNode>,
    #[serde(default)]
    blocked_by: Vec<IdNode>,
    #[serde(default)]
    related_to: Vec<IdNode>,
}

#[derive(Debug, Deserialize)]
struct IdNode {
    id: String,
}

impl FieldValueNode {
    fn into_entry(self) -> Option<(String, FieldValue)> {
        let value = match self.typename.as_str() {
            "ProjectV2ItemFieldTextValue" => FieldValue::Text(self.text?),
            "ProjectV2ItemFieldNumberValue" => FieldValue::Number(self.number?),
            "ProjectV2ItemFieldDateValue" => FieldValue::Date(self.date?),
            "ProjectV2ItemFieldSingleSelectValue" => FieldValue::SingleSelect(self.name?),
            // Labels, assignees, iterations and the like
            _ => return None,
        };
        Some((self.field?.name, value))
    }
}

impl ItemNode {
    /// Convert to the core item model; redacted items yield `None`
    pub(crate) fn into_project_item(self) -> Option<ProjectItem> {
        let kind = match self.item_type {
            ItemType::Issue => ContentKind::Issue,
            ItemType::PullRequest => ContentKind::PullRequest,
            ItemType::DraftIssue => ContentKind::DraftIssue,
            ItemType::Redacted => return None,
        };
        let content = self.content.unwrap_or_default();

        let mut item = Item::new(self.id, kind);
        item.state = match content.state.as_deref() {
            Some("CLOSED") | Some("MERGED") => ItemState::Closed,
            _ => ItemState::Open,
        };
        item.created_at = content.created_at;
        item.closed_at = content.closed_at;
        item.fields = self
            .field_values
            .nodes
            .into_iter()
            .filter_map(FieldValueNode::into_entry)
            .collect::<BTreeMap<_, _>>();

        let deps = self.dependencies.unwrap_or_default();
        let ids = |nodes: Vec<IdNode>| nodes.into_iter().map(|n| n.id).collect::<Vec<_>>();
        item.relationships.blocks = ids(deps.blocks);
        item.relationships.blocked_by = ids(deps.blocked_by);
        item.relationships.related_to = ids(deps.related_to);

        Some(ProjectItem {
            item,
            title: content.title,
            number: content.number,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemData {
    add_project_v2_item_by_id: AddItemPayload,
}

#[derive(Debug, Deserialize)]
struct AddItemPayload {
    item: IdNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteItemData {
    delete_project_v2_item: DeleteItemPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteItemPayload {
    deleted_item_id: String,
}

impl GitHubClient {
    /// Add an issue or pull request to a project, returning the new item id
    pub async fn add_item(&self, project_id: &str, content_id: &str) -> Result<String> {
        let mutation = r#"
            mutation($input: AddProjectV2ItemByIdInput!) {
                addProjectV2ItemById(input: $input) {
                    item {
                        id
                    }
                }
            }
        "#;

        let data: AddItemData = self
            .graphql_query(
                mutation,
                &json!({ "input": { "projectId": project_id, "contentId": content_id } }),
            )
            .await?;

        let item_id = data.add_project_v2_item_by_id.item.id;
        info!(project_id, content_id, item_id = %item_id, "Added project item");
        Ok(item_id)
    }

    /// Remove an item from a project, returning the deleted item id
    pub async fn delete_item(&self, project_id: &str, item_id: &str) -> Result<String> {
        let mutation = r#"
            mutation($input: DeleteProjectV2ItemInput!) {
                deleteProjectV2Item(input: $input) {
                    deletedItemId
                }
            }
        "#;

        let data: DeleteItemData = self
            .graphql_query(
                mutation,
                &json!({ "input": { "projectId": project_id, "itemId": item_id } }),
            )
            .await?;

        info!(project_id, item_id, "Deleted project item");
        Ok(data.delete_project_v2_item.deleted_item_id)
    }

    /// List up to `limit` items with their field values
    pub async fn list_items(&self, project_id: &str, limit: usize) -> Result<Vec<ProjectItem>> {
        self.fetch_items(project_id, Some(limit)).await
    }

    /// Page through the items of a project
    ///
    /// `None` fetches every item.
    pub(crate) async fn fetch_items(
        &self,
        project_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ProjectItem>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let page_size = self.page_size() as usize;

        loop {
            let first = match limit {
                Some(limit) => limit.saturating_sub(items.len()).min(page_size),
                None => page_size,
            };
            if first == 0 {
                break;
            }

            debug!(project_id, first, after = ?cursor, "Fetching item page");

            let variables: Value = json!({
                "projectId": project_id,
                "first": first,
                "after": cursor,
            });
            let data: NodeData<ProjectItems> = self.graphql_query(ITEMS_QUERY, &variables).await?;
            let page = data
                .node
                .ok_or_else(|| Error::NotFound(format!("project {}", project_id)))?
                .items;

            for node in page.nodes {
                let id = node.id.clone();
                match node.into_project_item() {
                    Some(item) => items.push(item),
                    None => warn!(project_id, item_id = %id, "Skipping redacted item"),
                }
            }

            cursor = page
                .page_info
                .and_then(|p| p.next_cursor().map(str::to_string));
            if cursor.is_none() {
                break;
            }
        }

        Ok(items)
    }
}
