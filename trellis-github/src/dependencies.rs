//! Item dependency management and snapshot fetching

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use trellis_core::{Snapshot, SnapshotFetcher};

use crate::{GitHubClient, Result};

/// Relationship lists to write on an item
///
/// Lists left as `None` are not sent, so the upstream keeps their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_to: Option<Vec<String>>,
}

impl DependencyUpdate {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_none() && self.blocked_by.is_none() && self.related_to.is_none()
    }
}

impl GitHubClient {
    /// Replace the declared relationships of one item
    pub async fn manage_item_dependencies(
        &self,
        project_id: &str,
        item_id: &str,
        update: &DependencyUpdate,
    ) -> Result<()> {
        let mutation = r#"
            mutation($projectId: ID!, $itemId: ID!, $dependencies: ProjectV2ItemDependencyInput!) {
                updateProjectV2ItemDependencies(
                    input: { projectId: $projectId, itemId: $itemId, dependencies: $dependencies }
                ) {
                    projectV2Item {
                        id
                    }
                }
            }
        "#;

        let variables = json!({
            "projectId": project_id,
            "itemId": item_id,
            "dependencies": update,
        });

        let _: Value = self.graphql_query(mutation, &variables).await?;

        info!(project_id, item_id, "Updated item dependencies");
        Ok(())
    }
}

#[async_trait]
impl SnapshotFetcher for GitHubClient {
    async fn fetch_snapshot(&self, project_id: &str) -> trellis_core::Result<Snapshot> {
        let items = self
            .fetch_items(project_id, None)
            .await?
            .into_iter()
            .map(|p| p.item)
            .collect();

        Ok(Snapshot::new(project_id, items))
    }
}
