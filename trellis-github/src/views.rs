//! Project view operations

use crate::graphql::{Connection, NodeData};
use crate::{Error, GitHubClient, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

/// How a view lays out items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewLayout {
    #[serde(rename = "BOARD_LAYOUT")]
    Board,
    #[serde(rename = "TABLE_LAYOUT")]
    Table,
    #[serde(rename = "ROADMAP_LAYOUT")]
    Roadmap,
}

/// A saved project view
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub layout: ViewLayout,
    /// Names of the fields shown in the view
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ViewNode {
    id: String,
    name: String,
    layout: ViewLayout,
    #[serde(default)]
    fields: Option<Connection<Option<ViewField>>>,
}

#[derive(Debug, Deserialize)]
struct ViewField {
    name: Option<String>,
}

impl From<ViewNode> for ProjectView {
    fn from(node: ViewNode) -> Self {
        let fields = node
            .fields
            .map(|c| c.nodes.into_iter().flatten().filter_map(|f| f.name).collect())
            .unwrap_or_default();

        ProjectView {
            id: node.id,
            name: node.name,
            layout: node.layout,
            fields,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectViews {
    views: Connection<ViewNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateViewData {
    create_project_v2_view: ViewPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateViewData {
    update_project_v2_view: ViewPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewPayload {
    project_view: ViewNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteViewData {
    delete_project_v2_view: DeleteViewPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteViewPayload {
    deleted_view_id: String,
}

/// Build the update input, leaving out unchanged properties
fn update_input(
    project_id: &str,
    view_id: &str,
    name: Option<&str>,
    layout: Option<ViewLayout>,
) -> Result<Value> {
    if name.is_none() && layout.is_none() {
        return Err(Error::Other(
            "View update needs a new name or layout".to_string(),
        ));
    }

    let mut input = Map::new();
    input.insert("projectId".to_string(), json!(project_id));
    input.insert("viewId".to_string(), json!(view_id));
    if let Some(name) = name {
        input.insert("name".to_string(), json!(name));
    }
    if let Some(layout) = layout {
        input.insert("layout".to_string(), json!(layout));
    }

    Ok(Value::Object(input))
}

impl GitHubClient {
    /// Create a view on a project
    pub async fn create_view(
        &self,
        project_id: &str,
        name: &str,
        layout: ViewLayout,
    ) -> Result<ProjectView> {
        let mutation = r#"
            mutation($input: CreateProjectV2ViewInput!) {
                createProjectV2View(input: $input) {
                    projectView { id name layout }
                }
            }
        "#;

        let input = json!({ "projectId": project_id, "name": name, "layout": layout });
        let data: CreateViewData = self
            .graphql_query(mutation, &json!({ "input": input }))
            .await?;

        let view = ProjectView::from(data.create_project_v2_view.project_view);
        info!(project_id, view_id = %view.id, "Created project view");
        Ok(view)
    }

    /// Rename a view or change its layout
    pub async fn update_view(
        &self,
        project_id: &str,
        view_id: &str,
        name: Option<&str>,
        layout: Option<ViewLayout>,
    ) -> Result<ProjectView> {
        let input = update_input(project_id, view_id, name, layout)?;

        let mutation = r#"
            mutation($input: UpdateProjectV2ViewInput!) {
                updateProjectV2View(input: $input) {
                    projectView { id name layout }
                }
            }
        "#;

        let data: UpdateViewData = self
            .graphql_query(mutation, &json!({ "input": input }))
            .await?;

        info!(project_id, view_id, "Updated project view");
        Ok(data.update_project_v2_view.project_view.into())
    }

    /// Delete a view, returning the deleted view id
    pub async fn delete_view(&self, project_id: &str, view_id: &str) -> Result<String> {
        let mutation = r#"
            mutation($input: DeleteProjectV2ViewInput!) {
                deleteProjectV2View(input: $input) {
                    deletedViewId
                }
            }
        "#;

        let data: DeleteViewData = self
            .graphql_query(
                mutation,
                &json!({ "input": { "projectId": project_id, "viewId": view_id } }),
            )
            .await?;

        info!(project_id, view_id, "Deleted project view");
        Ok(data.delete_project_v2_view.deleted_view_id)
    }

    /// List the views of a project
    pub async fn list_views(&self, project_id: &str, first: u32) -> Result<Vec<ProjectView>> {
        let query = r#"
            query($projectId: ID!, $first: Int!) {
                node(id: $projectId) {
                    ... on ProjectV2 {
                        views(first: $first) {
                            nodes {
                                id
                                name
                                layout
                                fields(first: 100) {
                                    nodes {
                                        ... on ProjectV2FieldCommon { name }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        "#;

        let data: NodeData<ProjectViews> = self
            .graphql_query(query, &json!({ "projectId": project_id, "first": first }))
            .await?;

        let project = data
            .node
            .ok_or_else(|| Error::NotFound(format!("project {}", project_id)))?;

        Ok(project
            .views
            .nodes
            .into_iter()
            .map(ProjectView::from)
            .collect())
    }
}
