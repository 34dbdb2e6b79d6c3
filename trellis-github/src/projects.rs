//! Project listing, creation and field operations

use crate::client::{OwnerKind, ProjectRef};
use crate::graphql::{Connection, NodeData};
use crate::{Error, GitHubClient, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

const PROJECT_SUMMARY_FIELDS: &str = r#"
    id
    number
    title
    shortDescription
    public
    closed
    items {
        totalCount
    }
"#;

/// Summary of a project as listed for an owner
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub short_description: Option<String>,
    pub public: bool,
    pub closed: bool,
    pub item_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSummaryNode {
    id: String,
    number: u64,
    title: String,
    short_description: Option<String>,
    public: bool,
    closed: bool,
    items: TotalCount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: u64,
}

impl From<ProjectSummaryNode> for ProjectSummary {
    fn from(node: ProjectSummaryNode) -> Self {
        ProjectSummary {
            id: node.id,
            number: node.number,
            title: node.title,
            short_description: node.short_description.filter(|d| !d.is_empty()),
            public: node.public,
            closed: node.closed,
            item_count: node.items.total_count,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectsOwner {
    projects_v2: Connection<ProjectSummaryNode>,
}

#[derive(Debug, Deserialize)]
struct OrganizationProjects {
    organization: Option<ProjectsOwner>,
}

#[derive(Debug, Deserialize)]
struct ViewerProjects {
    viewer: ProjectsOwner,
}

/// A newly created project
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreatedProject {
    pub id: String,
    pub number: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectData {
    create_project_v2: CreateProjectPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectPayload {
    project_v2: CreatedProject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerLookup {
    repository_owner: Option<NodeId>,
}

#[derive(Debug, Deserialize)]
struct NodeId {
    id: String,
}

/// Storage type of a project field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldDataType {
    Text,
    Number,
    Date,
    SingleSelect,
    Iteration,
    #[serde(other)]
    Other,
}

/// One option of a single-select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub name: String,
}

/// A project field definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectField {
    pub id: String,
    pub name: String,
    pub data_type: FieldDataType,
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl ProjectField {
    /// Find a single-select option by name, ignoring ASCII case
    pub fn option(&self, name: &str) -> Option<&FieldOption> {
        self.options
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }
}

/// Find a field by name, ignoring ASCII case
pub fn find_field<'a>(fields: &'a [ProjectField], name: &str) -> Option<&'a ProjectField> {
    fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

#[derive(Debug, Deserialize)]
struct ProjectFields {
    fields: Connection<Option<ProjectField>>,
}

/// A project resolved from an owner login and number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnedProject {
    project_v2: Option<ProjectInfo>,
}

#[derive(Debug, Deserialize)]
struct OrganizationProject {
    organization: Option<OwnedProject>,
}

#[derive(Debug, Deserialize)]
struct UserProject {
    user: Option<OwnedProject>,
}

/// New value for an item field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Id of the single-select option to select
    SingleSelectOption(String),
}

impl FieldUpdate {
    /// The `ProjectV2FieldValue` input object
    pub fn to_input(&self) -> Value {
        match self {
            FieldUpdate::Text(text) => json!({ "text": text }),
            FieldUpdate::Number(number) => json!({ "number": number }),
            FieldUpdate::Date(date) => json!({ "date": date.format("%Y-%m-%d").to_string() }),
            FieldUpdate::SingleSelectOption(id) => json!({ "singleSelectOptionId": id }),
        }
    }

    /// Interpret raw text as a value for the given field
    ///
    /// Single-select values are option names and resolve to the option id.
    pub fn parse(field: &ProjectField, raw: &str) -> Result<Self> {
        match field.data_type {
            FieldDataType::Text => Ok(FieldUpdate::Text(raw.to_string())),
            FieldDataType::Number => raw
                .trim()
                .parse::<f64>()
                .map(FieldUpdate::Number)
                .map_err(|_| Error::Parse(format!("'{}' is not a number", raw))),
            FieldDataType::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(FieldUpdate::Date)
                .map_err(|e| Error::Parse(format!("'{}' is not a YYYY-MM-DD date: {}", raw, e))),
            FieldDataType::SingleSelect => field
                .option(raw.trim())
                .map(|o| FieldUpdate::SingleSelectOption(o.id.clone()))
                .ok_or_else(|| {
                    Error::Parse(format!("Field '{}' has no option named '{}'", field.name, raw))
                }),
            other => Err(Error::Other(format!(
                "Field '{}' of type {:?} cannot be set",
                field.name, other
            ))),
        }
    }
}

impl GitHubClient {
    /// List projects of an organization
    pub async fn list_organization_projects(
        &self,
        organization: &str,
        first: u32,
    ) -> Result<Vec<ProjectSummary>> {
        debug!(organization, first, "Listing organization projects");

        let query = format!(
            r#"
            query($org: String!, $first: Int!) {{
                organization(login: $org) {{
                    projectsV2(first: $first) {{
                        nodes {{ {PROJECT_SUMMARY_FIELDS} }}
                    }}
                }}
            }}
            "#
        );

        let data: OrganizationProjects = self
            .graphql_query(&query, &json!({ "org": organization, "first": first }))
            .await?;

        let owner = data
            .organization
            .ok_or_else(|| Error::NotFound(format!("organization {}", organization)))?;

        Ok(owner
            .projects_v2
            .nodes
            .into_iter()
            .map(ProjectSummary::from)
            .collect())
    }

    /// List projects of the authenticated user
    pub async fn list_viewer_projects(&self, first: u32) -> Result<Vec<ProjectSummary>> {
        debug!(first, "Listing viewer projects");

        let query = format!(
            r#"
            query($first: Int!) {{
                viewer {{
                    projectsV2(first: $first) {{
                        nodes {{ {PROJECT_SUMMARY_FIELDS} }}
                    }}
                }}
            }}
            "#
        );

        let data: ViewerProjects = self
            .graphql_query(&query, &json!({ "first": first }))
            .await?;

        Ok(data
            .viewer
            .projects_v2
            .nodes
            .into_iter()
            .map(ProjectSummary::from)
            .collect())
    }

    /// Resolve an organization or user login to its node id
    pub async fn resolve_owner_id(&self, login: &str) -> Result<String> {
        let query = r#"
            query($login: String!) {
                repositoryOwner(login: $login) {
                    id
                }
            }
        "#;

        let data: OwnerLookup = self
            .graphql_query(query, &json!({ "login": login }))
            .await?;

        data.repository_owner
            .map(|owner| owner.id)
            .ok_or_else(|| Error::NotFound(format!("owner {}", login)))
    }

    /// Create a project owned by an organization or user login
    pub async fn create_project(
        &self,
        owner: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<CreatedProject> {
        let owner_id = self.resolve_owner_id(owner).await?;

        let mutation = r#"
            mutation($input: CreateProjectV2Input!) {
                createProjectV2(input: $input) {
                    projectV2 {
                        id
                        number
                    }
                }
            }
        "#;

        let data: CreateProjectData = self
            .graphql_query(
                mutation,
                &json!({ "input": { "ownerId": owner_id, "title": title } }),
            )
            .await?;
        let project = data.create_project_v2.project_v2;

        if let Some(description) = description {
            let mutation = r#"
                mutation($input: UpdateProjectV2Input!) {
                    updateProjectV2(input: $input) {
                        projectV2 {
                            id
                        }
                    }
                }
            "#;

            let _: Value = self
                .graphql_query(
                    mutation,
                    &json!({
                        "input": { "projectId": project.id, "shortDescription": description }
                    }),
                )
                .await?;
        }

        info!(owner, project_id = %project.id, number = project.number, "Created project");
        Ok(project)
    }

    /// Resolve a project reference to its node id
    ///
    /// When the owner kind is unknown, organizations are tried before users.
    pub async fn find_project(&self, project: &ProjectRef) -> Result<ProjectInfo> {
        let variables = json!({ "login": project.owner, "number": project.number });

        if project.owner_kind != Some(OwnerKind::User) {
            let query = r#"
                query($login: String!, $number: Int!) {
                    organization(login: $login) {
                        projectV2(number: $number) { id number title }
                    }
                }
            "#;

            match self
                .graphql_query::<OrganizationProject>(query, &variables)
                .await
            {
                Ok(data) => {
                    if let Some(found) = data.organization.and_then(|o| o.project_v2) {
                        return Ok(found);
                    }
                }
                // Unknown organizations come back as GraphQL errors
                Err(Error::GraphQL(messages)) if project.owner_kind.is_none() => {
                    debug!(?messages, owner = %project.owner, "Not an organization project");
                }
                Err(e) => return Err(e),
            }
        }

        if project.owner_kind != Some(OwnerKind::Organization) {
            let query = r#"
                query($login: String!, $number: Int!) {
                    user(login: $login) {
                        projectV2(number: $number) { id number title }
                    }
                }
            "#;

            let data: UserProject = self.graphql_query(query, &variables).await?;
            if let Some(found) = data.user.and_then(|u| u.project_v2) {
                return Ok(found);
            }
        }

        Err(Error::NotFound(format!(
            "project {}/{}",
            project.owner, project.number
        )))
    }

    /// Get field definitions of a project
    pub async fn get_project_fields(&self, project_id: &str) -> Result<Vec<ProjectField>> {
        debug!(project_id, "Fetching project fields");

        let query = r#"
            query($projectId: ID!) {
                node(id: $projectId) {
                    ... on ProjectV2 {
                        fields(first: 100) {
                            nodes {
                                ... on ProjectV2FieldCommon {
                                    id
                                    name
                                    dataType
                                }
                                ... on ProjectV2SingleSelectField {
                                    options {
                                        id
                                        name
                                    }
                                }
                            }
                        }
                    }
                }
            }
        "#;

        let data: NodeData<ProjectFields> = self
            .graphql_query(query, &json!({ "projectId": project_id }))
            .await?;

        let project = data
            .node
            .ok_or_else(|| Error::NotFound(format!("project {}", project_id)))?;

        Ok(project.fields.nodes.into_iter().flatten().collect())
    }

    /// Set one field value on a project item
    pub async fn update_item_field(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        value: &FieldUpdate,
    ) -> Result<()> {
        debug!(project_id, item_id, field_id, "Updating item field");

        let mutation = r#"
            mutation($input: UpdateProjectV2ItemFieldValueInput!) {
                updateProjectV2ItemFieldValue(input: $input) {
                    projectV2Item {
                        id
                    }
                }
            }
        "#;

        let variables = json!({
            "input": {
                "projectId": project_id,
                "itemId": item_id,
                "fieldId": field_id,
                "value": value.to_input(),
            }
        });

        let _: Value = self.graphql_query(mutation, &variables).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_update_inputs() {
        assert_eq!(
            FieldUpdate::Text("high".to_string()).to_input(),
            json!({ "text": "high" })
        );
        assert_eq!(FieldUpdate::Number(3.0).to_input(), json!({ "number": 3.0 }));
        assert_eq!(
            FieldUpdate::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()).to_input(),
            json!({ "date": "2024-03-09" })
        );
        assert_eq!(
            FieldUpdate::SingleSelectOption("opt1".to_string()).to_input(),
            json!({ "singleSelectOptionId": "opt1" })
        );
    }

    #[test]
    fn test_field_update_parse_by_type() {
        let select = ProjectField {
            id: "F1".to_string(),
            name: "Status".to_string(),
            data_type: FieldDataType::SingleSelect,
            options: vec![FieldOption {
                id: "o1".to_string(),
                name: "In Progress".to_string(),
            }],
        };
        assert_eq!(
            FieldUpdate::parse(&select, "in progress").unwrap(),
            FieldUpdate::SingleSelectOption("o1".to_string())
        );
        assert!(FieldUpdate::parse(&select, "Blocked").is_err());

        let number = ProjectField {
            data_type: FieldDataType::Number,
            options: vec![],
            ..select.clone()
        };
        assert_eq!(
            FieldUpdate::parse(&number, "2.5").unwrap(),
            FieldUpdate::Number(2.5)
        );
        assert!(FieldUpdate::parse(&number, "lots").is_err());

        let date = ProjectField {
            data_type: FieldDataType::Date,
            ..number.clone()
        };
        assert_eq!(
            FieldUpdate::parse(&date, "2024-03-09").unwrap(),
            FieldUpdate::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
        );

        let iteration = ProjectField {
            data_type: FieldDataType::Iteration,
            ..number
        };
        assert!(FieldUpdate::parse(&iteration, "Sprint 1").is_err());
    }

    #[test]
    fn test_parse_project_fields() {
        let json = r#"{
            "fields": {
                "nodes": [
                    {"id": "F1", "name": "Title", "dataType": "TITLE"},
                    {"id": "F2", "name": "Status", "dataType": "SINGLE_SELECT",
                     "options": [{"id": "o1", "name": "Todo"}, {"id": "o2", "name": "Done"}]},
                    {"id": "F3", "name": "Estimate", "dataType": "NUMBER"},
                    null
                ]
            }
        }"#;

        let parsed: ProjectFields = serde_json::from_str(json).unwrap();
        let fields: Vec<ProjectField> = parsed.fields.nodes.into_iter().flatten().collect();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].data_type, FieldDataType::Other);

        let status = find_field(&fields, "status").unwrap();
        assert_eq!(status.data_type, FieldDataType::SingleSelect);
        assert_eq!(status.option("DONE").unwrap().id, "o2");
        assert!(status.option("Review").is_none());

        assert!(find_field(&fields, "Priority").is_none());
    }

    #[test]
    fn test_project_summary_conversion() {
        let node: ProjectSummaryNode = serde_json::from_str(
            r#"{"id": "PVT_1", "number": 4, "title": "Roadmap", "shortDescription": "",
                "public": false, "closed": false, "items": {"totalCount": 12}}"#,
        )
        .unwrap();

        let summary = ProjectSummary::from(node);
        assert_eq!(summary.item_count, 12);
        assert_eq!(summary.short_description, None);
    }
}
