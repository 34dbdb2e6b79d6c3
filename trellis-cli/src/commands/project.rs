//! Project commands

use clap::{Args, Subcommand};
use serde_json::json;
use trellis_core::Config;
use trellis_github::{find_field, FieldUpdate};

use super::{get_client, print_json, resolve_project_id};

/// Project commands
#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List projects of an organization, or your own
    List {
        /// Organization login (lists your projects if not specified)
        #[arg(short, long)]
        org: Option<String>,

        /// Maximum number of projects
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// Create a project
    Create {
        /// Organization or user login that will own the project
        owner: String,

        /// Project title
        title: String,

        /// Short description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Show field definitions of a project
    Fields {
        /// Project node id, URL or owner/number
        project: String,
    },

    /// Set a field value on an item
    SetField {
        /// Project node id, URL or owner/number
        project: String,

        /// Project item id
        item_id: String,

        /// Field name
        field: String,

        /// New value; option name for single-select fields, YYYY-MM-DD for dates
        value: String,
    },
}

impl ProjectArgs {
    /// Execute the project command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = get_client(config)?;

        match &self.command {
            ProjectCommand::List { org, limit } => {
                let projects = match org {
                    Some(org) => client.list_organization_projects(org, *limit).await?,
                    None => client.list_viewer_projects(*limit).await?,
                };
                print_json(&projects)
            }
            ProjectCommand::Create {
                owner,
                title,
                description,
            } => {
                let project = client
                    .create_project(owner, title, description.as_deref())
                    .await?;
                print_json(&project)
            }
            ProjectCommand::Fields { project } => {
                let project_id = resolve_project_id(&client, project).await?;
                let fields = client.get_project_fields(&project_id).await?;
                print_json(&fields)
            }
            ProjectCommand::SetField {
                project,
                item_id,
                field,
                value,
            } => {
                let project_id = resolve_project_id(&client, project).await?;
                let fields = client.get_project_fields(&project_id).await?;
                let field = find_field(&fields, field)
                    .ok_or_else(|| trellis_github::Error::FieldNotFound(field.clone()))?;
                let update = FieldUpdate::parse(field, value)?;

                client
                    .update_item_field(&project_id, item_id, &field.id, &update)
                    .await?;
                print_json(&json!({ "success": true }))
            }
        }
    }
}
