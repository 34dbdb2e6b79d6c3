//! Project item commands

use clap::{Args, Subcommand};
use serde_json::json;
use trellis_core::Config;

use super::{get_client, print_json, resolve_project_id};

/// Project item commands
#[derive(Args, Debug)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub command: ItemCommand,
}

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
    /// Add an issue or pull request to a project
    Add {
        /// Project node id, URL or owner/number
        project: String,

        /// Node id of the issue or pull request
        content_id: String,
    },

    /// Remove an item from a project
    Delete {
        /// Project node id, URL or owner/number
        project: String,

        /// Project item id
        item_id: String,
    },

    /// List items with their field values and relationships
    List {
        /// Project node id, URL or owner/number
        project: String,

        /// Maximum number of items
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

impl ItemArgs {
    /// Execute the item command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = get_client(config)?;

        match &self.command {
            ItemCommand::Add {
                project,
                content_id,
            } => {
                let project_id = resolve_project_id(&client, project).await?;
                let item_id = client.add_item(&project_id, content_id).await?;
                print_json(&json!({ "id": item_id }))
            }
            ItemCommand::Delete { project, item_id } => {
                let project_id = resolve_project_id(&client, project).await?;
                let deleted = client.delete_item(&project_id, item_id).await?;
                print_json(&json!({ "deleted_item_id": deleted }))
            }
            ItemCommand::List { project, limit } => {
                let project_id = resolve_project_id(&client, project).await?;
                let items = client.list_items(&project_id, *limit).await?;
                print_json(&items)
            }
        }
    }
}
