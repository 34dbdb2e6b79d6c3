//! Project view commands

use clap::{Args, Subcommand, ValueEnum};
use serde_json::json;
use trellis_core::Config;
use trellis_github::ViewLayout;

use super::{get_client, print_json, resolve_project_id};

/// Project view commands
#[derive(Args, Debug)]
pub struct ViewArgs {
    #[command(subcommand)]
    pub command: ViewCommand,
}

#[derive(Subcommand, Debug)]
pub enum ViewCommand {
    /// Create a view
    Create {
        /// Project node id, URL or owner/number
        project: String,

        /// View name
        name: String,

        /// View layout
        #[arg(short, long, default_value = "table")]
        layout: LayoutArg,
    },

    /// Rename a view or change its layout
    Update {
        /// Project node id, URL or owner/number
        project: String,

        /// View id
        view_id: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New layout
        #[arg(short, long)]
        layout: Option<LayoutArg>,
    },

    /// Delete a view
    Delete {
        /// Project node id, URL or owner/number
        project: String,

        /// View id
        view_id: String,
    },

    /// List views
    List {
        /// Project node id, URL or owner/number
        project: String,

        /// Maximum number of views
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    Board,
    Table,
    Roadmap,
}

impl From<LayoutArg> for ViewLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Board => ViewLayout::Board,
            LayoutArg::Table => ViewLayout::Table,
            LayoutArg::Roadmap => ViewLayout::Roadmap,
        }
    }
}

impl ViewArgs {
    /// Execute the view command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = get_client(config)?;

        match &self.command {
            ViewCommand::Create {
                project,
                name,
                layout,
            } => {
                let project_id = resolve_project_id(&client, project).await?;
                let view = client
                    .create_view(&project_id, name, (*layout).into())
                    .await?;
                print_json(&view)
            }
            ViewCommand::Update {
                project,
                view_id,
                name,
                layout,
            } => {
                let project_id = resolve_project_id(&client, project).await?;
                let view = client
                    .update_view(
                        &project_id,
                        view_id,
                        name.as_deref(),
                        layout.map(ViewLayout::from),
                    )
                    .await?;
                print_json(&view)
            }
            ViewCommand::Delete { project, view_id } => {
                let project_id = resolve_project_id(&client, project).await?;
                let deleted = client.delete_view(&project_id, view_id).await?;
                print_json(&json!({ "deleted_view_id": deleted }))
            }
            ViewCommand::List { project, limit } => {
                let project_id = resolve_project_id(&client, project).await?;
                let views = client.list_views(&project_id, *limit).await?;
                print_json(&views)
            }
        }
    }
}
