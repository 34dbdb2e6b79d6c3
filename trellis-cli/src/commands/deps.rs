//! Dependency commands

use clap::{Args, Subcommand};
use serde_json::json;
use trellis_core::{AnalysisCriteria, Config, Engine};
use trellis_github::DependencyUpdate;

use super::{get_client, print_json, resolve_project_id};

/// Dependency commands
#[derive(Args, Debug)]
pub struct DepsArgs {
    #[command(subcommand)]
    pub command: DepsCommand,
}

#[derive(Subcommand, Debug)]
pub enum DepsCommand {
    /// Replace the relationships declared on an item
    ///
    /// Lists that are not given keep their current value; pass a flag with
    /// no ids to clear that list.
    Set {
        /// Project node id, URL or owner/number
        project: String,

        /// Project item id
        item_id: String,

        /// Items this one blocks (comma-separated)
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        blocks: Option<Vec<String>>,

        /// Items blocking this one (comma-separated)
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        blocked_by: Option<Vec<String>>,

        /// Related items (comma-separated)
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        related_to: Option<Vec<String>>,
    },

    /// Check for cycles, dangling references and status inconsistencies
    ///
    /// Runs every check unless some are selected.
    Analyze {
        /// Project node id, URL or owner/number
        project: String,

        /// Find dependency cycles
        #[arg(long)]
        cycles: bool,

        /// Find references to items outside the project
        #[arg(long)]
        missing: bool,

        /// Find items that progressed past an unfinished blocker
        #[arg(long)]
        status: bool,
    },
}

fn criteria(cycles: bool, missing: bool, status: bool) -> AnalysisCriteria {
    if !(cycles || missing || status) {
        return AnalysisCriteria::all();
    }
    AnalysisCriteria {
        check_cycles: cycles,
        check_missing: missing,
        check_status: status,
    }
}

impl DepsArgs {
    /// Execute the deps command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = get_client(config)?;

        match &self.command {
            DepsCommand::Set {
                project,
                item_id,
                blocks,
                blocked_by,
                related_to,
            } => {
                let update = DependencyUpdate {
                    blocks: blocks.clone(),
                    blocked_by: blocked_by.clone(),
                    related_to: related_to.clone(),
                };
                if update.is_empty() {
                    anyhow::bail!("Nothing to update. Pass --blocks, --blocked-by or --related-to");
                }

                let project_id = resolve_project_id(&client, project).await?;
                client
                    .manage_item_dependencies(&project_id, item_id, &update)
                    .await?;
                print_json(&json!({ "success": true }))
            }
            DepsCommand::Analyze {
                project,
                cycles,
                missing,
                status,
            } => {
                let project_id = resolve_project_id(&client, project).await?;
                let engine = Engine::new(client, config.clone());
                let analysis = engine
                    .analyze_dependencies(&project_id, criteria(*cycles, *missing, *status))
                    .await?;
                print_json(&analysis)
            }
        }
    }
}
