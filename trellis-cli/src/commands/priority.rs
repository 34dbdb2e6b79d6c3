//! Priority commands

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use serde_json::json;
use trellis_core::{ClientPriority, Config, Level, PriorityCriteria};
use trellis_github::PriorityUpdate;

use super::{get_client, print_json, resolve_project_id};

/// Priority commands
#[derive(Args, Debug)]
pub struct PriorityArgs {
    #[command(subcommand)]
    pub command: PriorityCommand,
}

/// Rubric inputs shared by `assess` and `score`
#[derive(Args, Debug, Clone, Copy)]
pub struct CriteriaArgs {
    /// Business value of the work
    #[arg(long)]
    business_value: LevelArg,

    /// Technical complexity of the work
    #[arg(long)]
    technical_complexity: LevelArg,

    /// How strongly the client asked for it
    #[arg(long)]
    client_priority: ClientArg,
}

impl From<CriteriaArgs> for PriorityCriteria {
    fn from(args: CriteriaArgs) -> Self {
        PriorityCriteria {
            business_value: args.business_value.into(),
            technical_complexity: args.technical_complexity.into(),
            client_priority: args.client_priority.into(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum PriorityCommand {
    /// Score an item and write the priority to the project
    Assess {
        /// Project node id, URL or owner/number
        project: String,

        /// Project item id
        item_id: String,

        #[command(flatten)]
        criteria: CriteriaArgs,
    },

    /// Write priorities for many items from a JSON file
    ///
    /// The file holds `[{"item_id": "...", "priority": "high"}, ...]`;
    /// use `-` to read standard input.
    Batch {
        /// Project node id, URL or owner/number
        project: String,

        /// Path to the JSON updates
        file: PathBuf,
    },

    /// Score criteria without touching any project
    Score {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LevelArg {
    High,
    Medium,
    Low,
}

impl From<LevelArg> for Level {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::High => Level::High,
            LevelArg::Medium => Level::Medium,
            LevelArg::Low => Level::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ClientArg {
    Urgent,
    High,
    Normal,
    Low,
}

impl From<ClientArg> for ClientPriority {
    fn from(arg: ClientArg) -> Self {
        match arg {
            ClientArg::Urgent => ClientPriority::Urgent,
            ClientArg::High => ClientPriority::High,
            ClientArg::Normal => ClientPriority::Normal,
            ClientArg::Low => ClientPriority::Low,
        }
    }
}

fn read_updates(file: &Path) -> anyhow::Result<Vec<PriorityUpdate>> {
    let contents = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?
    };

    Ok(serde_json::from_str(&contents)?)
}

impl PriorityArgs {
    /// Execute the priority command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let field = &config.metrics.priority_field;

        match &self.command {
            PriorityCommand::Assess {
                project,
                item_id,
                criteria,
            } => {
                let client = get_client(config)?;
                let project_id = resolve_project_id(&client, project).await?;
                let assessment = client
                    .assess_item_priority(&project_id, item_id, &(*criteria).into(), field)
                    .await?;
                print_json(&assessment)
            }
            PriorityCommand::Batch { project, file } => {
                let updates = read_updates(file)?;
                let client = get_client(config)?;
                let project_id = resolve_project_id(&client, project).await?;
                let outcomes = client
                    .batch_update_priorities(&project_id, &updates, field)
                    .await?;
                print_json(&outcomes)
            }
            PriorityCommand::Score { criteria } => {
                let criteria = PriorityCriteria::from(*criteria);
                print_json(&json!({
                    "score": criteria.score(),
                    "priority": criteria.priority(),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use trellis_core::Priority;

    #[test]
    fn test_criteria_conversion() {
        let args = CriteriaArgs {
            business_value: LevelArg::Medium,
            technical_complexity: LevelArg::High,
            client_priority: ClientArg::Normal,
        };
        let criteria = PriorityCriteria::from(args);
        assert_eq!(criteria.score(), 5);
        assert_eq!(criteria.priority(), Priority::Medium);
    }

    #[test]
    fn test_read_updates_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"[{{"item_id": "I1", "priority": "medium"}}]"#).unwrap();

        let updates = read_updates(file.path()).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].priority, Priority::Medium);
    }

    #[test]
    fn test_read_updates_rejects_unknown_priority() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"[{{"item_id": "I1", "priority": "critical"}}]"#).unwrap();

        assert!(read_updates(file.path()).is_err());
    }
}
