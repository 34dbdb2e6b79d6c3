//! CLI command implementations

pub mod deps;
pub mod item;
pub mod metrics;
pub mod priority;
pub mod project;
pub mod view;

pub use deps::DepsArgs;
pub use item::ItemArgs;
pub use metrics::MetricsArgs;
pub use priority::PriorityArgs;
pub use project::ProjectArgs;
pub use view::ViewArgs;

use serde::Serialize;
use trellis_core::Config;
use trellis_github::{parse_project_url, GitHubClient};

/// Print a result as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn get_client(config: &Config) -> anyhow::Result<GitHubClient> {
    Ok(GitHubClient::new(&config.github)?)
}

/// Accept a project node id, a project URL or `owner/number`
async fn resolve_project_id(client: &GitHubClient, project: &str) -> anyhow::Result<String> {
    match parse_project_url(project) {
        Ok(reference) => {
            let info = client.find_project(&reference).await?;
            tracing::debug!(
                project,
                project_id = %info.id,
                title = %info.title,
                "Resolved project"
            );
            Ok(info.id)
        }
        // Node ids never contain a slash, so anything unparseable is taken as one
        Err(_) => Ok(project.to_string()),
    }
}
