//! GitHub API client using octocrab and the GraphQL endpoint

use crate::{Error, Result};
use octocrab::Octocrab;
use serde::Serialize;
use trellis_core::{GitHubConfig, Token};
use tracing::{debug, info};

/// GitHub API client for project operations
pub struct GitHubClient {
    client: Octocrab,
    http: reqwest::Client,
    token: String,
    graphql_url: String,
    page_size: u32,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// Token is loaded from (in priority order):
    /// 1. GITHUB_TOKEN environment variable
    /// 2. ~/.config/trellis/secrets.toml
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let token = Token::resolve()
            .map_err(|e| Error::Auth(e.to_string()))?
            .ok_or_else(|| {
                Error::Auth(
                    "GitHub token not found. Set GITHUB_TOKEN environment variable \
                     or add token to ~/.config/trellis/secrets.toml"
                        .to_string(),
                )
            })?;

        Self::with_token(token.as_str(), config)
    }

    /// Create a client with an explicit token
    pub fn with_token(token: impl Into<String>, config: &GitHubConfig) -> Result<Self> {
        let token = token.into();

        let client = Octocrab::builder()
            .personal_token(token.clone())
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("trellis/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(graphql_url = %config.graphql_url, "Created GitHub client");

        Ok(Self {
            client,
            http,
            token,
            graphql_url: config.graphql_url.clone(),
            page_size: config.page_size.clamp(1, 100),
        })
    }

    /// Items requested per GraphQL page
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    pub(crate) fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Test the connection and return the authenticated login
    pub async fn test_connection(&self) -> Result<String> {
        debug!("Testing GitHub connection");

        let user = self.client.current().user().await.map_err(|e| match e {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("Bad credentials") =>
            {
                Error::Auth("Invalid GitHub token".to_string())
            }
            other => Error::Api(other),
        })?;

        info!(login = %user.login, "GitHub connection successful");
        Ok(user.login)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("graphql_url", &self.graphql_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Whether a project belongs to an organization or a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Organization,
    User,
}

/// Reference to a project by owner login and number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRef {
    pub owner: String,
    /// `None` when the URL did not say; lookups try organization then user
    pub owner_kind: Option<OwnerKind>,
    pub number: u64,
}

/// Parse a project URL or shorthand into a project reference
///
/// Supports formats:
/// - owner/12
/// - https://github.com/orgs/owner/projects/12
/// - https://github.com/users/owner/projects/12
pub fn parse_project_url(input: &str) -> Result<ProjectRef> {
    let input = input.trim();

    let is_url = input.starts_with("https://") || input.starts_with("http://");

    let (owner_kind, owner, number) = if is_url {
        let url = url::Url::parse(input).map_err(|e| Error::Parse(e.to_string()))?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            ["orgs", owner, "projects", number, ..] => (
                Some(OwnerKind::Organization),
                owner.to_string(),
                number.to_string(),
            ),
            ["users", owner, "projects", number, ..] => (
                Some(OwnerKind::User),
                owner.to_string(),
                number.to_string(),
            ),
            _ => {
                return Err(Error::Parse(format!(
                    "Invalid project URL path: {}",
                    url.path()
                )))
            }
        }
    } else {
        match input.split('/').collect::<Vec<_>>().as_slice() {
            [owner, number] if !owner.is_empty() => (None, owner.to_string(), number.to_string()),
            _ => {
                return Err(Error::Parse(format!(
                    "Invalid project format: {}. Expected owner/number",
                    input
                )))
            }
        }
    };

    let number = number
        .parse()
        .map_err(|_| Error::Parse(format!("Invalid project number: {}", number)))?;

    Ok(ProjectRef {
        owner,
        owner_kind,
        number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shorthand() {
        let project = parse_project_url("acme/7").unwrap();
        assert_eq!(project.owner, "acme");
        assert_eq!(project.owner_kind, None);
        assert_eq!(project.number, 7);
    }

    #[test]
    fn test_parse_org_url() {
        let project = parse_project_url("https://github.com/orgs/acme/projects/12").unwrap();
        assert_eq!(project.owner, "acme");
        assert_eq!(project.owner_kind, Some(OwnerKind::Organization));
        assert_eq!(project.number, 12);
    }

    #[test]
    fn test_parse_user_url_with_view_suffix() {
        let project =
            parse_project_url("https://github.com/users/octocat/projects/3/views/1").unwrap();
        assert_eq!(project.owner, "octocat");
        assert_eq!(project.owner_kind, Some(OwnerKind::User));
        assert_eq!(project.number, 3);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_project_url("acme").is_err());
        assert!(parse_project_url("acme/seven").is_err());
        assert!(parse_project_url("https://github.com/acme/repo").is_err());
    }
}
