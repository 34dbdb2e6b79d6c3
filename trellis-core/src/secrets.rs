//! GitHub token lookup
//!
//! `GITHUB_TOKEN` wins. Otherwise the token is read from the `[github]` table
//! of `~/.config/trellis/secrets.toml`, which must not be readable by group or
//! others on Unix.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

/// Where a token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Env,
    File,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Env => f.write_str("GITHUB_TOKEN"),
            TokenSource::File => f.write_str("secrets file"),
        }
    }
}

/// A GitHub token; never printed by `Debug`
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    source: TokenSource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecretsFile {
    github: GitHubTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GitHubTable {
    token: Option<String>,
}

impl Token {
    /// Look up the token from the environment, then the default secrets file
    pub fn resolve() -> Result<Option<Self>> {
        let env = std::env::var("GITHUB_TOKEN").ok();
        Self::resolve_from(env, Self::default_path().as_deref())
    }

    /// Look up a token from an env value and a secrets file path
    ///
    /// A missing file is not an error; an unreadable or world-readable one is.
    pub fn resolve_from(env: Option<String>, path: Option<&Path>) -> Result<Option<Self>> {
        if let Some(token) = Self::new(env.unwrap_or_default(), TokenSource::Env) {
            debug!("Using GitHub token from GITHUB_TOKEN");
            return Ok(Some(token));
        }

        match path {
            Some(path) if path.exists() => {
                let token = Self::read_file(path)?;
                if token.is_some() {
                    debug!(path = %path.display(), "Using GitHub token from secrets file");
                }
                Ok(token)
            }
            _ => Ok(None),
        }
    }

    /// `~/.config/trellis/secrets.toml` on Unix
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("trellis").join("secrets.toml"))
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    fn new(raw: String, source: TokenSource) -> Option<Self> {
        let value = raw.trim();
        (!value.is_empty()).then(|| Token {
            value: value.to_string(),
            source,
        })
    }

    fn read_file(path: &Path) -> Result<Option<Self>> {
        ensure_private(path)?;

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let file: SecretsFile = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        Ok(file
            .github
            .token
            .and_then(|raw| Self::new(raw, TokenSource::File)))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn ensure_private(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path).map_err(Error::Io)?.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(Error::Config(format!(
            "Secrets file {} has insecure permissions {:o}, run: chmod 600 {}",
            path.display(),
            mode & 0o777,
            path.display()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_private(_path: &Path) -> Result<()> {
    Ok(())
}
