use std::path::PathBuf;

use log::debug;
use secrecy::SecretString;
use serde::Deserialize;

use crate::config::schema::{CredentialStore, RepoCredentials};
use crate::error::ConfigError;
use crate::sanitize::redact_repo_url;

/// Prefix of environment variables carrying repository credentials.
pub const REPO_CREDS_PREFIX: &str = "REPO_CREDS_";
/// Overrides the chart cache location.
pub const CACHE_DIR_ENV: &str = "ARGO_COMPARE_CACHE_DIR";
/// Default external diff tool.
pub const EXTERNAL_DIFF_TOOL_ENV: &str = "EXTERNAL_DIFF_TOOL";

const CACHE_DIR_NAME: &str = "argo-compare";

#[derive(Deserialize)]
struct RawCredentials {
    url: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Loads every `REPO_CREDS_*` variable from the process environment.
pub fn load_repo_credentials_from_env() -> Result<CredentialStore, ConfigError> {
    let mut vars: Vec<(String, String)> = std::env::vars()
        .filter(|(name, _)| name.starts_with(REPO_CREDS_PREFIX))
        .collect();
    vars.sort_by(|a, b| a.0.cmp(&b.0));

    let mut entries = Vec::with_capacity(vars.len());
    for (name, value) in vars {
        let creds = parse_credentials(&name, &value)?;
        debug!(
            "Loaded credentials for '{}' from {}",
            redact_repo_url(&creds.url),
            name
        );
        entries.push(creds);
    }

    Ok(CredentialStore::new(entries))
}

/// Parses one credentials blob of shape `{"url": ..., "username": ..., "password": ...}`.
pub fn parse_credentials(variable: &str, value: &str) -> Result<RepoCredentials, ConfigError> {
    let raw: RawCredentials =
        serde_json::from_str(value).map_err(|e| ConfigError::InvalidCredentials {
            variable: variable.to_string(),
            message: e.to_string(),
        })?;

    if raw.url.trim().is_empty() {
        return Err(ConfigError::InvalidCredentials {
            variable: variable.to_string(),
            message: "url must not be empty".to_string(),
        });
    }

    Ok(RepoCredentials {
        url: raw.url,
        username: raw.username,
        password: SecretString::from(raw.password),
    })
}

/// Returns `ARGO_COMPARE_CACHE_DIR`, else the platform cache directory.
pub fn default_cache_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::cache_dir().map(|dir| dir.join(CACHE_DIR_NAME))
}

/// Returns `EXTERNAL_DIFF_TOOL` when set and non-empty.
pub fn default_external_diff_tool() -> Option<String> {
    std::env::var(EXTERNAL_DIFF_TOOL_ENV)
        .ok()
        .filter(|tool| !tool.trim().is_empty())
}
