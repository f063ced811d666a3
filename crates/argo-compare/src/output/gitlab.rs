use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::comment::CommentPublisher;
use super::error::{OutputError, Result};
use crate::secrets::resolve_secret;

pub const API_URL_ENV: &str = "CI_API_V4_URL";
pub const PROJECT_ID_ENV: &str = "CI_PROJECT_ID";
pub const MERGE_REQUEST_IID_ENV: &str = "CI_MERGE_REQUEST_IID";
pub const TOKEN_ENV: &str = "GITLAB_TOKEN";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum length of an error body kept in errors and logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

#[derive(Serialize)]
struct NoteRequest<'a> {
    body: &'a str,
}

/// Posts notes on a GitLab merge request.
pub struct GitLabPublisher {
    client: Client,
    api_url: String,
    project_id: String,
    merge_request_iid: String,
    token: SecretString,
}

impl GitLabPublisher {
    pub fn new(
        api_url: impl Into<String>,
        project_id: impl Into<String>,
        merge_request_iid: impl Into<String>,
        token: SecretString,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            project_id: project_id.into(),
            merge_request_iid: merge_request_iid.into(),
            token,
        })
    }

    /// Builds a publisher from the GitLab CI environment.
    ///
    /// The token comes from `token` if given, else `token_file`, else `GITLAB_TOKEN`.
    pub fn from_env(token: Option<&str>, token_file: Option<&str>) -> Result<Self> {
        let token = resolve_secret(token, token_file, Some(TOKEN_ENV))?;
        Self::new(
            required_env(API_URL_ENV)?,
            required_env(PROJECT_ID_ENV)?,
            required_env(MERGE_REQUEST_IID_ENV)?,
            token,
        )
    }

    pub fn notes_url(&self) -> String {
        format!(
            "{}/projects/{}/merge_requests/{}/notes",
            self.api_url.trim_end_matches('/'),
            self.project_id,
            self.merge_request_iid
        )
    }
}

#[async_trait]
impl CommentPublisher for GitLabPublisher {
    async fn post(&self, body: &str) -> Result<()> {
        let url = self.notes_url();
        debug!("Posting {} byte comment to {}", body.len(), url);

        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", self.token.expose_secret())
            .json(&NoteRequest { body })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OutputError::Publish {
                status,
                body: truncate(&body),
            });
        }

        Ok(())
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| OutputError::MissingEnvVar(name.to_string()))
}

fn truncate(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body.to_string()
    }
}
