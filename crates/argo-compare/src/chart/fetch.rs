use std::path::{Path, PathBuf};

use log::{debug, info};
use secrecy::ExposeSecret;

use super::error::{ChartError, Result};
use super::{ChartRequest, HELM_PROGRAM};
use crate::config::RepoCredentials;
use crate::process::{format_output_error, run_in};
use crate::sanitize::redact_repo_url;
use crate::storage::cache::ARCHIVE_EXTENSION;

/// Downloads chart archives.
pub trait ChartFetcher: Send + Sync {
    /// Downloads the archive for `request` into `destination` and returns its path.
    fn fetch(
        &self,
        request: &ChartRequest,
        credentials: Option<&RepoCredentials>,
        destination: &Path,
    ) -> Result<PathBuf>;
}

/// Fetches charts with `helm pull`.
#[derive(Debug, Clone)]
pub struct HelmFetcher {
    program: String,
}

impl Default for HelmFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HelmFetcher {
    pub fn new() -> Self {
        Self::with_program(HELM_PROGRAM)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ChartFetcher for HelmFetcher {
    fn fetch(
        &self,
        request: &ChartRequest,
        credentials: Option<&RepoCredentials>,
        destination: &Path,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(destination).map_err(|e| ChartError::io(destination, e))?;

        info!(
            "Downloading chart '{}' version '{}' from {}",
            request.chart,
            request.revision,
            redact_repo_url(&request.repo_url)
        );

        let args = pull_args(request, credentials, destination);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = run_in(destination, &self.program, &arg_refs).map_err(|e| ChartError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(ChartError::Fetch {
                repo: redact_repo_url(&request.repo_url),
                chart: request.chart.clone(),
                revision: request.revision.clone(),
                message: format_output_error(&output),
            });
        }

        let archive = find_archive(destination, &request.chart)?;
        debug!("Downloaded {}", archive.display());
        Ok(archive)
    }
}

/// Builds the `helm pull` arguments, rewriting registry URLs to `oci://`.
pub fn pull_args(
    request: &ChartRequest,
    credentials: Option<&RepoCredentials>,
    destination: &Path,
) -> Vec<String> {
    let mut args = vec!["pull".to_string()];

    if request.is_registry() {
        args.push(request.oci_reference());
    } else {
        args.push(request.chart.clone());
        args.push("--repo".to_string());
        args.push(request.repo_url.clone());
    }

    if !request.revision.is_empty() {
        args.push("--version".to_string());
        args.push(request.revision.clone());
    }

    args.push("--destination".to_string());
    args.push(destination.to_string_lossy().into_owned());

    if let Some(creds) = credentials {
        args.push("--username".to_string());
        args.push(creds.username.clone());
        args.push("--password".to_string());
        args.push(creds.password.expose_secret().to_string());
    }

    args
}

fn find_archive(directory: &Path, chart: &str) -> Result<PathBuf> {
    let entries = std::fs::read_dir(directory).map_err(|e| ChartError::io(directory, e))?;

    let mut archives = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ChartError::io(directory, e))?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(ARCHIVE_EXTENSION) {
            archives.push(path);
        }
    }
    archives.sort();

    let prefix = format!("{}-", chart);
    let preferred = archives.iter().position(|path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with(&prefix))
    });

    match preferred {
        Some(index) => Ok(archives.swap_remove(index)),
        None if !archives.is_empty() => Ok(archives.swap_remove(0)),
        None => Err(ChartError::NoArchive {
            chart: chart.to_string(),
            directory: directory.to_path_buf(),
        }),
    }
}
