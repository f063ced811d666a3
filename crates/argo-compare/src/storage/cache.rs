//! On-disk store of downloaded chart archives.
//!
//! Archives live under `<root>/<repo segment>/` as `<chart>-<version>.tgz`.
//! Lookup also accepts a `v` prefix on the version and Helm's `_` in place of
//! `+` build metadata. Entries are never evicted.

use std::io::Write;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, warn};
use tempfile::NamedTempFile;

use super::error::{CacheError, Result};

pub const ARCHIVE_EXTENSION: &str = "tgz";

/// Chart archive cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct ChartCache {
    root: PathBuf,
}

impl ChartCache {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the archives of one repository.
    pub fn repo_dir(&self, repo_url: &str) -> PathBuf {
        self.root.join(repo_segment(repo_url))
    }

    /// Returns true when at least one archive matches the key.
    ///
    /// An unreadable cache directory counts as a miss and is logged as a warning.
    pub fn has(&self, repo_url: &str, chart: &str, revision: &str) -> bool {
        cache_hit(chart, self.matches(repo_url, chart, revision))
    }

    /// Stores an archive under the repository's directory.
    ///
    /// The bytes are staged in a temp file next to the destination and renamed
    /// into place. Concurrent stores of the same key are last-write-wins.
    pub fn store(&self, repo_url: &str, file_name: &str, archive: &[u8]) -> Result<PathBuf> {
        if file_name.is_empty() || file_name.contains('/') || file_name.contains('\\') {
            return Err(CacheError::InvalidFileName(file_name.to_string()));
        }

        let dir = self.repo_dir(repo_url);
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::CreateDirectory {
            path: dir.clone(),
            source: e,
        })?;

        let destination = dir.join(file_name);
        let write_err = |e: std::io::Error| CacheError::WriteFile {
            path: destination.clone(),
            source: e,
        };

        let mut staged = NamedTempFile::new_in(&dir).map_err(write_err)?;
        staged.write_all(archive).map_err(write_err)?;
        staged.flush().map_err(write_err)?;
        staged
            .persist(&destination)
            .map_err(|e| write_err(e.error))?;

        debug!("Cached chart archive {}", destination.display());
        Ok(destination)
    }

    /// Finds the single archive matching the key.
    ///
    /// Zero matches and more than one match are both errors.
    pub fn lookup(&self, repo_url: &str, chart: &str, revision: &str) -> Result<PathBuf> {
        let mut found = self.matches(repo_url, chart, revision)?;
        match found.len() {
            0 => Err(CacheError::NotFound {
                chart: chart.to_string(),
                revision: revision.to_string(),
                directory: self.repo_dir(repo_url),
            }),
            1 => Ok(found.remove(0)),
            _ => Err(CacheError::Ambiguous {
                chart: chart.to_string(),
                revision: revision.to_string(),
                matches: found,
            }),
        }
    }

    fn matches(&self, repo_url: &str, chart: &str, revision: &str) -> Result<Vec<PathBuf>> {
        let dir = self.repo_dir(repo_url);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let pattern = archive_pattern(chart)?;
        let entries = std::fs::read_dir(&dir).map_err(|e| CacheError::ReadDirectory {
            path: dir.clone(),
            source: e,
        })?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::ReadDirectory {
                path: dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matched = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| {
                    pattern.matches(name) && archive_matches(name, chart, revision)
                });
            if matched {
                found.push(path);
            }
        }

        found.sort();
        Ok(found)
    }
}

fn cache_hit(chart: &str, lookup: Result<Vec<PathBuf>>) -> bool {
    match lookup {
        Ok(found) => !found.is_empty(),
        Err(e) => {
            warn!("Cache lookup for '{}' failed, fetching again: {}", chart, e);
            false
        }
    }
}

/// Candidate archives of one chart: `<chart>-*.tgz`.
fn archive_pattern(chart: &str) -> Result<Pattern> {
    let raw = format!("{}-*.{}", Pattern::escape(chart), ARCHIVE_EXTENSION);
    Pattern::new(&raw).map_err(|e| CacheError::Pattern {
        pattern: raw.clone(),
        message: e.to_string(),
    })
}

/// Returns true when `file_name` is the archive of exactly `chart` at `revision`.
///
/// A `v` prefix on either version is ignored and `_` in the file name stands
/// for `+` build metadata, so `nginx-v1.0.0.tgz` and `nginx-1.0.0_b5.tgz`
/// match `1.0.0` and `1.0.0+b5`. `nginx-exporter-1.0.0.tgz` and
/// `nginx-11.0.0.tgz` never match `nginx` at `1.0.0`. An empty revision
/// accepts any version of the chart.
fn archive_matches(file_name: &str, chart: &str, revision: &str) -> bool {
    let Some(version) = file_name
        .strip_prefix(chart)
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|rest| rest.strip_suffix(ARCHIVE_EXTENSION))
        .and_then(|rest| rest.strip_suffix('.'))
    else {
        return false;
    };

    if revision.is_empty() {
        return !version.is_empty();
    }

    let version = version.strip_prefix('v').unwrap_or(version);
    let revision = revision.strip_prefix('v').unwrap_or(revision);
    version == revision || version.replace('_', "+") == revision
}

/// Turns a repository URL into a single directory name.
///
/// The scheme is dropped and anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn repo_segment(repo_url: &str) -> String {
    let without_scheme = repo_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(repo_url);
    let trimmed = without_scheme.trim_matches('/');

    trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
