//! Chart acquisition and rendering.
//!
//! The fetcher and renderer are traits so the pipeline can run against the
//! `helm` executable in production and against fakes in tests.

pub mod archive;
pub mod error;
pub mod fetch;
pub mod render;

use crate::gitops::Source;

pub use archive::extract_archive;
pub use error::ChartError;
pub use fetch::{ChartFetcher, HelmFetcher};
pub use render::{HelmRenderer, RenderRequest, TemplateRenderer};

/// Default name of the helm executable.
pub const HELM_PROGRAM: &str = "helm";

/// Identifies one chart release in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub repo_url: String,
    pub chart: String,
    pub revision: String,
}

impl ChartRequest {
    pub fn new(
        repo_url: impl Into<String>,
        chart: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            chart: chart.into(),
            revision: revision.into(),
        }
    }

    pub fn from_source(source: &Source) -> Self {
        Self::new(&source.repo_url, &source.chart, &source.target_revision)
    }

    /// A repository URL without a scheme addresses an OCI registry.
    pub fn is_registry(&self) -> bool {
        !self.repo_url.contains("://")
    }

    /// The `oci://` reference used to pull from a registry.
    pub fn oci_reference(&self) -> String {
        format!(
            "oci://{}/{}",
            self.repo_url.trim_end_matches('/'),
            self.chart
        )
    }
}
