use std::path::{Path, PathBuf};

use crate::gitops::Application;

/// Which side of the comparison a pipeline run renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    /// The application as of HEAD.
    Source,
    /// The application as of the target branch.
    Destination,
}

impl Revision {
    /// Short label used in workspace paths.
    pub fn label(&self) -> &'static str {
        match self {
            Revision::Source => "src",
            Revision::Destination => "dst",
        }
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Workspace directory holding the rendered templates of one revision.
pub fn templates_dir(workspace: &Path, revision: Revision) -> PathBuf {
    workspace.join("templates").join(revision.label())
}

pub struct PipelineContext<'a> {
    // Input
    pub application: &'a Application,
    pub revision: Revision,
    pub workspace: PathBuf,

    // GenerateValues result, one per source
    pub values_files: Vec<PathBuf>,

    // Extract result, one per source
    pub chart_dirs: Vec<PathBuf>,

    // Render target
    pub output_dir: PathBuf,
}

impl<'a> PipelineContext<'a> {
    pub fn new(application: &'a Application, revision: Revision, workspace: &Path) -> Self {
        Self {
            application,
            revision,
            workspace: workspace.to_path_buf(),
            values_files: Vec::new(),
            chart_dirs: Vec::new(),
            output_dir: templates_dir(workspace, revision),
        }
    }

    /// Where the values file of source `index` is written.
    pub fn values_path(&self, index: usize, chart: &str) -> PathBuf {
        let name = if self.application.is_multi_source() {
            format!("{}-{}-values-{}.yaml", chart, index, self.revision.label())
        } else {
            format!("{}-values-{}.yaml", chart, self.revision.label())
        };
        self.workspace.join(name)
    }

    /// Where the chart of source `index` is extracted.
    pub fn extract_dir(&self, index: usize) -> PathBuf {
        let base = self.workspace.join("charts").join(self.revision.label());
        if self.application.is_multi_source() {
            base.join(index.to_string())
        } else {
            base
        }
    }

    /// Where `helm pull` drops the archive of source `index` before caching.
    pub fn download_dir(&self, index: usize) -> PathBuf {
        self.workspace
            .join("downloads")
            .join(self.revision.label())
            .join(index.to_string())
    }
}
