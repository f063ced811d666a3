//! Sequential comparison of every changed application.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use tempfile::TempDir;

use crate::compare::Reconciler;
use crate::config::RunConfig;
use crate::error::{ArgoCompareError, Result};
use crate::gitops::resolver::{classify_manifest, FileClassification};
use crate::gitops::{
    Application, ChangeSet, ChangeSetResolver, ChangedApplication, GitRepository, InvalidFile,
};
use crate::output::{CommentPublisher, Presenter};
use crate::pipeline::{RenderPipeline, Revision};

const WORKSPACE_PREFIX: &str = "argo-compare-";

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Manifests rendered on both sides and presented.
    pub compared: Vec<String>,
    /// Manifests absent from the target branch that were skipped.
    pub skipped_new: Vec<String>,
    /// Manifests removed from HEAD.
    pub removed: Vec<String>,
}

/// How the destination side of a changed application looks.
enum Destination {
    Existing(Application),
    New,
    Invalid(InvalidFile),
}

/// Drives resolver, render pipeline, reconciler and presenter for one run.
pub struct ComparisonEngine {
    config: RunConfig,
    resolver: ChangeSetResolver,
    pipeline: RenderPipeline,
    reconciler: Reconciler,
    presenter: Presenter,
}

impl ComparisonEngine {
    /// Production constructor using the `helm` executable.
    pub fn from_config(
        config: RunConfig,
        repo: GitRepository,
        publisher: Option<Arc<dyn CommentPublisher>>,
    ) -> Result<Self> {
        let pipeline = RenderPipeline::from_config(&config);
        let presenter = Presenter::from_config(&config, publisher)?;
        Self::new(config, ChangeSetResolver::new(repo), pipeline, presenter)
    }

    /// Constructor with injected collaborators. Validates `config` first.
    pub fn new(
        config: RunConfig,
        resolver: ChangeSetResolver,
        pipeline: RenderPipeline,
        presenter: Presenter,
    ) -> Result<Self> {
        config.validate()?;
        let reconciler = Reconciler::new(
            config.print_added_manifests,
            config.print_removed_manifests,
        );

        Ok(Self {
            config,
            resolver,
            pipeline,
            reconciler,
            presenter,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Compares every changed application, one at a time.
    ///
    /// A pipeline failure aborts the run. Invalid manifests are collected and
    /// returned as [`ArgoCompareError::InvalidFiles`] once everything else is done.
    pub async fn run(&mut self) -> Result<RunReport> {
        let change_set = self
            .resolver
            .resolve(&self.config.target_branch, &self.config.ignore)?;
        let ChangeSet {
            applications,
            mut invalid_files,
            removed_files,
        } = self.select_files(change_set);

        let mut report = RunReport::default();

        for changed in &applications {
            let destination = self.destination_of(changed)?;
            let destination = match destination {
                Destination::Existing(app) => Some(app),
                Destination::New if !self.config.print_added_manifests => {
                    info!(
                        "Skipping '{}': application is new in this branch",
                        changed.path
                    );
                    report.skipped_new.push(changed.path.clone());
                    continue;
                }
                Destination::New => None,
                Destination::Invalid(invalid) => {
                    warn!("Skipping '{}': {}", changed.path, invalid.reason);
                    invalid_files.push(invalid);
                    continue;
                }
            };

            self.compare(changed, destination.as_ref()).await?;
            report.compared.push(changed.path.clone());
        }

        self.presenter.finish().await?;

        for path in &removed_files {
            info!("Application manifest '{}' was removed", path);
        }
        report.removed = removed_files;

        info!(
            "Compared {} application(s), skipped {} new, {} removed",
            report.compared.len(),
            report.skipped_new.len(),
            report.removed.len()
        );

        if !invalid_files.is_empty() {
            for file in &invalid_files {
                warn!("Invalid file {}", file);
            }
            return Err(ArgoCompareError::InvalidFiles(invalid_files));
        }

        Ok(report)
    }

    /// Applies the single-file filter.
    fn select_files(&self, mut change_set: ChangeSet) -> ChangeSet {
        let Some(file) = self.config.file.as_deref() else {
            return change_set;
        };

        change_set.applications.retain(|app| app.path == file);
        change_set.invalid_files.retain(|invalid| invalid.path == file);
        change_set.removed_files.retain(|path| path == file);

        if change_set.applications.is_empty() {
            warn!("'{}' is not a changed application", file);
        }
        change_set
    }

    fn destination_of(&self, changed: &ChangedApplication) -> Result<Destination> {
        let content = self
            .resolver
            .content_at(&self.config.target_branch, &changed.path)?;

        let Some(bytes) = content else {
            debug!("'{}' does not exist in the target branch", changed.path);
            return Ok(Destination::New);
        };

        Ok(match classify_manifest(&changed.path, &bytes)? {
            FileClassification::Application(app) => Destination::Existing(app),
            FileClassification::NonApplication => Destination::New,
            FileClassification::Invalid(err) => {
                Destination::Invalid(InvalidFile::new(&changed.path, &err))
            }
        })
    }

    async fn compare(
        &mut self,
        changed: &ChangedApplication,
        destination: Option<&Application>,
    ) -> Result<()> {
        let application = &changed.application;
        info!("Comparing '{}' ({})", application.name(), changed.path);

        let workspace = create_workspace(&self.config.workspace_base())?;

        self.pipeline
            .run(application, Revision::Source, workspace.path())?;
        if let Some(destination) = destination {
            self.pipeline
                .run(destination, Revision::Destination, workspace.path())?;
        }

        let result = self
            .reconciler
            .execute(workspace.path(), self.config.preserve_helm_labels)
            .await?;

        self.presenter
            .present(application.name(), &changed.path, &result)
            .await?;

        if let Err(e) = workspace.close() {
            warn!("Failed to remove workspace: {}", e);
        }
        Ok(())
    }
}

fn create_workspace(base: &Path) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(WORKSPACE_PREFIX)
        .tempdir_in(base)
        .map_err(|e| ArgoCompareError::Workspace {
            path: base.to_path_buf(),
            source: e,
        })
}
