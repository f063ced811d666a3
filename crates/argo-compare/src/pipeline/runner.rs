use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::chart::{
    extract_archive, ChartFetcher, ChartRequest, HelmFetcher, HelmRenderer, RenderRequest,
    TemplateRenderer,
};
use crate::config::{CredentialStore, RunConfig};
use crate::gitops::Application;
use crate::sanitize;
use crate::storage::ChartCache;

use super::context::{PipelineContext, Revision};
use super::error::{PipelineError, Result};
use super::values::write_values_file;

/// Renders one revision of an application into a directory of manifests.
pub struct RenderPipeline {
    cache: ChartCache,
    fetcher: Arc<dyn ChartFetcher>,
    renderer: Arc<dyn TemplateRenderer>,
    credentials: CredentialStore,
}

impl RenderPipeline {
    /// Production constructor backed by the `helm` executable.
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            ChartCache::new(&config.cache_dir),
            Arc::new(HelmFetcher::new()),
            Arc::new(HelmRenderer::new()),
            config.credentials.clone(),
        )
    }

    /// Constructor with injected collaborators.
    pub fn new(
        cache: ChartCache,
        fetcher: Arc<dyn ChartFetcher>,
        renderer: Arc<dyn TemplateRenderer>,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            cache,
            fetcher,
            renderer,
            credentials,
        }
    }

    pub fn cache(&self) -> &ChartCache {
        &self.cache
    }

    /// Runs every step for `application` and returns the rendered output directory.
    ///
    /// The first failing source aborts the run. Partial output is left in
    /// `workspace`, which the caller owns.
    pub fn run(
        &self,
        application: &Application,
        revision: Revision,
        workspace: &Path,
    ) -> Result<PathBuf> {
        let _pipeline_span = info_span!("render",
            application = %application.name(),
            revision = %revision,
            workspace = %sanitize::redact_path(workspace),
        )
        .entered();

        let mut ctx = PipelineContext::new(application, revision, workspace);

        // Step 1: Generate values
        {
            let _step = info_span!("generate_values").entered();
            self.step_generate_values(&mut ctx)?;
        }

        // Step 2: Ensure charts are cached
        {
            let _step = info_span!("ensure_charts").entered();
            self.step_ensure_charts(&ctx)?;
        }

        // Step 3: Extract
        {
            let _step = info_span!("extract").entered();
            self.step_extract(&mut ctx)?;
        }

        // Step 4: Render
        {
            let _step = info_span!("render_templates").entered();
            self.step_render(&ctx)?;
        }

        info!(
            "Rendered {} ({}) with {} source(s)",
            application.name(),
            revision,
            application.sources().len()
        );
        Ok(ctx.output_dir)
    }

    fn step_generate_values(&self, ctx: &mut PipelineContext<'_>) -> Result<()> {
        for (index, source) in ctx.application.sources().iter().enumerate() {
            let path = ctx.values_path(index, &source.chart);
            write_values_file(source, &path)?;
            debug!("Wrote values for '{}' to {}", source.chart, sanitize::redact_path(&path));
            ctx.values_files.push(path);
        }
        Ok(())
    }

    fn step_ensure_charts(&self, ctx: &PipelineContext<'_>) -> Result<()> {
        for (index, source) in ctx.application.sources().iter().enumerate() {
            let request = ChartRequest::from_source(source);
            self.ensure_chart(&request, &ctx.download_dir(index))?;
        }
        Ok(())
    }

    fn ensure_chart(&self, request: &ChartRequest, download_dir: &Path) -> Result<()> {
        if self
            .cache
            .has(&request.repo_url, &request.chart, &request.revision)
        {
            debug!(
                "Chart '{}' version '{}' found in cache",
                request.chart, request.revision
            );
            return Ok(());
        }

        let credentials = self.credentials.find(&request.repo_url);
        if credentials.is_none() {
            debug!(
                "No credentials for {}, fetching anonymously",
                sanitize::redact_repo_url(&request.repo_url)
            );
        }

        let archive = self.fetcher.fetch(request, credentials, download_dir)?;
        let file_name = archive
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| crate::chart::ChartError::NoArchive {
                chart: request.chart.clone(),
                directory: download_dir.to_path_buf(),
            })?;
        let bytes = std::fs::read(&archive).map_err(|e| PipelineError::io(&archive, e))?;

        self.cache.store(&request.repo_url, &file_name, &bytes)?;
        Ok(())
    }

    fn step_extract(&self, ctx: &mut PipelineContext<'_>) -> Result<()> {
        for (index, source) in ctx.application.sources().iter().enumerate() {
            let archive =
                self.cache
                    .lookup(&source.repo_url, &source.chart, &source.target_revision)?;
            let chart_dir = extract_archive(&archive, &ctx.extract_dir(index), &source.chart)?;
            ctx.chart_dirs.push(chart_dir);
        }
        Ok(())
    }

    fn step_render(&self, ctx: &PipelineContext<'_>) -> Result<()> {
        let application = ctx.application;
        for (index, source) in application.sources().iter().enumerate() {
            let request = RenderRequest {
                release_name: source.release_name(application.name()).to_string(),
                chart_dir: ctx.chart_dirs[index].clone(),
                namespace: application.namespace().to_string(),
                values_files: vec![ctx.values_files[index].clone()],
                output_dir: ctx.output_dir.clone(),
            };
            self.renderer.render(&request)?;
        }
        Ok(())
    }
}
