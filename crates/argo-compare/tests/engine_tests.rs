//! End-to-end runs of the comparison engine with fake helm and review system.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use argo_compare::chart::ChartError;
use argo_compare::output::CommentPresenter;
use argo_compare::pipeline::PipelineError;
use argo_compare::{
    ArgoCompareError, ChartCache, ComparisonEngine, CredentialStore, Presenter, RenderPipeline,
    RunConfig,
};
use common::{ApplicationBuilder, FakeFetcher, FakeRenderer, GitFixture, RecordingPublisher};

/// Everything an engine run leaves behind for assertions.
struct EngineFixture {
    git: GitFixture,
    cache_dir: TempDir,
    tmp_dir: TempDir,
    fetcher: Arc<FakeFetcher>,
    renderer: Arc<FakeRenderer>,
    publisher: Arc<RecordingPublisher>,
}

impl EngineFixture {
    fn new() -> Self {
        Self::with_renderer(FakeRenderer::new())
    }

    fn with_renderer(renderer: Arc<FakeRenderer>) -> Self {
        Self {
            git: GitFixture::new(),
            cache_dir: TempDir::new().unwrap(),
            tmp_dir: TempDir::new().unwrap(),
            fetcher: FakeFetcher::new(),
            renderer,
            publisher: RecordingPublisher::new(),
        }
    }

    fn config(&self) -> RunConfig {
        let mut config = RunConfig::new("main", self.cache_dir.path());
        config.tmp_dir = Some(self.tmp_dir.path().to_path_buf());
        config
    }

    fn engine(&self, config: RunConfig) -> ComparisonEngine {
        let pipeline = RenderPipeline::new(
            ChartCache::new(self.cache_dir.path()),
            self.fetcher.clone(),
            self.renderer.clone(),
            CredentialStore::default(),
        );
        let presenter = CommentPresenter::builder()
            .publisher(self.publisher.clone())
            .show_added(config.print_added_manifests)
            .show_removed(config.print_removed_manifests)
            .build()
            .unwrap();

        ComparisonEngine::new(
            config,
            self.git.resolver(),
            pipeline,
            Presenter::Comment(presenter),
        )
        .unwrap()
    }

    fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(self.tmp_dir.path()).unwrap().count()
    }
}

/// `origin/main` has `web` with one replica, HEAD scales it to two.
fn scaled_web(fixture: &EngineFixture) {
    fixture
        .git
        .write("apps/web.yaml", &ApplicationBuilder::new("web").build());
    fixture.git.commit("initial");
    fixture.git.mark_remote("main");

    fixture.git.write(
        "apps/web.yaml",
        &ApplicationBuilder::new("web").values("replicas: 2\n").build(),
    );
    fixture.git.commit("scale web");
}

#[tokio::test]
async fn test_changed_application_is_compared_and_posted_once() {
    let fixture = EngineFixture::new();
    scaled_web(&fixture);

    let report = fixture.engine(fixture.config()).run().await.unwrap();

    assert_eq!(report.compared, vec!["apps/web.yaml".to_string()]);
    assert!(report.skipped_new.is_empty());

    let bodies = fixture.publisher.bodies();
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert!(body.starts_with("## Argo Compare"));
    assert!(body.contains("### Application `web` (`apps/web.yaml`)"));
    assert!(body.contains("<summary>Changed (1)</summary>"));
    assert!(body.contains("#### `web/templates/configmap.yaml`"));
    assert!(body.contains("-replicas: 1"));
    assert!(body.contains("+replicas: 2"));

    // Same chart revision on both sides: one download, one cache hit.
    assert_eq!(fixture.fetcher.requests().len(), 1);
    assert_eq!(fixture.renderer.releases(), vec!["web", "web"]);
    assert_eq!(fixture.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_cached_chart_is_not_fetched_again() {
    let fixture = EngineFixture::new();
    scaled_web(&fixture);

    fixture.engine(fixture.config()).run().await.unwrap();
    fixture.engine(fixture.config()).run().await.unwrap();

    assert_eq!(fixture.fetcher.requests().len(), 1);
    assert_eq!(fixture.publisher.bodies().len(), 2);
}

#[tokio::test]
async fn test_new_application_is_skipped_by_default() {
    let fixture = EngineFixture::new();
    fixture
        .git
        .write("apps/web.yaml", &ApplicationBuilder::new("web").build());
    fixture.git.commit("initial");
    fixture.git.mark_remote("main");

    fixture
        .git
        .write("apps/fresh.yaml", &ApplicationBuilder::new("fresh").build());
    fixture.git.commit("add fresh");

    let report = fixture.engine(fixture.config()).run().await.unwrap();

    assert!(report.compared.is_empty());
    assert_eq!(report.skipped_new, vec!["apps/fresh.yaml".to_string()]);
    assert!(fixture.fetcher.requests().is_empty());
    assert!(fixture.renderer.releases().is_empty());

    let bodies = fixture.publisher.bodies();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("No changed applications."));
}

#[tokio::test]
async fn test_new_application_is_rendered_when_printing_added() {
    let fixture = EngineFixture::new();
    fixture
        .git
        .write("apps/web.yaml", &ApplicationBuilder::new("web").build());
    fixture.git.commit("initial");
    fixture.git.mark_remote("main");

    fixture.git.write(
        "apps/fresh.yaml",
        &ApplicationBuilder::new("fresh")
            .values("greeting: hello\n")
            .build(),
    );
    fixture.git.commit("add fresh");

    let mut config = fixture.config();
    config.print_added_manifests = true;
    let report = fixture.engine(config).run().await.unwrap();

    assert_eq!(report.compared, vec!["apps/fresh.yaml".to_string()]);
    assert_eq!(fixture.renderer.releases(), vec!["fresh"]);

    let body = &fixture.publisher.bodies()[0];
    assert!(body.contains("<summary>Added (1)</summary>"));
    assert!(body.contains("#### `fresh/templates/configmap.yaml`"));
    assert!(body.contains("greeting: hello"));
}

#[tokio::test]
async fn test_file_filter_limits_comparison() {
    let fixture = EngineFixture::new();
    fixture
        .git
        .write("apps/web.yaml", &ApplicationBuilder::new("web").build());
    fixture
        .git
        .write("apps/api.yaml", &ApplicationBuilder::new("api").build());
    fixture.git.commit("initial");
    fixture.git.mark_remote("main");

    fixture.git.write(
        "apps/web.yaml",
        &ApplicationBuilder::new("web").values("replicas: 2\n").build(),
    );
    fixture.git.write(
        "apps/api.yaml",
        &ApplicationBuilder::new("api").values("replicas: 2\n").build(),
    );
    fixture.git.commit("scale both");

    let mut config = fixture.config();
    config.file = Some("apps/api.yaml".to_string());
    let report = fixture.engine(config).run().await.unwrap();

    assert_eq!(report.compared, vec!["apps/api.yaml".to_string()]);
    assert_eq!(fixture.renderer.releases(), vec!["api", "api"]);
}

#[tokio::test]
async fn test_invalid_files_fail_after_other_applications() {
    let fixture = EngineFixture::new();
    scaled_web(&fixture);
    fixture.git.write("apps/broken.yaml", "");
    fixture.git.commit("add broken");

    let result = fixture.engine(fixture.config()).run().await;

    match result {
        Err(ArgoCompareError::InvalidFiles(files)) => {
            assert_eq!(files.len(), 1);
            assert_eq!(files[0].path, "apps/broken.yaml");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    // The valid application was still compared and the comment posted.
    assert_eq!(fixture.renderer.releases(), vec!["web", "web"]);
    assert_eq!(fixture.publisher.bodies().len(), 1);
}

#[tokio::test]
async fn test_render_failure_aborts_remaining_applications() {
    let fixture = EngineFixture::with_renderer(FakeRenderer::failing());
    fixture
        .git
        .write("apps/api.yaml", &ApplicationBuilder::new("api").build());
    fixture
        .git
        .write("apps/web.yaml", &ApplicationBuilder::new("web").build());
    fixture.git.commit("initial");
    fixture.git.mark_remote("main");

    fixture.git.write(
        "apps/api.yaml",
        &ApplicationBuilder::new("api").values("replicas: 2\n").build(),
    );
    fixture.git.write(
        "apps/web.yaml",
        &ApplicationBuilder::new("web").values("replicas: 2\n").build(),
    );
    fixture.git.commit("scale both");

    let result = fixture.engine(fixture.config()).run().await;

    match result {
        Err(ArgoCompareError::Pipeline(PipelineError::Chart(ChartError::Render {
            release,
            stderr,
        }))) => {
            assert_eq!(release, "api");
            assert!(stderr.contains("unexpected EOF"));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    // Only the first application's source side was attempted.
    assert_eq!(fixture.renderer.releases(), vec!["api"]);
    assert_eq!(fixture.leftover_workspaces(), 0);
    assert!(fixture.publisher.bodies().is_empty());
}

#[tokio::test]
async fn test_removed_application_is_reported_not_rendered() {
    let fixture = EngineFixture::new();
    fixture
        .git
        .write("apps/web.yaml", &ApplicationBuilder::new("web").build());
    fixture
        .git
        .write("apps/old.yaml", &ApplicationBuilder::new("old").build());
    fixture.git.commit("initial");
    fixture.git.mark_remote("main");

    fixture.git.remove("apps/old.yaml");
    fixture.git.commit("drop old");

    let report = fixture.engine(fixture.config()).run().await.unwrap();

    assert_eq!(report.removed, vec!["apps/old.yaml".to_string()]);
    assert!(report.compared.is_empty());
    assert!(fixture.renderer.releases().is_empty());
}

#[test]
fn test_empty_target_branch_is_rejected() {
    let fixture = EngineFixture::new();
    let mut config = fixture.config();
    config.target_branch = String::new();

    let pipeline = RenderPipeline::new(
        ChartCache::new(fixture.cache_dir.path()),
        fixture.fetcher.clone(),
        fixture.renderer.clone(),
        CredentialStore::default(),
    );
    let presenter = CommentPresenter::builder()
        .publisher(fixture.publisher.clone())
        .build()
        .unwrap();

    let result = ComparisonEngine::new(
        config,
        fixture.git.resolver(),
        pipeline,
        Presenter::Comment(presenter),
    );
    assert!(matches!(result, Err(ArgoCompareError::Config(_))));
}
