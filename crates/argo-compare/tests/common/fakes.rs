//! Fake collaborators so the engine runs without `helm` or a review system.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;

use argo_compare::chart::{
    error, ChartError, ChartFetcher, ChartRequest, RenderRequest, TemplateRenderer,
};
use argo_compare::config::RepoCredentials;
use argo_compare::output::{self, CommentPublisher};

/// Writes a minimal chart archive for every request and records it.
#[derive(Default)]
pub struct FakeFetcher {
    requests: Mutex<Vec<ChartRequest>>,
}

impl FakeFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<ChartRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChartFetcher for FakeFetcher {
    fn fetch(
        &self,
        request: &ChartRequest,
        _credentials: Option<&RepoCredentials>,
        destination: &Path,
    ) -> error::Result<PathBuf> {
        self.requests.lock().unwrap().push(request.clone());

        std::fs::create_dir_all(destination).unwrap();
        let path = destination.join(format!("{}-{}.tgz", request.chart, request.revision));
        let file = std::fs::File::create(&path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        let chart_yaml = format!("name: {}\nversion: {}\n", request.chart, request.revision);
        let mut header = tar::Header::new_gnu();
        header.set_size(chart_yaml.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(
                &mut header,
                format!("{}/Chart.yaml", request.chart),
                chart_yaml.as_bytes(),
            )
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
        Ok(path)
    }
}

/// Renders the values file verbatim as `<chart>/templates/configmap.yaml`.
#[derive(Default)]
pub struct FakeRenderer {
    fail: bool,
    releases: Mutex<Vec<String>>,
}

impl FakeRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Records the release, then fails like a broken template.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn releases(&self) -> Vec<String> {
        self.releases.lock().unwrap().clone()
    }
}

impl TemplateRenderer for FakeRenderer {
    fn render(&self, request: &RenderRequest) -> error::Result<()> {
        self.releases
            .lock()
            .unwrap()
            .push(request.release_name.clone());

        if self.fail {
            return Err(ChartError::Render {
                release: request.release_name.clone(),
                stderr: "Error: template: web/templates/cm.yaml:3: unexpected EOF".to_string(),
            });
        }

        let chart = request.chart_dir.file_name().unwrap();
        let out = request.output_dir.join(chart).join("templates");
        std::fs::create_dir_all(&out).unwrap();
        let values = std::fs::read_to_string(&request.values_files[0]).unwrap();
        std::fs::write(out.join("configmap.yaml"), values).unwrap();
        Ok(())
    }
}

/// Keeps every posted comment body.
#[derive(Default)]
pub struct RecordingPublisher {
    bodies: Mutex<Vec<String>>,
}

impl RecordingPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommentPublisher for RecordingPublisher {
    async fn post(&self, body: &str) -> output::error::Result<()> {
        self.bodies.lock().unwrap().push(body.to_string());
        Ok(())
    }
}
