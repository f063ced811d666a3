use std::path::PathBuf;

use log::debug;

use super::error::{ChartError, Result};
use super::HELM_PROGRAM;
use crate::process::{format_output_error, run_in};

/// Inputs for rendering one chart.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub release_name: String,
    pub chart_dir: PathBuf,
    pub namespace: String,
    pub values_files: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

/// Renders an extracted chart into plain manifests.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<()>;
}

/// Renders charts with `helm template`.
#[derive(Debug, Clone)]
pub struct HelmRenderer {
    program: String,
}

impl Default for HelmRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HelmRenderer {
    pub fn new() -> Self {
        Self::with_program(HELM_PROGRAM)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TemplateRenderer for HelmRenderer {
    fn render(&self, request: &RenderRequest) -> Result<()> {
        std::fs::create_dir_all(&request.output_dir)
            .map_err(|e| ChartError::io(&request.output_dir, e))?;

        let args = template_args(request);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        debug!(
            "Rendering release '{}' into {}",
            request.release_name,
            request.output_dir.display()
        );

        let output = run_in(&request.output_dir, &self.program, &arg_refs).map_err(|e| {
            ChartError::Spawn {
                program: self.program.clone(),
                source: e,
            }
        })?;

        if !output.status.success() {
            return Err(ChartError::Render {
                release: request.release_name.clone(),
                stderr: format_output_error(&output),
            });
        }

        Ok(())
    }
}

/// Builds the `helm template` arguments.
pub fn template_args(request: &RenderRequest) -> Vec<String> {
    let mut args = vec![
        "template".to_string(),
        request.release_name.clone(),
        request.chart_dir.to_string_lossy().into_owned(),
    ];

    if !request.namespace.is_empty() {
        args.push("--namespace".to_string());
        args.push(request.namespace.clone());
    }

    for values in &request.values_files {
        args.push("--values".to_string());
        args.push(values.to_string_lossy().into_owned());
    }

    args.push("--output-dir".to_string());
    args.push(request.output_dir.to_string_lossy().into_owned());
    args
}
