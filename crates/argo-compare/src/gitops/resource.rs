//! K8s-style resource types for Argo CD Application manifests.

use serde::{Deserialize, Serialize};

/// The only `kind` this tool renders.
pub const APPLICATION_KIND: &str = "Application";

/// File extensions considered when scanning a change set.
pub const MANIFEST_EXTENSIONS: &[&str] = &[".yaml", ".yml"];

/// Returns true when the path looks like a manifest file.
pub fn is_manifest_path(path: &str) -> bool {
    MANIFEST_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Metadata for a resource, following K8s conventions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// The name of the application.
    #[serde(default)]
    pub name: String,

    /// Namespace the application is rendered into.
    #[serde(default)]
    pub namespace: String,
}

impl ObjectMeta {
    /// Creates a new ObjectMeta.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Helm-specific part of a chart source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmSource {
    /// Overrides the release name; defaults to the application name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,

    /// Inline values as a literal YAML string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub values: String,

    /// Structured values map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_object: Option<serde_yaml::Value>,

    /// Referenced values files. Informational only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_files: Vec<String>,
}

/// One chart reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Chart repository URL. Registry-style URLs carry no scheme.
    #[serde(rename = "repoURL", default)]
    pub repo_url: String,

    /// Chart name.
    #[serde(default)]
    pub chart: String,

    /// Chart version or tag.
    #[serde(default)]
    pub target_revision: String,

    /// Path for git-directory sources. Not rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Helm configuration.
    #[serde(default)]
    pub helm: HelmSource,
}

impl Source {
    /// Returns the release name used when rendering this source.
    pub fn release_name<'a>(&'a self, application_name: &'a str) -> &'a str {
        match self.helm.release_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => application_name,
        }
    }

    /// Returns true when the repository is addressed as an OCI registry.
    pub fn is_registry(&self) -> bool {
        !self.repo_url.contains("://")
    }
}

/// The chart sources of an application.
///
/// The raw manifest allows both `source` and `sources`; validation collapses
/// them into exactly one of these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSources {
    Single(Source),
    Multi(Vec<Source>),
}

impl ChartSources {
    /// Returns all sources in declaration order.
    pub fn as_slice(&self) -> &[Source] {
        match self {
            ChartSources::Single(source) => std::slice::from_ref(source),
            ChartSources::Multi(sources) => sources,
        }
    }

    pub fn is_multi_source(&self) -> bool {
        matches!(self, ChartSources::Multi(_))
    }
}

/// A validated Argo CD Application.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub metadata: ObjectMeta,
    pub sources: ChartSources,
}

impl Application {
    /// Returns the name of the application.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Returns the namespace of the application.
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Returns the chart sources in declaration order.
    pub fn sources(&self) -> &[Source] {
        self.sources.as_slice()
    }

    pub fn is_multi_source(&self) -> bool {
        self.sources.is_multi_source()
    }
}

// ============================================================================
// Raw manifest shape
// ============================================================================

/// The manifest as written on disk, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationManifest {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: ApplicationManifestSpec,
}

/// The `spec` block of a raw manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationManifestSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}
