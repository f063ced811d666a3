//! Builders for Application manifests used as test data.

#![allow(dead_code)]

/// One chart source inside a manifest.
#[derive(Clone)]
pub struct SourceSpec {
    repo_url: String,
    chart: String,
    revision: String,
    release_name: Option<String>,
    values: String,
}

impl SourceSpec {
    pub fn new(chart: &str) -> Self {
        Self {
            repo_url: "https://charts.example.com".to_string(),
            chart: chart.to_string(),
            revision: "1.0.0".to_string(),
            release_name: None,
            values: "replicas: 1\n".to_string(),
        }
    }

    pub fn repo_url(mut self, url: &str) -> Self {
        self.repo_url = url.to_string();
        self
    }

    pub fn revision(mut self, revision: &str) -> Self {
        self.revision = revision.to_string();
        self
    }

    pub fn release_name(mut self, name: &str) -> Self {
        self.release_name = Some(name.to_string());
        self
    }

    pub fn values(mut self, values: &str) -> Self {
        self.values = values.to_string();
        self
    }

    fn to_yaml(&self, indent: &str) -> String {
        let mut yaml = format!(
            "{i}repoURL: {}\n{i}chart: {}\n{i}targetRevision: {}\n{i}helm:\n",
            self.repo_url,
            self.chart,
            self.revision,
            i = indent
        );
        if let Some(name) = &self.release_name {
            yaml.push_str(&format!("{}  releaseName: {}\n", indent, name));
        }
        yaml.push_str(&format!("{}  values: |\n", indent));
        for line in self.values.lines() {
            yaml.push_str(&format!("{}    {}\n", indent, line));
        }
        yaml
    }
}

/// Builder for Argo CD Application manifests.
pub struct ApplicationBuilder {
    name: String,
    namespace: String,
    sources: Vec<SourceSpec>,
    multi: bool,
}

impl ApplicationBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: "default".to_string(),
            sources: vec![SourceSpec::new(name)],
            multi: false,
        }
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    /// Replaces the single `source`.
    pub fn source(mut self, source: SourceSpec) -> Self {
        self.sources = vec![source];
        self.multi = false;
        self
    }

    /// Switches to `sources` with the given entries.
    pub fn sources(mut self, sources: Vec<SourceSpec>) -> Self {
        self.sources = sources;
        self.multi = true;
        self
    }

    /// Shorthand for changing the values of the first source.
    pub fn values(mut self, values: &str) -> Self {
        if let Some(first) = self.sources.first_mut() {
            *first = first.clone().values(values);
        }
        self
    }

    pub fn build(self) -> String {
        let mut yaml = format!(
            "apiVersion: argoproj.io/v1alpha1\nkind: Application\nmetadata:\n  name: {}\n  namespace: {}\nspec:\n",
            self.name, self.namespace
        );

        if self.multi {
            yaml.push_str("  sources:\n");
            for source in &self.sources {
                let body = source.to_yaml("      ");
                yaml.push_str("    - ");
                yaml.push_str(body.trim_start());
            }
        } else if let Some(source) = self.sources.first() {
            yaml.push_str("  source:\n");
            yaml.push_str(&source.to_yaml("    "));
        }
        yaml
    }
}

/// A manifest declaring both `source` and `sources`.
pub fn conflicting_manifest(name: &str) -> String {
    format!(
        "kind: Application\nmetadata:\n  name: {}\nspec:\n  source:\n    chart: a\n  sources:\n    - chart: b\n",
        name
    )
}

/// A plain Kubernetes object that is not an Application.
pub fn config_map(name: &str) -> String {
    format!(
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {}\ndata:\n  key: value\n",
        name
    )
}
