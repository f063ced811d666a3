//! Removal of labels Helm injects on every render.
//!
//! These labels change with chart or tool versions without any effect on the
//! deployed resources, so they would otherwise show up in every diff.

use std::path::Path;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use walkdir::WalkDir;

use super::error::{CompareError, Result};

/// Label keys stripped before hashing.
pub const CHURN_LABELS: &[&str] = &[
    "app.kubernetes.io/managed-by",
    "helm.sh/chart",
    "chart",
    "heritage",
    "app.kubernetes.io/version",
];

/// Matches the key of a `key: value` line, quoted or not.
fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^(?:"([^"]*)"|'([^']*)'|([^\s"'#:][^:]*?))[ \t]*:(?:[ \t]|$)"#)
            .expect("key pattern is valid")
    })
}

fn line_key(line: &str) -> Option<&str> {
    let captures = key_pattern().captures(line)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .or_else(|| captures.get(3))
        .map(|m| m.as_str())
}

/// True for `labels:` opening a block mapping, not `labels: {}` or `labels: x`.
fn opens_labels_block(line: &str) -> bool {
    if line_key(line) != Some("labels") {
        return false;
    }
    let value = line.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or("");
    value.is_empty() || value.starts_with('#')
}

/// Returns `content` without churn-only labels.
///
/// Only direct children of a `labels:` block mapping are removed, so a
/// `chart:` key elsewhere in a resource is left alone.
pub fn strip_labels(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    // Indentation of the open `labels:` key and of its entries.
    let mut block: Option<(usize, Option<usize>)> = None;

    for line in content.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let trimmed = body.trim_start_matches(' ');
        let indent = body.len() - trimmed.len();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            out.push_str(line);
            continue;
        }

        if let Some((labels_indent, entry_indent)) = block {
            if indent <= labels_indent {
                block = None;
            } else {
                let entry_indent = entry_indent.unwrap_or(indent);
                block = Some((labels_indent, Some(entry_indent)));
                if indent == entry_indent
                    && line_key(trimmed).is_some_and(|key| CHURN_LABELS.contains(&key))
                {
                    continue;
                }
                out.push_str(line);
                continue;
            }
        }

        if opens_labels_block(trimmed) {
            block = Some((indent, None));
        }
        out.push_str(line);
    }

    out
}

/// Strips churn-only labels from every file under `root`, rewriting in place.
///
/// Returns the number of files that changed. A missing `root` is not an error.
pub fn strip_labels_in_tree(root: &Path) -> Result<usize> {
    if !root.exists() {
        return Ok(0);
    }

    let mut rewritten = 0;
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| CompareError::Walk {
            path: root.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let bytes = std::fs::read(path).map_err(|e| CompareError::io(path, e))?;
        let Ok(content) = std::str::from_utf8(&bytes) else {
            continue;
        };

        let stripped = strip_labels(content);
        if stripped.len() != content.len() {
            std::fs::write(path, stripped).map_err(|e| CompareError::io(path, e))?;
            rewritten += 1;
        }
    }

    debug!("Stripped Helm labels from {} file(s)", rewritten);
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const RENDERED: &str = "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: web
  labels:
    app.kubernetes.io/name: web
    app.kubernetes.io/managed-by: Helm
    helm.sh/chart: web-1.2.3
    \"app.kubernetes.io/version\": \"1.2.3\"
    'heritage': Helm
    chart: web-1.2.3
data:
  key: value
";

    #[test]
    fn test_strip_labels() {
        let expected = "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: web
  labels:
    app.kubernetes.io/name: web
data:
  key: value
";
        assert_eq!(strip_labels(RENDERED), expected);
    }

    #[test]
    fn test_similar_keys_are_kept() {
        let content = "labels:\n  chartName: web\n  my-chart: x\n  helm.sh/chart-extra: y\n";
        assert_eq!(strip_labels(content), content);
    }

    #[test]
    fn test_last_line_without_newline() {
        assert_eq!(
            strip_labels("labels:\n  a: \"1\"\n  heritage: Helm"),
            "labels:\n  a: \"1\"\n"
        );
    }

    #[test]
    fn test_keys_outside_labels_are_kept() {
        let valkey = "\
kind: Application
metadata:
  labels:
    chart: web-1.0.0
spec:
  source:
    chart: valkey
    targetRevision: 2.0.0
";
        let redis = valkey.replace("chart: valkey", "chart: redis");

        let stripped = strip_labels(valkey);
        assert!(stripped.contains("    chart: valkey\n"));
        assert!(!stripped.contains("web-1.0.0"));
        assert_ne!(stripped, strip_labels(&redis));
    }

    #[test]
    fn test_pod_template_labels_and_data_keys() {
        let content = "\
kind: Deployment
spec:
  template:
    metadata:
      labels:
        app: web
        helm.sh/chart: web-1.2.3
    spec:
      containers:
        - name: web
---
kind: ConfigMap
data:
  chart: keep-me
  heritage: keep-me-too
";
        let expected = "\
kind: Deployment
spec:
  template:
    metadata:
      labels:
        app: web
    spec:
      containers:
        - name: web
---
kind: ConfigMap
data:
  chart: keep-me
  heritage: keep-me-too
";
        assert_eq!(strip_labels(content), expected);
    }

    #[test]
    fn test_nested_values_under_labels_are_kept() {
        let content = "labels:\n  note: |\n    chart: literal\n  chart: web\nselector:\n  chart: web\n";
        assert_eq!(
            strip_labels(content),
            "labels:\n  note: |\n    chart: literal\nselector:\n  chart: web\n"
        );
    }

    #[test]
    fn test_inline_labels_are_untouched() {
        let content = "labels: {chart: web}\nchart: web\n";
        assert_eq!(strip_labels(content), content);
    }

    #[test]
    fn test_strip_labels_in_tree() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src/web/templates");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("cm.yaml"), RENDERED).unwrap();
        std::fs::write(nested.join("plain.yaml"), "kind: Service\n").unwrap();

        assert_eq!(strip_labels_in_tree(dir.path()).unwrap(), 1);
        let content = std::fs::read_to_string(nested.join("cm.yaml")).unwrap();
        assert!(!content.contains("managed-by"));
        assert_eq!(
            std::fs::read_to_string(nested.join("plain.yaml")).unwrap(),
            "kind: Service\n"
        );
    }

    #[test]
    fn test_strip_labels_in_missing_tree() {
        let dir = TempDir::new().unwrap();
        assert_eq!(strip_labels_in_tree(&dir.path().join("absent")).unwrap(), 0);
    }
}
