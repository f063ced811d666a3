//! Manifest decoding and validation.
//!
//! Turns a raw manifest blob into an [`Application`], reporting every way a
//! changed YAML file can fail to be a renderable Helm application.

use serde_yaml::Value;

use super::error::ManifestError;
use super::resource::{Application, ApplicationManifest, ChartSources, Source, APPLICATION_KIND};

/// Decodes and validates a manifest blob.
pub fn parse_application(bytes: &[u8]) -> Result<Application, ManifestError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ManifestError::Empty);
    }

    let value: Value =
        serde_yaml::from_slice(bytes).map_err(|e| ManifestError::Decode(e.to_string()))?;

    let mapping = match &value {
        Value::Null => return Err(ManifestError::Empty),
        Value::Mapping(mapping) if mapping.is_empty() => return Err(ManifestError::Empty),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ManifestError::NotApplication {
                kind: String::new(),
            })
        }
    };

    let kind = mapping
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if kind != APPLICATION_KIND {
        return Err(ManifestError::NotApplication {
            kind: kind.to_string(),
        });
    }

    let manifest: ApplicationManifest =
        serde_yaml::from_value(value).map_err(|e| ManifestError::Decode(e.to_string()))?;

    validate_manifest(manifest)
}

/// Validates a decoded manifest and collapses its sources.
pub fn validate_manifest(manifest: ApplicationManifest) -> Result<Application, ManifestError> {
    let ApplicationManifest { metadata, spec, .. } = manifest;

    let sources = match (spec.source, spec.sources.filter(|s| !s.is_empty())) {
        (Some(_), Some(_)) => return Err(ManifestError::ConflictingSources),
        (None, None) => return Err(ManifestError::MissingSource),
        (Some(source), None) => {
            ensure_chart(&source)?;
            ChartSources::Single(source)
        }
        (None, Some(sources)) => {
            for source in &sources {
                ensure_chart(source)?;
            }
            ChartSources::Multi(sources)
        }
    };

    Ok(Application { metadata, sources })
}

fn ensure_chart(source: &Source) -> Result<(), ManifestError> {
    if source.chart.trim().is_empty() {
        return Err(ManifestError::EmptyChartName {
            repo_url: source.repo_url.clone(),
        });
    }
    Ok(())
}
