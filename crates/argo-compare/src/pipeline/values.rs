use std::path::Path;

use super::error::{PipelineError, Result};
use crate::gitops::Source;

/// Returns the values document for a source.
///
/// Inline `values` text wins over `valuesObject`.
pub fn values_document(source: &Source) -> Result<String> {
    if !source.helm.values.trim().is_empty() {
        return Ok(source.helm.values.clone());
    }

    match &source.helm.values_object {
        Some(object) if !object.is_null() => {
            serde_yaml::to_string(object).map_err(|e| PipelineError::SerializeValues {
                chart: source.chart.clone(),
                source: e,
            })
        }
        _ => Err(PipelineError::ValuesMissing {
            chart: source.chart.clone(),
        }),
    }
}

/// Writes the values document of `source` to `path`.
pub fn write_values_file(source: &Source, path: &Path) -> Result<()> {
    let document = values_document(source)?;
    std::fs::write(path, document).map_err(|e| PipelineError::io(path, e))
}
