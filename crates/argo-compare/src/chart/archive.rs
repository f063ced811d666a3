use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::debug;
use tar::Archive;

use super::error::{ChartError, Result};

/// Unpacks a gzipped chart archive into `destination`.
///
/// Helm archives hold a single top-level directory named after the chart;
/// its path is returned.
pub fn extract_archive(archive: &Path, destination: &Path, chart: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(destination).map_err(|e| ChartError::io(destination, e))?;

    let file = File::open(archive).map_err(|e| ChartError::io(archive, e))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.unpack(destination).map_err(|e| ChartError::Extract {
        archive: archive.to_path_buf(),
        source: e,
    })?;

    let chart_dir = destination.join(chart);
    if !chart_dir.is_dir() {
        return Err(ChartError::ChartDirMissing {
            chart: chart.to_string(),
            directory: destination.to_path_buf(),
        });
    }

    debug!("Extracted {} into {}", archive.display(), chart_dir.display());
    Ok(chart_dir)
}
