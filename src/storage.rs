//! CSV persistence for collection results.
//!
//! Files live at `{data_dir}/{name}.csv` with the header
//! `domain,hasStreaming,hasAds,error`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use thiserror::Error;
use tracing::info;

use crate::models::AnalysisResult;

/// Dataset name used by the collector and served over HTTP.
pub const DEFAULT_DATASET: &str = "collector-data";

/// Column order of the stored file.
pub const CSV_COLUMNS: [&str; 4] = ["domain", "hasStreaming", "hasAds", "error"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to export CSV: {0}")]
    Export(String),
    #[error("Failed to parse CSV: {0}")]
    Parse(String),
}

/// Path of the dataset `name` under `data_dir`.
pub fn csv_path(data_dir: &Path, name: &str) -> PathBuf {
    data_dir.join(format!("{}.csv", name))
}

/// Write `results` to `{data_dir}/{name}.csv`, replacing any existing file.
///
/// The directory is created if missing. An empty slice still writes the
/// header row.
pub fn export_to_csv(
    data_dir: &Path,
    name: &str,
    results: &[AnalysisResult],
) -> Result<PathBuf, StorageError> {
    let export = |e: &dyn std::fmt::Display| StorageError::Export(e.to_string());

    fs::create_dir_all(data_dir).map_err(|e| export(&e))?;
    let path = csv_path(data_dir, name);
    let file = File::create(&path).map_err(|e| export(&e))?;

    // Headers are written by hand so an empty result set still has one.
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(CSV_COLUMNS).map_err(|e| export(&e))?;
    for result in results {
        writer.serialize(result).map_err(|e| export(&e))?;
    }
    writer.flush().map_err(|e| export(&e))?;

    info!("Wrote {} results to {}", results.len(), path.display());
    Ok(path)
}

/// Read `{data_dir}/{name}.csv` back into results.
///
/// Fields are trimmed and booleans are accepted in any case. A header-only
/// file yields an empty list.
pub fn parse_csv(data_dir: &Path, name: &str) -> Result<Vec<AnalysisResult>, StorageError> {
    let path = csv_path(data_dir, name);
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(&path)
        .map_err(|e| StorageError::Parse(format!("{}: {}", path.display(), e)))?;

    reader
        .deserialize()
        .collect::<Result<Vec<AnalysisResult>, _>>()
        .map_err(|e| StorageError::Parse(e.to_string()))
}
