//! Mapping export writer
//!
//! Serializes the per-file mapping artifact to `<export_dir>/<file_id>.mappings.json`.

use crate::atomic::AtomicWriter;
use std::path::{Path, PathBuf};
use traceveil_core::Result;
use traceveil_store::MappingExport;

/// Sanitize a file id for use as a file name.
/// Allows only alphanumeric characters, hyphens, and underscores.
fn sanitize_file_id(file_id: &str) -> String {
    file_id
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(255)
        .collect()
}

/// Path the export artifact for `file_id` is written to
pub fn export_path(export_dir: &Path, file_id: &str) -> PathBuf {
    export_dir.join(format!("{}.mappings.json", sanitize_file_id(file_id)))
}

/// Atomically write the export artifact, returning its path
pub fn write_export(export_dir: &Path, export: &MappingExport) -> Result<PathBuf> {
    let path = export_path(export_dir, &export.file_id);

    let json = serde_json::to_vec_pretty(export)?;
    let mut writer = AtomicWriter::new(&path)?;
    writer.write(&json)?;
    writer.commit()?;

    tracing::debug!(file_id = %export.file_id, path = %path.display(), "mapping export written");
    Ok(path)
}
