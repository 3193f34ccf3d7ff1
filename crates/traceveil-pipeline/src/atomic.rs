//! Atomic file writes
//!
//! Masked output and export artifacts are written to a temporary file and
//! renamed into place, so a crashed or cancelled run never leaves a
//! half-written file where downstream tooling would pick it up.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use traceveil_core::Result;

/// Writes to `<path>.tmp` and renames onto `path` on commit
pub struct AtomicWriter {
    temp_path: PathBuf,
    final_path: PathBuf,
    file: File,
}

impl AtomicWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let final_path = path.as_ref().to_path_buf();

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = Self::temp_path(&final_path);
        let file = File::create(&temp_path)?;

        Ok(Self {
            temp_path,
            final_path,
            file,
        })
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.file.write_all(data)?;
        Ok(())
    }

    /// Sync and atomically rename the temp file to the final path
    pub fn commit(mut self) -> Result<()> {
        self.file.sync_all()?;
        self.file.flush()?;

        let temp_path = self.temp_path.clone();
        let final_path = self.final_path.clone();

        // Prevent Drop from deleting the temp file mid-rename
        std::mem::forget(self);

        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }

    fn temp_path(final_path: &Path) -> PathBuf {
        let mut temp = final_path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

impl Drop for AtomicWriter {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.temp_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_commit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");

        let mut writer = AtomicWriter::new(&path).unwrap();
        writer.write(b"masked content").unwrap();
        writer.commit().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "masked content");
        assert!(!dir.path().join("out.log.tmp").exists());
    }

    #[test]
    fn test_dropped_writer_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");

        {
            let mut writer = AtomicWriter::new(&path).unwrap();
            writer.write(b"partial").unwrap();
            // Dropped without commit
        }

        assert!(!path.exists());
        assert!(!dir.path().join("out.log.tmp").exists());
    }

    #[test]
    fn test_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deep/out.log");

        let mut writer = AtomicWriter::new(&path).unwrap();
        writer.write(b"x").unwrap();
        writer.commit().unwrap();

        assert!(path.exists());
    }
}
