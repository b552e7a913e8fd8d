// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface.
///
/// The watch cycle only needs last-write times; `is_dir` backs `--dry-run`.
pub trait FileSystem: Send + Sync + Debug {
    /// Last-write time of the file at `path`.
    fn modified(&self, path: &Path) -> Result<SystemTime>;
    fn is_dir(&self, path: &Path) -> bool;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let meta = fs::metadata(path).with_context(|| format!("reading metadata of {:?}", path))?;
        meta.modified()
            .with_context(|| format!("reading modification time of {:?}", path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_has_no_modification_time() {
        let fs = RealFileSystem;
        assert!(fs.modified(Path::new("definitely/not/here.txt")).is_err());
    }

    #[test]
    fn existing_file_reports_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"a").unwrap();

        let fs = RealFileSystem;
        assert!(fs.modified(&path).is_ok());
        assert!(fs.is_dir(dir.path()));
        assert!(!fs.is_dir(&path));
    }
}
