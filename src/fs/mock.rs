// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime },
    Dir,
}

/// In-memory filesystem with explicit modification times.
///
/// Clones share state, so a test can keep one handle and hand another to a
/// `Monitor`.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::from("."), MockEntry::Dir);

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    /// Add (or overwrite) a file with the given modification time.
    ///
    /// Parent directories are created implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();

        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            files.entry(dir.to_path_buf()).or_insert(MockEntry::Dir);
            parent = dir.parent();
        }

        files.insert(path, MockEntry::File { modified });
    }

    /// Update the modification time of an existing file.
    pub fn set_modified(&self, path: impl AsRef<Path>, modified: SystemTime) -> Result<()> {
        let path = path.as_ref();
        let mut files = self.files.lock().unwrap();
        match files.get_mut(path) {
            Some(MockEntry::File { modified: m }) => {
                *m = modified;
                Ok(())
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        self.files.lock().unwrap().remove(path.as_ref());
    }
}

impl FileSystem for MockFileSystem {
    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File { modified }) => Ok(*modified),
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::Dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn add_file_creates_parent_dirs() {
        let fs = MockFileSystem::new();
        fs.add_file("hss/subs/_vars.hss", SystemTime::UNIX_EPOCH);

        assert!(fs.is_dir(Path::new("hss")));
        assert!(fs.is_dir(Path::new("hss/subs")));
        assert!(!fs.is_dir(Path::new("hss/subs/_vars.hss")));
    }

    #[test]
    fn set_modified_is_visible_through_clones() {
        let fs = MockFileSystem::new();
        let shared = fs.clone();
        fs.add_file("a.txt", SystemTime::UNIX_EPOCH);

        let later = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        shared.set_modified("a.txt", later).unwrap();

        assert_eq!(fs.modified(Path::new("a.txt")).unwrap(), later);
        assert!(fs.set_modified("missing.txt", later).is_err());
    }

    #[test]
    fn removed_file_is_no_longer_readable() {
        let fs = MockFileSystem::new();
        fs.add_file("lib/a.txt", SystemTime::UNIX_EPOCH);

        fs.remove("lib/a.txt");

        assert!(fs.modified(Path::new("lib/a.txt")).is_err());
        assert!(fs.is_dir(Path::new("lib")));
    }
}
