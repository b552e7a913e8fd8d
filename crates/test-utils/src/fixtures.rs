//! Filesystem fixtures for tests that run against real directories.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};

/// Write `contents` to `path` and move its modification time `age` into the
/// past, so it can never count as changed by a cycle that starts afterwards.
pub fn write_aged(path: &Path, contents: &[u8], age: Duration) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("writing {:?}", path))?;
    set_modified(path, SystemTime::now() - age)
}

pub fn set_modified(path: &Path, time: SystemTime) -> Result<()> {
    let file = File::options()
        .write(true)
        .open(path)
        .with_context(|| format!("opening {:?}", path))?;
    file.set_modified(time)
        .with_context(|| format!("setting mtime of {:?}", path))
}

/// After `delay`, rewrite `path` and push its modification time a few
/// seconds into the future.
///
/// The bump makes the write unambiguously newer than any cycle start taken
/// before it, whatever the filesystem's timestamp granularity.
pub fn touch_after(path: impl Into<PathBuf>, delay: Duration) -> JoinHandle<Result<()>> {
    let path = path.into();
    thread::spawn(move || {
        thread::sleep(delay);
        fs::write(&path, b"changed").with_context(|| format!("writing {:?}", path))?;
        set_modified(&path, SystemTime::now() + Duration::from_secs(5))
    })
}

/// Path as the `&str` form entries use.
pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
