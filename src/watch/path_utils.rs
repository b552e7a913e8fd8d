// src/watch/path_utils.rs

//! Lexical path helpers for turning watched file paths into directories.
//!
//! Nothing here touches the filesystem: no canonicalization, no symlink
//! resolution.

use indexmap::IndexSet;

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Directory that has to be watched for changes to `path`.
///
/// - A single leading `./` (or `.\`) is dropped.
/// - The directory is everything before the last `/` or `\`, clamped to
///   `max_len` bytes.
/// - A path without any separator lives in `.`.
/// - A path whose only separator is the leading one lives in that root
///   separator (`/x` -> `/`, not `.`). The choice is recorded under
///   "Root-level files" in DESIGN.md.
pub fn derive_directory(path: &str, max_len: usize) -> String {
    let path = path
        .strip_prefix("./")
        .or_else(|| path.strip_prefix(".\\"))
        .unwrap_or(path);

    match path.rfind(is_separator) {
        Some(0) => path[..1].to_string(),
        Some(idx) => {
            let dir = clamp(&path[..idx], max_len);
            if dir.is_empty() {
                ".".to_string()
            } else {
                dir.to_string()
            }
        }
        None => ".".to_string(),
    }
}

/// Truncate to at most `max_len` bytes without splitting a character.
fn clamp(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Unique directories for every non-empty path of every entry, in order of
/// first appearance.
pub fn collect_directories<S: AsRef<str>>(entries: &[Vec<S>], max_len: usize) -> Vec<String> {
    let mut dirs = IndexSet::new();
    for entry in entries {
        for path in entry.iter().map(|p| p.as_ref()).filter(|p| !p.is_empty()) {
            dirs.insert(derive_directory(path, max_len));
        }
    }
    dirs.into_iter().collect()
}
