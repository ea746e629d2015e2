//! Path normalization utilities for catalog-relative paths
//!
//! All paths the analyzer compares are project-relative strings with forward
//! slashes and no `.`/`..` segments. This module produces and takes apart
//! strings in that format.

use std::path::Path;
use tracing::debug;

/// Normalize a path to be relative to a project root
///
/// - Converts absolute paths under the root to relative paths
/// - Uses forward slashes (/) as path separators on all platforms
/// - Removes leading "./" prefixes
///
/// # Examples
/// ```
/// use std::path::Path;
/// use depscope::path_utils::normalize_path_relative;
/// let root = Path::new("/home/user/project");
/// let absolute = Path::new("/home/user/project/src/main.py");
/// assert_eq!(normalize_path_relative(absolute, root), "src/main.py");
/// ```
pub fn normalize_path_relative(path: &Path, root: &Path) -> String {
    let relative_path = if path.is_absolute() && root.is_absolute() {
        match path.strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => {
                debug!(
                    "Path {:?} is not under project root {:?}, using as-is",
                    path, root
                );
                path
            }
        }
    } else {
        path
    };

    let normalized = relative_path.to_string_lossy().replace('\\', "/");

    match normalized.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => normalized,
    }
}

/// Directory part of a relative path ("" for files at the root)
pub fn parent_dir(relative_path: &str) -> &str {
    match relative_path.rfind('/') {
        Some(idx) => &relative_path[..idx],
        None => "",
    }
}

/// Last segment of a relative path
pub fn file_name(relative_path: &str) -> &str {
    match relative_path.rfind('/') {
        Some(idx) => &relative_path[idx + 1..],
        None => relative_path,
    }
}

/// File name without its final extension
///
/// Dotfiles keep their full name (`.env` has stem `.env`).
pub fn file_stem(relative_path: &str) -> &str {
    let name = file_name(relative_path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Join a directory and a relative specifier, folding `.` and `..` segments
///
/// Returns `None` when the result would climb above the project root.
pub fn join_normalized(dir: &str, specifier: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();

    let dir = dir.replace('\\', "/");
    let specifier = specifier.replace('\\', "/");

    for segment in dir.split('/').chain(specifier.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    Some(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_relative() {
        let root = Path::new("/home/user/project");

        let path = Path::new("/home/user/project/src/main.py");
        assert_eq!(normalize_path_relative(path, root), "src/main.py");

        let path = Path::new("src/main.py");
        assert_eq!(normalize_path_relative(path, root), "src/main.py");

        let path = Path::new("./src/main.py");
        assert_eq!(normalize_path_relative(path, root), "src/main.py");
    }

    #[test]
    fn test_path_parts() {
        assert_eq!(parent_dir("pkg/sub/a.js"), "pkg/sub");
        assert_eq!(parent_dir("a.js"), "");
        assert_eq!(file_name("pkg/sub/a.js"), "a.js");
        assert_eq!(file_stem("pkg/sub/a.test.js"), "a.test");
        assert_eq!(file_stem("pkg/Makefile"), "Makefile");
        assert_eq!(file_stem(".env"), ".env");
    }

    #[test]
    fn test_join_normalized() {
        assert_eq!(join_normalized("pkg", "./b").as_deref(), Some("pkg/b"));
        assert_eq!(
            join_normalized("pkg/sub", "../lib/x").as_deref(),
            Some("pkg/lib/x")
        );
        assert_eq!(join_normalized("", "./b").as_deref(), Some("b"));
        assert_eq!(join_normalized("pkg", "..").as_deref(), Some(""));
        assert_eq!(join_normalized("pkg", "../../x"), None);
    }
}
