//! Glob expansion relative to the project root

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Expand `pattern` under `root` into a sorted list of files, relative to `root`.
///
/// Matched directories contribute every file beneath them, so `css/**`
/// selects the whole tree.
pub fn expand(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    collect(root, pattern, &mut files)?;
    Ok(files.into_iter().collect())
}

/// Expand several patterns, dropping duplicates while keeping sorted order
pub fn expand_all<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    for pattern in patterns {
        collect(root, pattern.as_ref(), &mut files)?;
    }
    Ok(files.into_iter().collect())
}

fn collect(root: &Path, pattern: &str, files: &mut BTreeSet<PathBuf>) -> Result<()> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        pattern.trim_start_matches("./")
    );
    let entries = glob::glob(&full).map_err(|e| Error::pattern(pattern, e.msg))?;

    for entry in entries {
        let path = entry.map_err(|e| Error::Io(e.into_error()))?;
        if path.is_dir() {
            for item in WalkDir::new(&path).follow_links(true) {
                let item = item?;
                if item.file_type().is_file() {
                    insert_relative(root, item.path(), files);
                }
            }
        } else if path.is_file() {
            insert_relative(root, &path, files);
        }
    }
    Ok(())
}

fn insert_relative(root: &Path, path: &Path, files: &mut BTreeSet<PathBuf>) {
    if let Ok(rel) = path.strip_prefix(root) {
        files.insert(rel.to_path_buf());
    }
}

/// Render a relative path with forward slashes, as used in URLs and archives
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("test")).unwrap();
        fs::create_dir_all(root.join("css/theme/source")).unwrap();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        fs::write(root.join("test/test-markdown.html"), "").unwrap();
        fs::write(root.join("test/test.html"), "").unwrap();
        fs::write(root.join("test/test.js"), "").unwrap();
        fs::write(root.join("css/reveal.css"), "").unwrap();
        fs::write(root.join("css/theme/source/black.scss"), "").unwrap();
        dir
    }

    #[test]
    fn test_expand_sorted_and_relative() {
        let dir = fixture();
        let files = expand(dir.path(), "test/*.html").unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("test/test-markdown.html"), PathBuf::from("test/test.html")]
        );
    }

    #[test]
    fn test_directory_globs_recurse() {
        let dir = fixture();
        let files = expand_all(dir.path(), &["index.html", "css/**", "css/reveal.css"]).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("css/reveal.css"),
                PathBuf::from("css/theme/source/black.scss"),
                PathBuf::from("index.html"),
            ]
        );
    }

    #[test]
    fn test_missing_matches_are_empty() {
        let dir = fixture();
        assert!(expand(dir.path(), "plugin/**").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = fixture();
        assert!(matches!(expand(dir.path(), "test/[.html"), Err(Error::Pattern { .. })));
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("test/a/b.html")), "test/a/b.html");
    }
}
