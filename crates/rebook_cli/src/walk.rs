//! Book output walker

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub visited: usize,
    pub written: usize,
}

/// Every `*.html` file under `root`, sorted. Entries that cannot be read
/// fail the walk: a page that is never listed is never checked.
pub fn html_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) == Some("html") {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Calls `visit` with each page's root-relative path and contents and
/// writes the returned markup back when it differs. An error from `visit`
/// stops the walk before that page is written.
pub fn for_each_html_file<F>(root: &Path, write: bool, mut visit: F) -> Result<WalkStats>
where
    F: FnMut(&str, &str) -> Result<String>,
{
    let mut stats = WalkStats::default();
    for path in html_files(root)? {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let rel = to_relative_path(root, &path);
        let out = visit(&rel, &raw).with_context(|| format!("failed to process {}", path.display()))?;
        stats.visited += 1;
        if out == raw {
            continue;
        }
        if write {
            fs::write(&path, out).with_context(|| format!("failed to write {}", path.display()))?;
        }
        stats.written += 1;
    }
    Ok(stats)
}

pub fn to_relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn visits_nested_html_files_only() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(&root.join("index.html"), "<p>index</p>");
        write_file(&root.join("binding/box.html"), "<p>box</p>");
        write_file(&root.join("book.js"), "js");
        write_file(&root.join("highlight.css"), "css");

        let mut seen = Vec::new();
        let stats = for_each_html_file(root, true, |rel, html| {
            seen.push(rel.to_string());
            Ok(html.replace("<p>", "<p class=\"x\">"))
        })
        .expect("walk");

        assert_eq!(seen, vec!["binding/box.html", "index.html"]);
        assert_eq!(stats, WalkStats { visited: 2, written: 2 });
        let index = fs::read_to_string(root.join("index.html")).unwrap();
        assert_eq!(index, "<p class=\"x\">index</p>");
    }

    #[test]
    fn error_aborts_before_writing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(&root.join("a.html"), "a");
        write_file(&root.join("b.html"), "b");
        write_file(&root.join("c.html"), "c");

        let err = for_each_html_file(root, true, |rel, html| {
            if rel == "b.html" {
                anyhow::bail!("boom");
            }
            Ok(format!("{html}!"))
        })
        .expect_err("expected failure");

        assert!(format!("{err:#}").contains("boom"));
        assert_eq!(fs::read_to_string(root.join("a.html")).unwrap(), "a!");
        assert_eq!(fs::read_to_string(root.join("b.html")).unwrap(), "b");
        assert_eq!(fs::read_to_string(root.join("c.html")).unwrap(), "c");
    }

    #[test]
    fn unreadable_root_fails_the_walk() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let err = for_each_html_file(&missing, true, |_, html| Ok(html.to_string()))
            .expect_err("expected failure");
        assert!(format!("{err:#}").contains("failed to walk"));
    }

    #[test]
    fn dry_run_leaves_files_alone() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(&root.join("a.html"), "a");

        let stats = for_each_html_file(root, false, |_, html| Ok(format!("{html}!"))).expect("walk");
        assert_eq!(stats, WalkStats { visited: 1, written: 1 });
        assert_eq!(fs::read_to_string(root.join("a.html")).unwrap(), "a");
    }
}
