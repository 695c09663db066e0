//! Page entries.
//!
//! A [`PageEntry`] describes one file under the content root: its URL, its
//! display label and its position in the table of contents.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Weight given to pages the ordering manifest does not mention.
pub const DEFAULT_WEIGHT: f64 = 10.0;

static NEXT_PAGE_ID: AtomicU64 = AtomicU64::new(1);

fn next_page_id() -> u64 {
    NEXT_PAGE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Error loading a single page entry.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// No file at the given path.
    #[error("Page not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The path names a directory.
    #[error("Page entry is a directory: {}", .0.display())]
    NotAFile(PathBuf),
    /// Metadata could not be read.
    #[error("Failed to read page metadata {}: {source}", .path.display())]
    Io {
        /// Full path that was inspected.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// One indexed file.
#[derive(Clone, Debug)]
pub struct PageEntry {
    /// Process-wide unique id, assigned at creation.
    pub id: u64,
    /// Path relative to the content root, `/`-separated.
    pub path: String,
    /// Last extension of the file name, without the dot.
    pub extension: String,
    /// `/` + path without its extension.
    pub url: String,
    /// Display name derived from the file name.
    pub label: String,
    /// Sort key, lower sorts first.
    pub list_weight: f64,
    /// Modification time at index build.
    pub modified: SystemTime,
}

/// Load the entry for `path`, relative to `root`.
///
/// The entry gets [`DEFAULT_WEIGHT`]; the index applies manifest weights.
///
/// # Errors
///
/// Returns [`PageError::NotFound`] if nothing exists at the path,
/// [`PageError::NotAFile`] if it is a directory, and [`PageError::Io`] if
/// its metadata cannot be read.
pub fn load_page_entry(root: &Path, path: &str) -> Result<PageEntry, PageError> {
    let id = next_page_id();
    let full_path = root.join(path);

    let metadata = std::fs::metadata(&full_path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            PageError::NotFound(full_path.clone())
        } else {
            PageError::Io {
                path: full_path.clone(),
                source,
            }
        }
    })?;

    if metadata.is_dir() {
        return Err(PageError::NotAFile(full_path));
    }

    let modified = metadata.modified().map_err(|source| PageError::Io {
        path: full_path.clone(),
        source,
    })?;

    let (stem, extension) = split_extension(path);

    Ok(PageEntry {
        id,
        path: path.to_owned(),
        extension: extension.to_owned(),
        url: format!("/{stem}"),
        label: generate_label(path),
        list_weight: DEFAULT_WEIGHT,
        modified,
    })
}

/// Split a `/`-separated path at the last `.` of its final element.
///
/// Returns the path without the extension and the extension without the dot.
fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) => {
            let dot = name_start + dot;
            (&path[..dot], &path[dot + 1..])
        }
        None => (path, ""),
    }
}

/// Derive a display label from a file path.
///
/// Uses the file name without its extension. Separators (whitespace, `-`,
/// `_`) collapse to one space, each word is capitalized, and camelCase humps
/// are split:
///
/// - `simple-page-file.md` -> `Simple Page File`
/// - `simplePageFile.md` -> `Simple Page File`
/// - `ThisIsASCII.md` -> `This Is ASCII`
pub fn generate_label(path: &str) -> String {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let (name, _) = split_extension(&path[name_start..]);

    let mut label = String::with_capacity(name.len());
    let mut at_boundary = true;
    let mut split_on_upper = false;

    for c in name.chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            if !at_boundary {
                label.push(' ');
                at_boundary = true;
            }
            continue;
        }

        if at_boundary {
            label.push(upper_rune(c));
            split_on_upper = true;
        } else if split_on_upper && c.is_uppercase() {
            label.push(' ');
            label.push(c);
            split_on_upper = false;
        } else {
            if !split_on_upper && c.is_lowercase() {
                split_on_upper = true;
            }
            label.push(c);
        }
        at_boundary = false;
    }

    label
}

/// Upper-case mapping of a single char, or `c` when it has no one-char mapping.
fn upper_rune(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_generate_label_keeps_one_char_per_char() {
        assert_eq!(generate_label("ßtraße.md"), "ßtraße");
        assert_eq!(generate_label("élan-vital.md"), "Élan Vital");
    }

    #[test]
    fn test_generate_label_simple() {
        assert_eq!(generate_label("simple.md"), "Simple");
    }

    #[test]
    fn test_generate_label_subdir() {
        assert_eq!(generate_label("sub/dir/simple.md"), "Simple");
    }

    #[test]
    fn test_generate_label_cap_start() {
        assert_eq!(generate_label("Caps.md"), "Caps");
    }

    #[test]
    fn test_generate_label_dashed_words() {
        assert_eq!(generate_label("simple-page-file.md"), "Simple Page File");
    }

    #[test]
    fn test_generate_label_mixed_words() {
        assert_eq!(generate_label("simple page-file.md"), "Simple Page File");
    }

    #[test]
    fn test_generate_label_camel_case() {
        assert_eq!(generate_label("simplePageFile.md"), "Simple Page File");
    }

    #[test]
    fn test_generate_label_mixed_camel_case() {
        assert_eq!(generate_label("simple pageFile.md"), "Simple Page File");
    }

    #[test]
    fn test_generate_label_multi_cap_camel_case() {
        assert_eq!(generate_label("ThisIsASCII.md"), "This Is ASCII");
    }

    #[test]
    fn test_generate_label_separator_runs() {
        assert_eq!(generate_label("__a--_b.md"), "A B");
        assert_eq!(generate_label("a-.md"), "A ");
    }

    #[test]
    fn test_generate_label_only_last_extension_stripped() {
        assert_eq!(generate_label("archive.tar.gz"), "Archive.tar");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("sample-01.md"), ("sample-01", "md"));
        assert_eq!(split_extension("info/deep-file.txt"), ("info/deep-file", "txt"));
        assert_eq!(split_extension("v1.2/README"), ("v1.2/README", ""));
        assert_eq!(split_extension("a/b.tar.gz"), ("a/b.tar", "gz"));
    }

    #[test]
    fn test_load_page_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("sample-01.md"), "# Sample").unwrap();
        let expected_modified = fs::metadata(temp_dir.path().join("sample-01.md"))
            .unwrap()
            .modified()
            .unwrap();

        let page = load_page_entry(temp_dir.path(), "sample-01.md").unwrap();

        assert_eq!(page.path, "sample-01.md");
        assert_eq!(page.url, "/sample-01");
        assert_eq!(page.extension, "md");
        assert_eq!(page.label, "Sample 01");
        assert_eq!(page.modified, expected_modified);
        assert!((page.list_weight - DEFAULT_WEIGHT).abs() < f64::EPSILON);
        assert!(page.id > 0);
    }

    #[test]
    fn test_load_page_entry_subdir_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("info")).unwrap();
        fs::write(temp_dir.path().join("info/deep-file.txt"), "deep").unwrap();

        let page = load_page_entry(temp_dir.path(), "info/deep-file.txt").unwrap();

        assert_eq!(page.path, "info/deep-file.txt");
        assert_eq!(page.url, "/info/deep-file");
        assert_eq!(page.extension, "txt");
        assert_eq!(page.label, "Deep File");
    }

    #[test]
    fn test_load_page_entry_extension_case_preserved() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("Notes.MD"), "x").unwrap();

        let page = load_page_entry(temp_dir.path(), "Notes.MD").unwrap();

        assert_eq!(page.extension, "MD");
        assert_eq!(page.url, "/Notes");
    }

    #[test]
    fn test_load_page_entry_ids_increase() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("a.md"), "a").unwrap();

        let first = load_page_entry(temp_dir.path(), "a.md").unwrap();
        let second = load_page_entry(temp_dir.path(), "a.md").unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn test_load_page_entry_missing() {
        let temp_dir = tempfile::tempdir().unwrap();

        let result = load_page_entry(temp_dir.path(), "missing-01.txt");

        assert!(matches!(result, Err(PageError::NotFound(_))));
    }

    #[test]
    fn test_load_page_entry_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("info")).unwrap();

        let result = load_page_entry(temp_dir.path(), "info");

        assert!(matches!(result, Err(PageError::NotAFile(_))));
    }
}
