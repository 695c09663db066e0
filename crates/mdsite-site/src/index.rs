//! Site index construction.
//!
//! [`build_index`] walks the content root, loads a [`PageEntry`] for every
//! file, applies weights from the ordering manifest and sorts the result by
//! `(weight, url)`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use crate::order::OrderTable;
use crate::page::{PageEntry, load_page_entry};
use crate::site::SiteContext;

/// Heading of the table of contents.
pub const INDEX_TITLE: &str = "Contents";

/// Error building the site index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A directory of the content tree could not be read.
    #[error("Failed to walk content directory {}: {source}", .path.display())]
    Walk {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// One immutable snapshot of the site's pages.
#[derive(Debug)]
pub struct PageIndex {
    pages: Vec<PageEntry>,
    page_lookup: HashMap<String, usize>,
    order: OrderTable,
    title: String,
}

impl PageIndex {
    fn new(mut pages: Vec<PageEntry>, order: OrderTable) -> Self {
        pages.sort_by(|a, b| {
            a.list_weight
                .total_cmp(&b.list_weight)
                .then_with(|| a.url.cmp(&b.url))
        });

        let page_lookup = pages
            .iter()
            .enumerate()
            .map(|(i, page)| (page.url.clone(), i))
            .collect();

        Self {
            pages,
            page_lookup,
            order,
            title: INDEX_TITLE.to_owned(),
        }
    }

    /// Pages in table-of-contents order.
    #[must_use]
    pub fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    /// Look up a page by URL (e.g. `/info/deep-file`).
    #[must_use]
    pub fn get(&self, url: &str) -> Option<&PageEntry> {
        self.page_lookup.get(url).map(|&i| &self.pages[i])
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the index has no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Explicit weights from the ordering manifest, by content-relative path.
    #[must_use]
    pub fn weight_lookup(&self) -> &HashMap<String, f64> {
        self.order.weights()
    }

    /// Weight of pages the manifest does not list.
    #[must_use]
    pub fn default_weight(&self) -> f64 {
        self.order.default_weight()
    }

    /// Heading of the table of contents.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Build a fresh index for the given site.
///
/// A missing or malformed ordering manifest only means no explicit ordering.
/// Files that fail to load are logged and skipped.
///
/// # Errors
///
/// Returns [`IndexError::Walk`] if the content root or any directory below it
/// cannot be read. No partial index is returned.
pub fn build_index(ctx: &SiteContext) -> Result<PageIndex, IndexError> {
    let order = OrderTable::load(&ctx.config_dir);

    let mut files = Vec::new();
    walk_dir(&ctx.content_root, "", &mut files)?;

    let mut by_url: HashMap<String, PageEntry> = HashMap::with_capacity(files.len());
    for path in files {
        tracing::debug!(path = %path, "Indexing file");
        let mut page = match load_page_entry(&ctx.content_root, &path) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to load resource");
                continue;
            }
        };
        page.list_weight = order.weight(&page.path);

        match by_url.entry(page.url.clone()) {
            Entry::Occupied(mut slot) => {
                tracing::warn!(
                    url = %page.url,
                    replaced = %slot.get().path,
                    path = %page.path,
                    "Duplicate page URL, keeping the later file"
                );
                slot.insert(page);
            }
            Entry::Vacant(slot) => {
                slot.insert(page);
            }
        }
    }

    let index = PageIndex::new(by_url.into_values().collect(), order);
    tracing::info!(
        root = %ctx.content_root.display(),
        pages = index.len(),
        "Built site index"
    );
    Ok(index)
}

/// Collect `/`-separated file paths below `dir`, in lexical order per directory.
fn walk_dir(dir: &Path, prefix: &str, files: &mut Vec<String>) -> Result<(), IndexError> {
    let walk_error = |source| IndexError::Walk {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = std::fs::read_dir(dir)
        .map_err(walk_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(walk_error)?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            continue;
        };
        let rel_path = if prefix.is_empty() {
            name.to_owned()
        } else {
            format!("{prefix}/{name}")
        };

        let file_type = entry.file_type().map_err(|source| IndexError::Walk {
            path: entry.path(),
            source,
        })?;
        if file_type.is_dir() {
            walk_dir(&entry.path(), &rel_path, files)?;
        } else {
            files.push(rel_path);
        }
    }

    Ok(())
}
