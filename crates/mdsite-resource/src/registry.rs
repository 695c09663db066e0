//! Renderer registry and resource lookup.
//!
//! The registry is an ordered list of `(extension, renderer)` pairs. When
//! several files share a base name (`guide.md` and `guide.txt`), the
//! extension registered first wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdsite_config::SiteSettings;

use crate::renderer::{HtmlRenderer, MarkdownRenderer, MissingRenderer, Renderer, TextRenderer};

/// File probed for paths that name a directory.
const INDEX_NAME: &str = "index";

/// Outcome of a resource lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceStatus {
    /// A file matched a registered extension.
    Found,
    /// No file matched.
    NotFound,
}

impl ResourceStatus {
    /// HTTP status code for this outcome.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::Found => 200,
            Self::NotFound => 404,
        }
    }
}

/// Renderer and path selected for a request path.
#[derive(Clone)]
pub struct ResourceMatch {
    /// Renderer to run.
    pub renderer: Arc<dyn Renderer>,
    /// Resolved file, or the logical request path when not found.
    pub path: PathBuf,
    /// Whether a file was found.
    pub status: ResourceStatus,
}

impl std::fmt::Debug for ResourceMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceMatch")
            .field("mode", &self.renderer.resource_mode())
            .field("path", &self.path)
            .field("status", &self.status)
            .finish()
    }
}

/// Ordered mapping from file extension to renderer.
pub struct RendererRegistry {
    renderers: Vec<(String, Arc<dyn Renderer>)>,
    missing: Arc<dyn Renderer>,
}

impl RendererRegistry {
    /// Empty registry. Lookups always miss.
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderers: Vec::new(),
            missing: Arc::new(MissingRenderer),
        }
    }

    /// Registry with the standard renderers, probed as `md`, `txt`, `html`.
    #[must_use]
    pub fn with_defaults(settings: &SiteSettings) -> Self {
        let mut registry = Self::new();
        registry.register(
            "md",
            Arc::new(MarkdownRenderer::new(Arc::clone(&settings.markdown_block_template))),
        );
        registry.register("txt", Arc::new(TextRenderer));
        registry.register(
            "html",
            Arc::new(HtmlRenderer::new(Arc::clone(&settings.html_block_template))),
        );
        registry
    }

    /// Register a renderer for an extension (without the dot).
    ///
    /// Re-registering an extension replaces its renderer in place and keeps
    /// its probe position.
    pub fn register(&mut self, extension: impl Into<String>, renderer: Arc<dyn Renderer>) {
        let extension = extension.into();
        if let Some(slot) = self.renderers.iter_mut().find(|(ext, _)| *ext == extension) {
            slot.1 = renderer;
        } else {
            self.renderers.push((extension, renderer));
        }
    }

    /// Renderer registered for an extension.
    #[must_use]
    pub fn get(&self, extension: &str) -> Option<&Arc<dyn Renderer>> {
        self.renderers
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, renderer)| renderer)
    }

    /// Registered extensions in probe order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.renderers.iter().map(|(ext, _)| ext.as_str())
    }

    /// Renderer used for paths that match no file.
    #[must_use]
    pub fn missing(&self) -> &Arc<dyn Renderer> {
        &self.missing
    }

    /// Find the file and renderer for a request path.
    ///
    /// `url_path` is relative to `root` (a leading `/` is ignored). An empty
    /// path or one ending in `/` probes `index`. Each registered extension is
    /// appended in order and the first existing file wins. Paths with `..`
    /// segments never match.
    pub fn find_resource_file(&self, root: &Path, url_path: &str) -> ResourceMatch {
        let Some(base) = normalize_url_path(url_path) else {
            tracing::warn!(url_path, "Rejected path outside the content root");
            return self.not_found(url_path);
        };

        for (extension, renderer) in &self.renderers {
            let candidate = root.join(format!("{base}.{extension}"));
            if candidate.is_file() {
                tracing::debug!(
                    url_path,
                    path = %candidate.display(),
                    mode = renderer.resource_mode(),
                    "Resolved resource"
                );
                return ResourceMatch {
                    renderer: Arc::clone(renderer),
                    path: candidate,
                    status: ResourceStatus::Found,
                };
            }
        }

        tracing::debug!(url_path, "No resource found");
        self.not_found(url_path)
    }

    fn not_found(&self, url_path: &str) -> ResourceMatch {
        ResourceMatch {
            renderer: Arc::clone(&self.missing),
            path: PathBuf::from(url_path),
            status: ResourceStatus::NotFound,
        }
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a request path into a `/`-separated path relative to the root.
///
/// Returns `None` if any segment is `..`.
fn normalize_url_path(url_path: &str) -> Option<String> {
    let mut segments = Vec::new();
    for segment in url_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            _ => segments.push(segment),
        }
    }

    if url_path.is_empty() || url_path.ends_with('/') {
        segments.push(INDEX_NAME);
    }

    Some(segments.join("/"))
}
