//! Application state.
//!
//! Shared state for all request handlers.

use mdsite_config::SiteSettings;
use mdsite_resource::RendererRegistry;
use mdsite_site::Site;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Site index handle.
    pub(crate) site: Site,
    /// Title, templates and assets from `site.yml`.
    pub(crate) settings: SiteSettings,
    /// Extension to renderer mapping used by the page handler.
    pub(crate) registry: RendererRegistry,
}

impl AppState {
    /// Create state with the default renderers for `settings`.
    pub(crate) fn new(site: Site, settings: SiteSettings) -> Self {
        let registry = RendererRegistry::with_defaults(&settings);
        Self {
            site,
            settings,
            registry,
        }
    }
}
