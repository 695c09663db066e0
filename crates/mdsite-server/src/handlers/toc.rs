//! Table of contents and index maintenance endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::Html;
use chrono::{DateTime, Utc};
use mdsite_site::{PageEntry, PageIndex};
use minijinja::context;
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Index as exposed to the TOC template.
#[derive(Serialize)]
struct TocIndex<'a> {
    title: &'a str,
    pages: Vec<TocPage<'a>>,
}

/// One page as exposed to the TOC template.
#[derive(Serialize)]
struct TocPage<'a> {
    id: u64,
    url: &'a str,
    path: &'a str,
    label: &'a str,
    extension: &'a str,
    weight: f64,
    /// Modification time (RFC 3339).
    modified: String,
}

impl<'a> From<&'a PageEntry> for TocPage<'a> {
    fn from(page: &'a PageEntry) -> Self {
        let modified: DateTime<Utc> = page.modified.into();
        Self {
            id: page.id,
            url: &page.url,
            path: &page.path,
            label: &page.label,
            extension: &page.extension,
            weight: page.list_weight,
            modified: modified.to_rfc3339(),
        }
    }
}

impl<'a> From<&'a PageIndex> for TocIndex<'a> {
    fn from(index: &'a PageIndex) -> Self {
        Self {
            title: index.title(),
            pages: index.pages().iter().map(TocPage::from).collect(),
        }
    }
}

/// Handle GET /toc.
pub(crate) async fn get_toc(State(state): State<Arc<AppState>>) -> Result<Html<String>, ServerError> {
    let index = state.site.index()?;
    let html = state.settings.toc_template.render(context! {
        title => state.settings.title.as_str(),
        index => TocIndex::from(index.as_ref()),
    })?;
    Ok(Html(html))
}

/// Response for POST /api/reindex.
#[derive(Serialize)]
pub(crate) struct ReindexResponse {
    /// Number of pages in the new snapshot.
    pages: usize,
    /// Generation of the new snapshot.
    generation: u64,
}

/// Handle POST /api/reindex.
pub(crate) async fn reindex(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReindexResponse>, ServerError> {
    let index = state.site.reindex()?;
    let response = ReindexResponse {
        pages: index.len(),
        generation: state.site.generation(),
    };
    tracing::info!(pages = response.pages, generation = response.generation, "Reindexed site");
    Ok(Json(response))
}
