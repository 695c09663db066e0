//! Content page handler.
//!
//! Every request without a dedicated route lands here. The request path is
//! resolved to a file through the renderer registry; HTML output is wrapped
//! in the site's page template, anything else is sent as rendered.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{self, HeaderName};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use mdsite_resource::{MEDIA_TYPE_HTML, RenderData, ResourceStatus};
use minijinja::{Value, context};
use percent_encoding::percent_decode_str;

use crate::error::ServerError;
use crate::state::AppState;

/// Response header naming the renderer that produced the body.
const RESOURCE_MODE_HEADER: &str = "x-resource-mode";

/// Handle any unrouted request as a content page.
pub(crate) async fn get_page(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, ServerError> {
    let url_path = percent_decode_str(uri.path())
        .decode_utf8()
        .map_err(|_| ServerError::BadPath(uri.path().to_owned()))?;

    let content_root = &state.site.context().content_root;
    let found = state.registry.find_resource_file(content_root, &url_path);
    let status = match found.status {
        ResourceStatus::Found => StatusCode::OK,
        ResourceStatus::NotFound => StatusCode::NOT_FOUND,
    };

    let renderer = &found.renderer;
    let mode = renderer.resource_mode();
    let media_type = renderer.media_type();

    let mut content = Vec::new();
    renderer.render(
        &RenderData {
            resource: &found.path,
            url_path: &url_path,
        },
        &mut content,
    )?;

    let body = if media_type == MEDIA_TYPE_HTML {
        let settings = &state.settings;
        settings
            .page_template
            .render(context! {
                title => settings.title.as_str(),
                content => Value::from_safe_string(String::from_utf8_lossy(&content).into_owned()),
                resource => found.path.display().to_string(),
                mode => mode,
                media_type => media_type,
                status_code => status.as_u16(),
                stylesheets => &settings.stylesheets,
                scripts => &settings.scripts,
            })?
            .into_bytes()
    } else {
        content
    };

    tracing::debug!(path = %url_path, mode, status = status.as_u16(), "Served page");

    Ok((
        status,
        [
            (HeaderName::from_static(RESOURCE_MODE_HEADER), mode.to_owned()),
            (header::CONTENT_TYPE, format!("{media_type}; charset=utf-8")),
        ],
        body,
    )
        .into_response())
}
