//! Resource lookup and rendering for mdsite.
//!
//! A request path is mapped to a file by probing the extensions of a
//! [`RendererRegistry`]; the matching [`Renderer`] turns the file into
//! output bytes.
//!
//! | extension | renderer | media type | mode |
//! |-----------|----------|------------|------|
//! | `md` | [`MarkdownRenderer`] | `text/html` | `markdown` |
//! | `txt` | [`TextRenderer`] | `text/plain` | `text` |
//! | `html` | [`HtmlRenderer`] | `text/html` | `html` |
//! | (none) | [`MissingRenderer`] | `text/html` | `missing` |

mod registry;
mod renderer;

pub use registry::{RendererRegistry, ResourceMatch, ResourceStatus};
pub use renderer::{
    HtmlRenderer, MEDIA_TYPE_HTML, MEDIA_TYPE_TEXT, MarkdownRenderer, MissingRenderer,
    RenderData, RenderError, Renderer, TextRenderer, escape_html,
};
