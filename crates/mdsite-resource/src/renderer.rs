//! Renderer contract and the built-in renderers.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mdsite_config::{RenderTemplate, TemplateError};
use minijinja::{Value, context};
use pulldown_cmark::{Options, Parser, html};

/// Media type of rendered HTML.
pub const MEDIA_TYPE_HTML: &str = "text/html";
/// Media type of plain text passed through unchanged.
pub const MEDIA_TYPE_TEXT: &str = "text/plain";

/// Error rendering a resource.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Resource file could not be read.
    #[error("Failed to read resource {}: {source}", .path.display())]
    Read {
        /// Resolved resource path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Block template failed.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// Output sink failed.
    #[error("Failed to write rendered resource: {0}")]
    Write(#[from] std::io::Error),
}

/// Input for a single render.
#[derive(Clone, Copy, Debug)]
pub struct RenderData<'a> {
    /// Resolved file path, or the logical URL path for a missing resource.
    pub resource: &'a Path,
    /// Request path the resource was resolved from.
    pub url_path: &'a str,
}

/// Converts one resource into output bytes.
pub trait Renderer: Send + Sync {
    /// Media type of the output (`text/html`, `text/plain`).
    fn media_type(&self) -> &'static str;

    /// Short tag reported in the `X-Resource-Mode` header.
    fn resource_mode(&self) -> &'static str;

    /// Render `data.resource` into `out`.
    fn render(&self, data: &RenderData<'_>, out: &mut dyn Write) -> Result<(), RenderError>;
}

fn read_resource(path: &Path) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|source| {
        tracing::error!(path = %path.display(), error = %source, "Failed to read file data");
        RenderError::Read {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Markdown to HTML, wrapped in the markdown block template.
#[derive(Debug)]
pub struct MarkdownRenderer {
    block_template: Arc<RenderTemplate>,
}

impl MarkdownRenderer {
    /// Create a renderer that wraps output in `block_template`.
    #[must_use]
    pub fn new(block_template: Arc<RenderTemplate>) -> Self {
        Self { block_template }
    }

    /// Convert Markdown source to HTML (tables, strikethrough, task lists).
    #[must_use]
    pub fn to_html(source: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(source, options);
        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

impl Renderer for MarkdownRenderer {
    fn media_type(&self) -> &'static str {
        MEDIA_TYPE_HTML
    }

    fn resource_mode(&self) -> &'static str {
        "markdown"
    }

    fn render(&self, data: &RenderData<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        let source = read_resource(data.resource)?;
        let content = Value::from_safe_string(Self::to_html(&source));
        self.block_template.execute(context! { content => content }, out)?;
        Ok(())
    }
}

/// HTML fragments, wrapped in the html block template.
#[derive(Debug)]
pub struct HtmlRenderer {
    block_template: Arc<RenderTemplate>,
}

impl HtmlRenderer {
    /// Create a renderer that wraps file content in `block_template`.
    #[must_use]
    pub fn new(block_template: Arc<RenderTemplate>) -> Self {
        Self { block_template }
    }
}

impl Renderer for HtmlRenderer {
    fn media_type(&self) -> &'static str {
        MEDIA_TYPE_HTML
    }

    fn resource_mode(&self) -> &'static str {
        "html"
    }

    fn render(&self, data: &RenderData<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        let content = Value::from_safe_string(read_resource(data.resource)?);
        self.block_template.execute(context! { content => content }, out)?;
        Ok(())
    }
}

/// Plain text, copied verbatim.
#[derive(Debug, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn media_type(&self) -> &'static str {
        MEDIA_TYPE_TEXT
    }

    fn resource_mode(&self) -> &'static str {
        "text"
    }

    fn render(&self, data: &RenderData<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        let mut file = std::fs::File::open(data.resource).map_err(|source| RenderError::Read {
            path: data.resource.to_path_buf(),
            source,
        })?;
        std::io::copy(&mut file, out)?;
        Ok(())
    }
}

/// Not-found notice for paths no renderer matched.
#[derive(Debug, Default)]
pub struct MissingRenderer;

impl Renderer for MissingRenderer {
    fn media_type(&self) -> &'static str {
        MEDIA_TYPE_HTML
    }

    fn resource_mode(&self) -> &'static str {
        "missing"
    }

    fn render(&self, data: &RenderData<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        write!(
            out,
            r#"<div class="content missing"><h1>Not Found</h1><p>No page exists at <code>{}</code>.</p></div>"#,
            escape_html(data.url_path)
        )?;
        Ok(())
    }
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
