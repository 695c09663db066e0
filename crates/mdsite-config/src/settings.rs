//! Site settings loaded from `site.yml`.
//!
//! The settings document lives in the configuration directory and names the
//! site title and the templates used to wrap rendered content:
//!
//! ```yaml
//! title: My Site
//! global:
//!   pageTemplate: templates/page.html
//!   stylesheets: [/assets/site.css]
//! markdown:
//!   blockTemplate: "<section class=\"markdown\">{{ content }}</section>"
//! html:
//!   blockTemplate: templates/html-block.html
//! toc:
//!   pageTemplate: templates/toc.html
//! ```
//!
//! Template values are resolved with [`TemplateResolver`].
//! Keys that are absent keep the built-in defaults.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::ConfigError;
use crate::template::{FatalConfigError, RenderTemplate, TemplateResolver};

/// Settings filename inside the configuration directory.
pub const SITE_SETTINGS_FILENAME: &str = "site.yml";

/// Title used when `site.yml` does not set one.
const DEFAULT_TITLE: &str = "Default";

const DEFAULT_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
{% for sheet in stylesheets %}<link rel="stylesheet" href="{{ sheet }}">
{% endfor %}</head>
<body>
{{ content }}
{% for script in scripts %}<script src="{{ script }}"></script>
{% endfor %}</body>
</html>
"#;

const DEFAULT_TOC_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title }}: {{ index.title }}</title>
</head>
<body>
<h1>{{ index.title }}</h1>
<ul class="toc">
{% for page in index.pages %}<li><a href="{{ page.url }}">{{ page.label }}</a></li>
{% endfor %}</ul>
</body>
</html>
"#;

const DEFAULT_MARKDOWN_BLOCK_TEMPLATE: &str = r#"<div class="content markdown">{{ content }}</div>"#;

const DEFAULT_HTML_BLOCK_TEMPLATE: &str = r#"<div class="content html">{{ content }}</div>"#;

/// Raw settings document as parsed from YAML (template settings as strings).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SiteSettingsRaw {
    title: Option<String>,
    global: GlobalRaw,
    markdown: BlockRaw,
    html: BlockRaw,
    toc: TocRaw,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GlobalRaw {
    page_template: Option<String>,
    stylesheets: Vec<String>,
    scripts: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BlockRaw {
    block_template: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TocRaw {
    page_template: Option<String>,
}

/// Resolved site settings with compiled templates.
#[derive(Clone, Debug)]
pub struct SiteSettings {
    /// Site title shown by the page and TOC templates.
    pub title: String,
    /// Wraps every HTML page.
    pub page_template: Arc<RenderTemplate>,
    /// Renders the table of contents.
    pub toc_template: Arc<RenderTemplate>,
    /// Wraps rendered Markdown content.
    pub markdown_block_template: Arc<RenderTemplate>,
    /// Wraps HTML file content.
    pub html_block_template: Arc<RenderTemplate>,
    /// Stylesheet URLs passed to the page template.
    pub stylesheets: Vec<String>,
    /// Script URLs passed to the page template.
    pub scripts: Vec<String>,
}

impl SiteSettings {
    /// Settings built from the templates shipped with the binary.
    pub fn builtin() -> Result<Self, FatalConfigError> {
        Ok(Self {
            title: DEFAULT_TITLE.to_owned(),
            page_template: Arc::new(RenderTemplate::builtin("page-default", DEFAULT_PAGE_TEMPLATE)?),
            toc_template: Arc::new(RenderTemplate::builtin("toc-default", DEFAULT_TOC_TEMPLATE)?),
            markdown_block_template: Arc::new(RenderTemplate::builtin(
                "md-default",
                DEFAULT_MARKDOWN_BLOCK_TEMPLATE,
            )?),
            html_block_template: Arc::new(RenderTemplate::builtin(
                "html-default",
                DEFAULT_HTML_BLOCK_TEMPLATE,
            )?),
            stylesheets: Vec::new(),
            scripts: Vec::new(),
        })
    }

    /// Load `site.yml` from the configuration directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file is missing,
    /// [`ConfigError::Yaml`] if it is malformed, and
    /// [`ConfigError::Template`] if a template setting fails to resolve.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(SITE_SETTINGS_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path));
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        tracing::info!(path = %path.display(), "Loading site settings");
        Self::from_yaml(&content, &TemplateResolver::new(config_dir))
    }

    /// Load `site.yml`, falling back to the built-in settings if it is missing.
    ///
    /// A malformed file is still an error.
    pub fn load_or_builtin(config_dir: &Path) -> Result<Self, ConfigError> {
        match Self::load(config_dir) {
            Err(ConfigError::NotFound(path)) => {
                tracing::info!(path = %path.display(), "No site settings, using defaults");
                Ok(Self::builtin()?)
            }
            other => other,
        }
    }

    /// Parse settings from YAML, resolving template settings with `resolver`.
    pub fn from_yaml(content: &str, resolver: &TemplateResolver) -> Result<Self, ConfigError> {
        let raw: SiteSettingsRaw = if content.trim().is_empty() {
            SiteSettingsRaw::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let mut settings = Self::builtin()?;
        if let Some(title) = raw.title {
            settings.title = title;
        }

        let resolve = |key: &str, setting: Option<String>, slot: &mut Arc<RenderTemplate>| {
            if let Some(setting) = setting {
                let template = resolver
                    .resolve(key, &setting)
                    .map_err(|source| ConfigError::Template {
                        key: key.to_owned(),
                        source,
                    })?;
                *slot = Arc::new(template);
            }
            Ok::<(), ConfigError>(())
        };

        resolve("global.pageTemplate", raw.global.page_template, &mut settings.page_template)?;
        resolve("toc.pageTemplate", raw.toc.page_template, &mut settings.toc_template)?;
        resolve(
            "markdown.blockTemplate",
            raw.markdown.block_template,
            &mut settings.markdown_block_template,
        )?;
        resolve(
            "html.blockTemplate",
            raw.html.block_template,
            &mut settings.html_block_template,
        )?;

        settings.stylesheets = raw.global.stylesheets;
        settings.scripts = raw.global.scripts;

        Ok(settings)
    }
}
