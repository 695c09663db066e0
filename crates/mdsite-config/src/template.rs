//! Template resolution.
//!
//! Site configuration refers to templates by a single string, the template
//! setting. [`TemplateResolver::resolve`] turns a setting into a compiled
//! [`RenderTemplate`], trying in order:
//!
//! 1. an absolute file path,
//! 2. a path relative to the configuration directory (if it exists),
//! 3. an inline template body (the setting contains `{{`).
//!
//! Anything else is [`TemplateError::Unresolvable`]. Syntax errors are never
//! swallowed, whichever step produced the template source.
//!
//! Each compiled template lives in its own [`minijinja::Environment`] under a
//! generated name (`template-00001`, `template-00002`, ...), so two templates
//! loaded for the same configuration key can never collide.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

/// Marker that identifies a setting as an inline template body.
pub const TEMPLATE_OPEN_MARKER: &str = "{{";

/// Number of characters of an unresolvable setting quoted in the error.
const SETTING_PREFIX_CHARS: usize = 16;

/// Serial used for generated template names.
static TEMPLATE_SERIAL: AtomicU32 = AtomicU32::new(0);

/// Allocate the next unique template name.
fn next_template_name() -> String {
    let serial = TEMPLATE_SERIAL.fetch_add(1, Ordering::Relaxed) + 1;
    format!("template-{serial:05}")
}

/// First [`SETTING_PREFIX_CHARS`] characters of a setting, for error messages.
fn setting_prefix(setting: &str) -> String {
    setting.chars().take(SETTING_PREFIX_CHARS).collect()
}

/// Template resolution or rendering error.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The setting is neither a file path nor an inline template.
    #[error("Could not resolve template: {0}")]
    Unresolvable(String),
    /// Template file could not be read.
    #[error("Failed to read template file {}: {source}", .path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Template source failed to compile.
    #[error("Could not parse template [{label}]: {source}")]
    Syntax {
        /// Label of the configuration value that owns the template.
        label: String,
        /// Compiler error.
        #[source]
        source: minijinja::Error,
    },
    /// Template failed while rendering.
    #[error("Failed to render template [{name}]: {source}")]
    Render {
        /// Generated template name.
        name: String,
        /// Rendering error.
        #[source]
        source: minijinja::Error,
    },
    /// Rendered output could not be written to the sink.
    #[error("Failed to write rendered template: {0}")]
    Write(#[source] std::io::Error),
}

/// A built-in template failed to compile. Startup must stop.
#[derive(Debug, thiserror::Error)]
#[error("Failed to initialize built-in template [{label}]: {source}")]
pub struct FatalConfigError {
    label: String,
    #[source]
    source: TemplateError,
}

impl FatalConfigError {
    /// Label of the built-in template that failed.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Where a template's source came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateSource {
    /// Read from a file (absolute setting, or relative to the config directory).
    File(PathBuf),
    /// The setting itself was the template body.
    Inline,
    /// Compiled from a constant shipped with the binary.
    Builtin,
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline => f.write_str("<inline>"),
            Self::Builtin => f.write_str("<builtin>"),
        }
    }
}

/// A compiled, immutable template.
///
/// Rendering uses HTML auto-escaping; pass pre-rendered markup as
/// [`minijinja::Value::from_safe_string`] to embed it verbatim.
pub struct RenderTemplate {
    name: String,
    label: String,
    source: TemplateSource,
    env: Environment<'static>,
}

impl RenderTemplate {
    /// Compile template source under a freshly generated name.
    fn compile(label: &str, body: String, source: TemplateSource) -> Result<Self, TemplateError> {
        let name = next_template_name();
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template_owned(name.clone(), body)
            .map_err(|source| {
                tracing::error!(label, error = %source, "Could not parse template");
                TemplateError::Syntax {
                    label: label.to_owned(),
                    source,
                }
            })?;

        tracing::debug!(label, name = %name, source = %source, "Compiled template");
        Ok(Self {
            name,
            label: label.to_owned(),
            source,
            env,
        })
    }

    /// Compile a trusted built-in template.
    ///
    /// Failure is reported as a [`FatalConfigError`]; callers surface it at
    /// startup and stop.
    pub fn builtin(label: &str, body: &'static str) -> Result<Self, FatalConfigError> {
        Self::compile(label, body.to_owned(), TemplateSource::Builtin).map_err(|source| {
            FatalConfigError {
                label: label.to_owned(),
                source,
            }
        })
    }

    /// Generated unique name (`template-NNNNN`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label of the configuration value that loaded this template.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Where the template source came from.
    #[must_use]
    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Render the template to a string.
    pub fn render<S: Serialize>(&self, ctx: S) -> Result<String, TemplateError> {
        let render_error = |source| TemplateError::Render {
            name: self.name.clone(),
            source,
        };
        let template = self.env.get_template(&self.name).map_err(render_error)?;
        template.render(ctx).map_err(render_error)
    }

    /// Render the template into an output sink.
    pub fn execute<S, W>(&self, ctx: S, out: &mut W) -> Result<(), TemplateError>
    where
        S: Serialize,
        W: Write + ?Sized,
    {
        let rendered = self.render(ctx)?;
        out.write_all(rendered.as_bytes())
            .map_err(TemplateError::Write)
    }
}

impl fmt::Debug for RenderTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTemplate")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for RenderTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Template[{}]", self.name)
    }
}

/// Resolves template settings against a configuration directory.
#[derive(Clone, Debug)]
pub struct TemplateResolver {
    config_dir: PathBuf,
}

impl TemplateResolver {
    /// Create a resolver for relative settings under `config_dir`.
    #[must_use]
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Directory relative settings are joined onto.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Resolve a template setting into a compiled template.
    ///
    /// # Arguments
    ///
    /// * `label` - Name of the configuration value, used in logs and errors
    /// * `setting` - Absolute path, path relative to the config directory, or inline body
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Read`] if a file setting cannot be read,
    /// [`TemplateError::Syntax`] if the source does not compile, and
    /// [`TemplateError::Unresolvable`] if the setting matches no strategy.
    pub fn resolve(&self, label: &str, setting: &str) -> Result<RenderTemplate, TemplateError> {
        let setting_path = Path::new(setting);
        if setting_path.is_absolute() {
            return load_template_file(label, setting_path);
        }

        let relative = self.config_dir.join(setting_path);
        if relative.exists() {
            return load_template_file(label, &relative);
        }

        if setting.contains(TEMPLATE_OPEN_MARKER) {
            return RenderTemplate::compile(label, setting.to_owned(), TemplateSource::Inline);
        }

        Err(TemplateError::Unresolvable(setting_prefix(setting)))
    }
}

/// Read a template file and compile it.
fn load_template_file(label: &str, path: &Path) -> Result<RenderTemplate, TemplateError> {
    let body = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(label, path = %path.display(), "Reading template file");
    RenderTemplate::compile(label, body, TemplateSource::File(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use minijinja::context;
    use pretty_assertions::assert_eq;

    use super::*;

    fn resolver_with_templates() -> (tempfile::TempDir, TemplateResolver) {
        let temp_dir = tempfile::tempdir().unwrap();
        let templates = temp_dir.path().join("templates");
        fs::create_dir(&templates).unwrap();
        fs::write(
            templates.join("div_wrapper.tpl.html"),
            "<div>{{ value }}</div>",
        )
        .unwrap();
        fs::write(
            templates.join("section_wrapper.tpl.html"),
            "<section>{{ value }}</section>",
        )
        .unwrap();
        let resolver = TemplateResolver::new(temp_dir.path());
        (temp_dir, resolver)
    }

    #[test]
    fn test_compile_inline_renders() {
        let template =
            RenderTemplate::compile("test", "<div>{{ value }}</div>".to_owned(), TemplateSource::Inline)
                .unwrap();

        assert_eq!(template.render(context! { value => "TEST" }).unwrap(), "<div>TEST</div>");
    }

    #[test]
    fn test_compile_bad_syntax_errors() {
        let result =
            RenderTemplate::compile("test", "<div>{{ </div>".to_owned(), TemplateSource::Inline);

        assert!(matches!(result, Err(TemplateError::Syntax { .. })));
    }

    #[test]
    fn test_builtin_bad_syntax_is_fatal() {
        let err = RenderTemplate::builtin("broken", "<div>{% if %}</div>").unwrap_err();

        assert_eq!(err.label(), "broken");
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_builtin_renders() {
        let template = RenderTemplate::builtin("md-default", "<p>{{ value }}</p>").unwrap();

        assert_eq!(template.source(), &TemplateSource::Builtin);
        assert_eq!(template.render(context! { value => "x" }).unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_generated_names_are_unique() {
        let a = RenderTemplate::builtin("a", "{{ x }}").unwrap();
        let b = RenderTemplate::builtin("a", "{{ x }}").unwrap();

        assert_ne!(a.name(), b.name());
        assert!(a.name().starts_with("template-"));
        assert_eq!(a.name().len(), "template-00000".len());
        assert_eq!(a.to_string(), format!("Template[{}]", a.name()));
    }

    #[test]
    fn test_render_escapes_values() {
        let template = RenderTemplate::builtin("esc", "{{ value }}").unwrap();

        let html = template.render(context! { value => "<b>" }).unwrap();

        assert_eq!(html, "&lt;b&gt;");
    }

    #[test]
    fn test_render_safe_value_verbatim() {
        let template = RenderTemplate::builtin("safe", "{{ value }}").unwrap();

        let value = minijinja::Value::from_safe_string("<b>bold</b>".to_owned());
        let html = template.render(context! { value => value }).unwrap();

        assert_eq!(html, "<b>bold</b>");
    }

    #[test]
    fn test_execute_writes_to_sink() {
        let template = RenderTemplate::builtin("sink", "[{{ value }}]").unwrap();
        let mut buf = Vec::new();

        template.execute(context! { value => "TEST" }, &mut buf).unwrap();

        assert_eq!(buf, b"[TEST]");
    }

    #[test]
    fn test_resolve_inline_string() {
        let resolver = TemplateResolver::new("/nonexistent/config");

        let template = resolver
            .resolve("test", "<section>{{ value }}</section>")
            .unwrap();

        assert_eq!(template.source(), &TemplateSource::Inline);
        assert_eq!(
            template.render(context! { value => "TEST" }).unwrap(),
            "<section>TEST</section>"
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        let (temp_dir, resolver) = resolver_with_templates();
        let path = temp_dir.path().join("templates").join("div_wrapper.tpl.html");

        let template = resolver.resolve("test", path.to_str().unwrap()).unwrap();

        assert_eq!(template.source(), &TemplateSource::File(path));
        assert_eq!(template.render(context! { value => "TEST" }).unwrap(), "<div>TEST</div>");
    }

    #[test]
    fn test_resolve_relative_path() {
        let (_temp_dir, resolver) = resolver_with_templates();

        let template = resolver
            .resolve("test", "templates/section_wrapper.tpl.html")
            .unwrap();

        assert_eq!(
            template.render(context! { value => "TEST" }).unwrap(),
            "<section>TEST</section>"
        );
    }

    #[test]
    fn test_resolve_missing_absolute_path_errors() {
        let (temp_dir, resolver) = resolver_with_templates();
        let path = temp_dir.path().join("templates").join("missing.tpl.html");

        let result = resolver.resolve("test", path.to_str().unwrap());

        assert!(matches!(result, Err(TemplateError::Read { .. })));
    }

    #[test]
    fn test_resolve_bad_inline_syntax_errors() {
        let resolver = TemplateResolver::new("/nonexistent/config");

        let result = resolver.resolve("test", "<section>{{{{ value }}</section>");

        assert!(matches!(result, Err(TemplateError::Syntax { .. })));
    }

    #[test]
    fn test_resolve_bad_file_syntax_errors() {
        let (temp_dir, resolver) = resolver_with_templates();
        fs::write(temp_dir.path().join("broken.html"), "{% for %}").unwrap();

        let result = resolver.resolve("test", "broken.html");

        assert!(matches!(result, Err(TemplateError::Syntax { .. })));
    }

    #[test]
    fn test_resolve_unknown_is_unresolvable() {
        let resolver = TemplateResolver::new("/nonexistent/config");

        let result = resolver.resolve("test", "<section></section>");

        assert!(matches!(result, Err(TemplateError::Unresolvable(_))));
    }

    #[test]
    fn test_unresolvable_quotes_bounded_prefix() {
        let resolver = TemplateResolver::new("/nonexistent/config");
        let setting = "non-existent-dir/no-file.tmp";

        let err = resolver.resolve("test", setting).unwrap_err();

        let TemplateError::Unresolvable(prefix) = &err else {
            panic!("expected Unresolvable, got {err:?}");
        };
        assert_eq!(prefix, "non-existent-dir");
        assert!(!err.to_string().contains("no-file.tmp"));
    }
}
