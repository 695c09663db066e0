//! `mdsite toc` command implementation.

use clap::Args;
use mdsite_site::{PageIndex, SiteContext, build_index};

use super::SiteArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the toc command.
#[derive(Args)]
pub(crate) struct TocArgs {
    #[command(flatten)]
    pub site: SiteArgs,
}

impl TocArgs {
    /// Build the index once and print it in display order.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = self.site.load_config(None, None)?;
        let ctx = SiteContext::new(
            config.site_resolved.content_dir,
            config.site_resolved.config_dir,
        );
        let index = build_index(&ctx)?;
        tracing::info!(pages = index.len(), "Printing table of contents");

        output.heading(index.title());
        for (weight, line) in toc_rows(&index) {
            output.row(&weight, &line);
        }
        output.info(&format!("{} pages", index.len()));
        Ok(())
    }
}

/// One `(weight, "url  label")` pair per page.
fn toc_rows(index: &PageIndex) -> Vec<(String, String)> {
    let url_width = index.pages().iter().map(|p| p.url.len()).max().unwrap_or(0);
    index
        .pages()
        .iter()
        .map(|page| {
            (
                format!("{:>6.1}", page.list_weight),
                format!("{:<url_width$}  {}", page.url, page.label),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_toc_rows_follow_index_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let content = temp_dir.path().join("site");
        let config = temp_dir.path().join("config");
        fs::create_dir_all(&content).unwrap();
        fs::create_dir_all(&config).unwrap();
        fs::write(content.join("alpha.md"), "a").unwrap();
        fs::write(content.join("getting-started.md"), "b").unwrap();
        fs::write(config.join("order.yml"), "order:\n  - getting-started.md\n").unwrap();

        let index = build_index(&SiteContext::new(&content, &config)).unwrap();
        let rows = toc_rows(&index);

        assert_eq!(
            rows,
            vec![
                (
                    "   1.0".to_owned(),
                    "/getting-started  Getting Started".to_owned()
                ),
                (
                    "  10.0".to_owned(),
                    "/alpha            Alpha".to_owned()
                ),
            ]
        );
    }

    #[test]
    fn test_toc_rows_empty_index() {
        let temp_dir = tempfile::tempdir().unwrap();

        let index = build_index(&SiteContext::new(temp_dir.path(), temp_dir.path())).unwrap();

        assert!(toc_rows(&index).is_empty());
    }
}
