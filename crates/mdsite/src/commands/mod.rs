//! CLI command implementations.

pub(crate) mod serve;
pub(crate) mod toc;

use std::path::PathBuf;

use clap::Args;
use mdsite_config::{CliSettings, Config, ConfigError};

pub(crate) use serve::ServeArgs;
pub(crate) use toc::TocArgs;

/// Site location flags shared by all commands.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover mdsite.toml).
    #[arg(short, long, env = "MDSITE_CONFIG")]
    config: Option<PathBuf>,

    /// Content directory (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Site configuration directory holding site.yml and order.yml (overrides config).
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl SiteArgs {
    /// Load configuration, letting flags override file values.
    pub(crate) fn load_config(
        &self,
        host: Option<String>,
        port: Option<u16>,
    ) -> Result<Config, ConfigError> {
        let cli_settings = CliSettings {
            host,
            port,
            content_dir: self.content_dir.clone(),
            config_dir: self.config_dir.clone(),
        };
        tracing::debug!(
            host = ?cli_settings.host,
            port = ?cli_settings.port,
            content_dir = ?cli_settings.content_dir,
            config_dir = ?cli_settings.config_dir,
            "Command line overrides"
        );
        Config::load(self.config.as_deref(), Some(&cli_settings))
    }
}
