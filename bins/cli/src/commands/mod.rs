//! CLI command handlers.

pub mod show;
pub mod url;
pub mod validate;

pub use show::run_show;
pub use url::run_url;
pub use validate::run_validate;

use clap::Args;
use std::path::{Path, PathBuf};

/// Where the config comes from, besides `DSC_*` env vars.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigSourceArgs {
    /// Optional config file path (JSON/TOML).
    #[arg(long)]
    pub path: Option<PathBuf>,
    /// Partial config JSON applied over the file.
    #[arg(long)]
    pub overrides_json: Option<String>,
}

impl ConfigSourceArgs {
    /// Config file path, if one was given.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Raw `--overrides-json` payload.
    pub fn overrides_json(&self) -> Option<&str> {
        self.overrides_json.as_deref()
    }

    fn path_display(&self) -> Option<String> {
        self.path
            .as_ref()
            .map(|path| path.to_string_lossy().to_string())
    }
}
