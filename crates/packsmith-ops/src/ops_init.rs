//! Operation: scaffold a workspace.

use std::path::Path;

use packsmith_core::config::{WorkspaceConfig, CONFIG_FILE};
use packsmith_util::errors::PacksmithError;

/// Write a default `Packsmith.toml` into `dir` and create its pack roots.
pub fn init(dir: &Path) -> miette::Result<()> {
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() {
        return Err(PacksmithError::Generic {
            message: format!("{CONFIG_FILE} already exists in this directory"),
        }
        .into());
    }

    let config = WorkspaceConfig::default();
    let content = config.to_string_pretty().map_err(|e| PacksmithError::Config {
        message: format!("Failed to serialize {CONFIG_FILE}: {e}"),
    })?;
    packsmith_util::fs::write_file(&config_path, &content).map_err(PacksmithError::Io)?;
    for root in config.root_dirs(dir) {
        std::fs::create_dir_all(&root).map_err(PacksmithError::Io)?;
    }
    Ok(())
}
