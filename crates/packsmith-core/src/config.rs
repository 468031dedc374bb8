use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use packsmith_util::errors::PacksmithError;

/// File name of the workspace configuration.
pub const CONFIG_FILE: &str = "Packsmith.toml";

/// Workspace configuration loaded from `Packsmith.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub workspace: WorkspaceSection,

    #[serde(default)]
    pub resolve: ResolveConfig,
}

/// Pack discovery settings from `[workspace]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSection {
    /// Directories whose subdirectories hold one `pack.toml` each. Earlier
    /// roots register first.
    #[serde(default = "default_roots")]
    pub roots: Vec<String>,
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            roots: default_roots(),
        }
    }
}

fn default_roots() -> Vec<String> {
    vec!["packs".to_string()]
}

/// Resolution settings from `[resolve]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default = "default_lockfile")]
    pub lockfile: String,
    /// Exit non-zero when any pack is discarded.
    #[serde(default, rename = "fail-on-error")]
    pub fail_on_error: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            lockfile: default_lockfile(),
            fail_on_error: false,
        }
    }
}

fn default_lockfile() -> String {
    "Packsmith.lock".to_string()
}

impl WorkspaceConfig {
    /// Load `Packsmith.toml` from `path`, or return defaults if the file doesn't exist.
    pub fn load(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| PacksmithError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            PacksmithError::Config {
                message: format!("Failed to parse workspace config: {e}"),
            }
            .into()
        })
    }

    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Pack roots resolved against the workspace directory.
    pub fn root_dirs(&self, workspace_dir: &Path) -> Vec<PathBuf> {
        self.workspace
            .roots
            .iter()
            .map(|r| workspace_dir.join(r))
            .collect()
    }

    pub fn lockfile_path(&self, workspace_dir: &Path) -> PathBuf {
        workspace_dir.join(&self.resolve.lockfile)
    }
}
