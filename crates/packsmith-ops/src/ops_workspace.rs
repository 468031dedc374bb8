//! Loading a workspace: its config and every pack manifest under its roots.

use std::path::{Path, PathBuf};

use packsmith_core::config::{WorkspaceConfig, CONFIG_FILE};
use packsmith_core::manifest::{self, MANIFEST_FILE};
use packsmith_core::package::Package;
use packsmith_resolver::registry::Registry;
use packsmith_resolver::resolver::Resolver;
use packsmith_util::errors::PacksmithError;

/// A pack directory whose manifest could not be turned into a pack.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub dir: PathBuf,
    pub message: String,
}

/// A loaded workspace, before resolution.
#[derive(Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: WorkspaceConfig,
    pub packs: Vec<Package>,
    pub load_failures: Vec<LoadFailure>,
}

/// The directory holding `Packsmith.toml` at or above `start`, or `start`
/// itself when there is none.
pub fn find_workspace_root(start: &Path) -> PathBuf {
    packsmith_util::fs::find_ancestor_with(start, CONFIG_FILE).unwrap_or_else(|| start.to_path_buf())
}

impl Workspace {
    /// Read the config and every `pack.toml` under the configured roots.
    ///
    /// A broken manifest skips that pack only; it is kept in
    /// `load_failures`.
    pub fn load(root: &Path) -> miette::Result<Self> {
        let config = WorkspaceConfig::load(&root.join(CONFIG_FILE))?;

        let mut packs = Vec::new();
        let mut load_failures = Vec::new();
        for dir in config.root_dirs(root) {
            let pack_dirs = packsmith_util::fs::subdirs_containing(&dir, MANIFEST_FILE)
                .map_err(PacksmithError::Io)?;
            for pack_dir in pack_dirs {
                match manifest::load_pack(&pack_dir) {
                    Ok(package) => packs.push(package),
                    Err(e) => {
                        tracing::warn!("Skipping {}: {e}", pack_dir.display());
                        load_failures.push(LoadFailure {
                            dir: pack_dir,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
        tracing::debug!("Loaded {} pack(s) from {}", packs.len(), root.display());

        Ok(Self {
            root: root.to_path_buf(),
            config,
            packs,
            load_failures,
        })
    }

    /// Move every loaded pack into a fresh resolver over `registry`.
    ///
    /// Duplicate identifiers are recorded in the resolver's report.
    pub fn take_resolver<'r>(&mut self, registry: &'r mut Registry) -> Resolver<'r> {
        let mut resolver = Resolver::new(registry);
        for package in std::mem::take(&mut self.packs) {
            let _ = resolver.register(package);
        }
        resolver
    }
}
