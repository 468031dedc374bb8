//! Command dispatch and handler modules.

mod check;
mod init;
mod resolve;
mod tree;

use std::path::PathBuf;

use miette::Result;

use packsmith_util::errors::PacksmithError;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init => init::exec(),
        Command::Resolve { json } => resolve::exec(&workspace_root(cli.manifest_path)?, json),
        Command::Check => check::exec(&workspace_root(cli.manifest_path)?),
        Command::Tree { depth, why, invert } => {
            tree::exec(&workspace_root(cli.manifest_path)?, depth, why, invert)
        }
    }
}

/// The workspace directory: the parent of `--manifest-path`, or the nearest
/// directory at or above the current one holding `Packsmith.toml`.
fn workspace_root(manifest_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = manifest_path {
        if !path.is_file() {
            return Err(PacksmithError::Config {
                message: format!("{} does not exist", path.display()),
            }
            .into());
        }
        let parent = path.parent().map(|p| p.to_path_buf()).unwrap_or_default();
        return Ok(if parent.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            parent
        });
    }
    let cwd = std::env::current_dir().map_err(PacksmithError::Io)?;
    let root = packsmith_ops::ops_workspace::find_workspace_root(&cwd);
    tracing::debug!("Using workspace {}", root.display());
    Ok(root)
}
