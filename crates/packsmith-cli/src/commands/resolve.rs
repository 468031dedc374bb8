//! Handler for `packsmith resolve`.

use std::path::Path;

use miette::Result;

use packsmith_ops::ops_resolve::{self, ResolveOptions};

pub fn exec(workspace: &Path, json: bool) -> Result<()> {
    ops_resolve::resolve(workspace, &ResolveOptions { json })?;
    Ok(())
}
