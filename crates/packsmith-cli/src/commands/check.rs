//! Check command implementation.

use std::path::Path;

use miette::Result;

pub fn exec(workspace: &Path) -> Result<()> {
    packsmith_ops::ops_check::check(workspace)?;
    Ok(())
}
