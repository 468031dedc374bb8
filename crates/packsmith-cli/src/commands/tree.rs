//! Handler for `packsmith tree`.

use std::path::Path;

use miette::Result;

use packsmith_ops::ops_tree::{self, TreeOptions};

pub fn exec(
    workspace: &Path,
    depth: Option<u32>,
    why: Option<String>,
    invert: Option<String>,
) -> Result<()> {
    let opts = TreeOptions {
        depth: depth.map(|d| d as usize),
        why,
        invert,
    };
    ops_tree::tree(workspace, &opts)
}
