//! Operation: display the dependency tree of the resolved workspace.

use std::path::Path;

use packsmith_resolver::compiler::PublishOnly;
use packsmith_resolver::graph::DependencyGraph;
use packsmith_resolver::registry::Registry;

use crate::ops_workspace::Workspace;

/// Options for `packsmith tree`.
#[derive(Debug, Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Show how the roots reach this pack.
    pub why: Option<String>,
    /// Show everything that depends on this pack.
    pub invert: Option<String>,
}

/// Resolve the workspace and print its dependency tree.
pub fn tree(workspace_dir: &Path, opts: &TreeOptions) -> miette::Result<()> {
    let mut workspace = Workspace::load(workspace_dir)?;
    let mut registry = Registry::new();
    let mut resolver = workspace.take_resolver(&mut registry);
    resolver.validate();
    resolver.compile(&mut PublishOnly);
    let discarded = resolver.report().len();

    let graph = DependencyGraph::from_registry(&registry);

    if let Some(ref target) = opts.why {
        if graph.resolve_key(target).is_none() {
            println!("Pack '{target}' not found in the graph.");
            return Ok(());
        }
        for root in graph.roots() {
            let from = graph.node(root).to_string();
            if let Some(path) = graph.find_path(&from, target) {
                for (i, node) in path.iter().enumerate() {
                    let indent = "  ".repeat(i);
                    println!("{indent}{node}");
                }
            }
        }
        return Ok(());
    }

    if let Some(ref target) = opts.invert {
        let inverted = graph.print_inverted_tree(target);
        if inverted.is_empty() {
            println!("Pack '{target}' not found in the graph.");
        } else {
            print!("{inverted}");
        }
        return Ok(());
    }

    if graph.is_empty() {
        println!("No packs.");
    } else {
        print!("{}", graph.print_tree(opts.depth));
    }
    if discarded > 0 {
        tracing::warn!("{discarded} pack(s) discarded; run `packsmith check` for details");
    }
    Ok(())
}
