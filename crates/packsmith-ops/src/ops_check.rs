//! Operation: validate every pack without compiling or writing a lockfile.

use std::path::Path;

use packsmith_resolver::registry::Registry;
use packsmith_resolver::resolver::ValidationSummary;
use packsmith_util::errors::PacksmithError;
use packsmith_util::progress;

use crate::ops_workspace::Workspace;

/// Validate the workspace at `workspace_dir`.
///
/// Fails if any pack was skipped or discarded.
pub fn check(workspace_dir: &Path) -> miette::Result<ValidationSummary> {
    let mut workspace = Workspace::load(workspace_dir)?;
    progress::status("Checking", &format!("{} pack(s)", workspace.packs.len()));

    let mut registry = Registry::new();
    let mut resolver = workspace.take_resolver(&mut registry);
    let summary = resolver.validate();

    for failure in &workspace.load_failures {
        progress::status_warn("Skipped", &format!("{}: {}", failure.dir.display(), failure.message));
    }
    let report = resolver.report();
    for failure in report.iter() {
        progress::status_error("Invalid", &failure.to_string());
    }

    if !report.is_empty() || !workspace.load_failures.is_empty() {
        return Err(PacksmithError::Resolution {
            message: format!(
                "{} pack(s) failed validation, {} skipped",
                report.len(),
                workspace.load_failures.len()
            ),
        }
        .into());
    }

    progress::status("Finished", &format!("{} pack(s) valid", summary.resolved.len()));
    Ok(summary)
}
