//! Operation: resolve every pack in the workspace, compile the survivors in
//! dependency order, and write `Packsmith.lock`.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use serde::Serialize;

use packsmith_core::lockfile::{LockedDependency, LockedPack, Lockfile};
use packsmith_core::package::Package;
use packsmith_resolver::compiler::{CompileFailure, Compiler};
use packsmith_resolver::error::ResolveError;
use packsmith_resolver::registry::Registry;
use packsmith_util::errors::PacksmithError;
use packsmith_util::progress;

use crate::ops_workspace::{LoadFailure, Workspace};

/// Options for `packsmith resolve`.
#[derive(Debug, Default)]
pub struct ResolveOptions {
    /// Print the outcome as JSON on stdout.
    pub json: bool,
}

/// What a resolve run produced.
#[derive(Debug, Serialize)]
pub struct ResolveOutcome {
    /// Compiled packs, in compile order.
    pub compiled: Vec<String>,
    pub discarded: Vec<DiscardedPack>,
    /// Pack directories whose manifest could not be loaded.
    pub skipped: Vec<SkippedDir>,
    pub lockfile: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct DiscardedPack {
    pub identifier: String,
    pub reason: String,
    pub message: String,
}

impl From<&ResolveError> for DiscardedPack {
    fn from(err: &ResolveError) -> Self {
        Self {
            identifier: err.package().to_string(),
            reason: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SkippedDir {
    pub dir: PathBuf,
    pub message: String,
}

impl From<&LoadFailure> for SkippedDir {
    fn from(failure: &LoadFailure) -> Self {
        Self {
            dir: failure.dir.clone(),
            message: failure.message.clone(),
        }
    }
}

impl ResolveOutcome {
    pub fn is_clean(&self) -> bool {
        self.discarded.is_empty() && self.skipped.is_empty()
    }
}

/// Compiles each pack into its lockfile entry.
pub struct LockfileCompiler {
    bar: Option<ProgressBar>,
}

impl LockfileCompiler {
    pub fn new() -> Self {
        Self { bar: None }
    }

    pub fn with_progress(bar: ProgressBar) -> Self {
        Self { bar: Some(bar) }
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Default for LockfileCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for LockfileCompiler {
    type Artifact = LockedPack;

    fn compile(&mut self, package: &Package, registry: &Registry) -> Result<LockedPack, CompileFailure> {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
        Ok(lock_entry(package, registry))
    }
}

/// The lockfile entry for a pack about to be published.
///
/// The selected version of each line is the highest acceptable version
/// that is already published.
pub fn lock_entry(package: &Package, registry: &Registry) -> LockedPack {
    let dependencies = package
        .filtered_map()
        .iter()
        .map(|(name, acceptable)| {
            let selected = acceptable
                .iter()
                .find(|id| registry.contains(id))
                .or_else(|| acceptable.first());
            LockedDependency {
                identifier: name.to_string(),
                selected: selected.map(|id| id.version().to_string()).unwrap_or_default(),
                acceptable: acceptable.iter().map(|id| id.version().to_string()).collect(),
            }
        })
        .collect();

    LockedPack {
        identifier: package.name().to_string(),
        version: package.identifier().version().to_string(),
        checksum: package.info().checksum.clone(),
        dependency_count: package.transitive_dependency_count(),
        dependencies,
    }
}

/// Resolve and compile the workspace at `workspace_dir` and write its lockfile.
///
/// Discarded packs are reported but only fail the operation when
/// `resolve.fail-on-error` is set.
pub fn resolve(workspace_dir: &Path, opts: &ResolveOptions) -> miette::Result<ResolveOutcome> {
    let mut workspace = Workspace::load(workspace_dir)?;
    if !opts.json {
        progress::status("Resolving", &format!("{} pack(s)", workspace.packs.len()));
    }

    let mut registry = Registry::new();
    let mut resolver = workspace.take_resolver(&mut registry);
    resolver.validate();

    let pending = resolver.resolved().count() as u64;
    let mut compiler = if opts.json {
        LockfileCompiler::new()
    } else {
        LockfileCompiler::with_progress(progress::pack_bar(pending, "Compiling"))
    };
    let compiled = resolver.compile(&mut compiler);
    compiler.finish();
    let report = resolver.into_report();

    let lockfile_path = workspace.config.lockfile_path(&workspace.root);
    let outcome = ResolveOutcome {
        compiled: compiled
            .iter()
            .map(|c| c.package.identifier().to_string())
            .collect(),
        discarded: report.iter().map(DiscardedPack::from).collect(),
        skipped: workspace.load_failures.iter().map(SkippedDir::from).collect(),
        lockfile: lockfile_path.clone(),
    };

    let lockfile = Lockfile {
        pack: compiled.into_iter().map(|c| c.artifact).collect(),
    };
    lockfile.write_to(&lockfile_path)?;

    if opts.json {
        let json = serde_json::to_string_pretty(&outcome).map_err(|e| PacksmithError::Generic {
            message: format!("Failed to serialize outcome: {e}"),
        })?;
        println!("{json}");
    } else {
        for skipped in &outcome.skipped {
            progress::status_warn("Skipped", &format!("{}: {}", skipped.dir.display(), skipped.message));
        }
        for discarded in &outcome.discarded {
            progress::status_warn("Discarded", &discarded.message);
        }
        progress::status(
            "Locked",
            &format!("{} pack(s) in {}", outcome.compiled.len(), lockfile_path.display()),
        );
    }

    if workspace.config.resolve.fail_on_error && !outcome.is_clean() {
        return Err(PacksmithError::Resolution {
            message: format!(
                "{} pack(s) discarded, {} skipped",
                outcome.discarded.len(),
                outcome.skipped.len()
            ),
        }
        .into());
    }
    Ok(outcome)
}
