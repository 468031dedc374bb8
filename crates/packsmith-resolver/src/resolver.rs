//! Validation and compile ordering for a batch of packs.
//!
//! Every registered pack lives in one arena slot whose state moves
//! `Unresolved -> Resolving -> Resolved | Failed`. While a pack is
//! `Resolving` it is owned by the call that validates it, so candidates can
//! be read from the arena and the registry without aliasing.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use packsmith_core::dependency::DependencyDeclaration;
use packsmith_core::identifier::Identifier;
use packsmith_core::package::Package;

use crate::compiler::{Compiled, Compiler};
use crate::error::ResolveError;
use crate::filter::{self, PackLookup};
use crate::registry::Registry;
use crate::report::FailureReport;

/// Where a pack is in the resolution lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    Unresolved,
    Resolving,
    Resolved,
    Failed,
    Published,
}

enum Slot {
    Unresolved(Package),
    Resolving,
    Resolved(Package),
    Failed(ResolveError),
}

impl Slot {
    fn state(&self) -> PackageState {
        match self {
            Slot::Unresolved(_) => PackageState::Unresolved,
            Slot::Resolving => PackageState::Resolving,
            Slot::Resolved(_) => PackageState::Resolved,
            Slot::Failed(_) => PackageState::Failed,
        }
    }
}

/// Outcome of [`Resolver::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub resolved: Vec<Identifier>,
    pub failed: Vec<Identifier>,
}

impl ValidationSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Validated packs, whether already published or resolved in this batch.
struct Validated<'a> {
    registry: &'a Registry,
    slots: &'a BTreeMap<Identifier, Slot>,
}

impl PackLookup for Validated<'_> {
    fn lookup(&self, identifier: &Identifier) -> Option<&Package> {
        if let Some(package) = self.registry.get(identifier) {
            return Some(package.as_ref());
        }
        match self.slots.get(identifier) {
            Some(Slot::Resolved(package)) => Some(package),
            _ => None,
        }
    }
}

/// Resolves a batch of packs against each other and a registry of
/// previously published packs, then compiles the survivors in dependency
/// order.
///
/// A pack that fails is discarded with a recorded reason; the rest of the
/// batch carries on without it. Failed packs are never retried.
pub struct Resolver<'r> {
    registry: &'r mut Registry,
    slots: BTreeMap<Identifier, Slot>,
    /// Packs currently being validated, outermost first.
    stack: Vec<Identifier>,
    report: FailureReport,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r mut Registry) -> Self {
        Self {
            registry,
            slots: BTreeMap::new(),
            stack: Vec::new(),
            report: FailureReport::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &*self.registry
    }

    pub fn report(&self) -> &FailureReport {
        &self.report
    }

    pub fn into_report(self) -> FailureReport {
        self.report
    }

    /// Current state of a pack, or `None` if it was never seen.
    pub fn state(&self, identifier: &Identifier) -> Option<PackageState> {
        if self.registry.contains(identifier) {
            return Some(PackageState::Published);
        }
        self.slots.get(identifier).map(Slot::state)
    }

    /// Packs resolved in this batch and not yet compiled.
    pub fn resolved(&self) -> impl Iterator<Item = &Package> {
        self.slots.values().filter_map(|slot| match slot {
            Slot::Resolved(package) => Some(package),
            _ => None,
        })
    }

    /// Add a pack to the unresolved pool.
    ///
    /// An identifier already registered in this batch or already published
    /// is rejected; the existing pack is kept.
    pub fn register(&mut self, package: Package) -> Result<(), ResolveError> {
        let identifier = package.identifier().clone();
        if self.registry.contains(&identifier) || self.slots.contains_key(&identifier) {
            let err = ResolveError::DuplicateIdentifier { identifier };
            tracing::warn!("{err}");
            self.report.add(err.clone());
            return Err(err);
        }
        tracing::debug!("registered {identifier}");
        self.slots.insert(identifier, Slot::Unresolved(package));
        Ok(())
    }

    /// Validate every unresolved pack.
    pub fn validate(&mut self) -> ValidationSummary {
        let pending: Vec<Identifier> = self
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Unresolved(_)))
            .map(|(id, _)| id.clone())
            .collect();

        for identifier in &pending {
            // Packs pulled in as candidates of an earlier pack are done already.
            if self.state(identifier) == Some(PackageState::Unresolved) {
                // Failures are recorded in the report.
                let _ = self.resolve_unresolved(identifier);
            }
        }

        let mut summary = ValidationSummary::default();
        for (identifier, slot) in &self.slots {
            match slot {
                Slot::Resolved(_) => summary.resolved.push(identifier.clone()),
                Slot::Failed(_) => summary.failed.push(identifier.clone()),
                _ => {}
            }
        }
        tracing::info!(
            "validated {} pack(s), {} discarded",
            summary.resolved.len(),
            summary.failed.len()
        );
        summary
    }

    /// Validate one pack (and, recursively, whatever it needs), returning
    /// its transitive dependency count.
    ///
    /// Results are memoized: a resolved or published pack returns its count
    /// and a failed pack returns its original error.
    pub fn check(&mut self, identifier: &Identifier) -> Result<u64, ResolveError> {
        if let Some(package) = self.registry.get(identifier) {
            return Ok(package.transitive_dependency_count());
        }
        match self.slots.get(identifier) {
            Some(Slot::Unresolved(_)) => self.resolve_unresolved(identifier),
            Some(Slot::Resolved(package)) => Ok(package.transitive_dependency_count()),
            Some(Slot::Failed(err)) => Err(err.clone()),
            // `Resolving` is only observable from inside a validation.
            Some(Slot::Resolving) | None => Err(ResolveError::UnknownPackage {
                identifier: identifier.clone(),
            }),
        }
    }

    /// Compile every resolved pack, lowest transitive dependency count first,
    /// publishing each success to the registry.
    pub fn compile<C: Compiler>(&mut self, compiler: &mut C) -> Vec<Compiled<C::Artifact>> {
        let resolved: Vec<Identifier> = self
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Resolved(_)))
            .map(|(id, _)| id.clone())
            .collect();
        let mut queue: Vec<Package> = resolved
            .iter()
            .filter_map(|id| match self.slots.remove(id) {
                Some(Slot::Resolved(package)) => Some(package),
                _ => None,
            })
            .collect();
        queue.sort_by(|a, b| {
            a.transitive_dependency_count()
                .cmp(&b.transitive_dependency_count())
                .then_with(|| a.identifier().cmp(b.identifier()))
        });

        let mut compiled = Vec::with_capacity(queue.len());
        for package in queue {
            let identifier = package.identifier().clone();
            if self.registry.contains(&identifier) {
                tracing::debug!("{identifier} is already published, skipping");
                continue;
            }

            let unpublished = package
                .filtered_map()
                .iter()
                .find(|(_, ids)| !ids.iter().any(|id| self.registry.contains(id)))
                .map(|(name, _)| name.clone());
            if let Some(name) = unpublished {
                self.fail(ResolveError::UnpublishedDependency {
                    package: identifier,
                    name,
                });
                continue;
            }

            match compiler.compile(&package, &*self.registry) {
                Ok(artifact) => {
                    let package = Arc::new(package);
                    self.registry.publish(Arc::clone(&package));
                    tracing::debug!("compiled {identifier}");
                    compiled.push(Compiled { package, artifact });
                }
                Err(failure) => self.fail(ResolveError::Compilation {
                    package: identifier,
                    message: failure.message,
                }),
            }
        }

        tracing::info!("compiled {} pack(s)", compiled.len());
        compiled
    }

    fn lookup(&self) -> Validated<'_> {
        Validated {
            registry: &*self.registry,
            slots: &self.slots,
        }
    }

    fn fail(&mut self, err: ResolveError) {
        tracing::warn!("{err}");
        self.report.add(err.clone());
        self.slots.insert(err.package().clone(), Slot::Failed(err));
    }

    /// Move an unresolved pack out of the arena, leaving it `Resolving`.
    fn take_unresolved(&mut self, identifier: &Identifier) -> Option<Package> {
        let slot = self.slots.get_mut(identifier)?;
        if !matches!(slot, Slot::Unresolved(_)) {
            return None;
        }
        match std::mem::replace(slot, Slot::Resolving) {
            Slot::Unresolved(package) => Some(package),
            _ => None,
        }
    }

    fn resolve_unresolved(&mut self, identifier: &Identifier) -> Result<u64, ResolveError> {
        let Some(mut package) = self.take_unresolved(identifier) else {
            return Err(ResolveError::UnknownPackage {
                identifier: identifier.clone(),
            });
        };
        tracing::debug!("validating {identifier}");

        self.stack.push(identifier.clone());
        let result = self.validate_package(&mut package);
        self.stack.pop();

        match result {
            Ok(()) => {
                let count = package.transitive_dependency_count();
                tracing::debug!("resolved {identifier} (transitive dependency count {count})");
                self.slots
                    .insert(identifier.clone(), Slot::Resolved(package));
                Ok(count)
            }
            Err(err) => {
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    fn validate_package(&mut self, package: &mut Package) -> Result<(), ResolveError> {
        let declarations: Vec<Arc<DependencyDeclaration>> = package.dependencies().to_vec();
        for declaration in declarations {
            self.collect_candidates(package, declaration)?;
        }
        filter::filter_dependencies(package, &self.lookup())
    }

    /// Find every validated pack satisfying `declaration`, validating
    /// unresolved candidates on the way, and fold their candidate maps into
    /// `package`.
    fn collect_candidates(
        &mut self,
        package: &mut Package,
        declaration: Arc<DependencyDeclaration>,
    ) -> Result<(), ResolveError> {
        let owner = package.identifier().clone();
        if declaration.target() == package.name() {
            return Err(ResolveError::InvalidDependency {
                package: owner,
                declaration,
            });
        }

        let requirement = declaration.requirement();
        let mut valid: BTreeSet<Identifier> = requirement.compatible_in(self.registry.identifiers());
        let mut rejected = Vec::new();
        let mut in_progress = None;

        let pooled: Vec<Identifier> = self
            .slots
            .keys()
            .filter(|id| requirement.compatible(id))
            .cloned()
            .collect();
        for candidate in pooled {
            match self.state(&candidate) {
                Some(PackageState::Resolved) => {
                    valid.insert(candidate);
                }
                Some(PackageState::Unresolved) => match self.resolve_unresolved(&candidate) {
                    Ok(_) => {
                        valid.insert(candidate);
                    }
                    Err(_) => {
                        tracing::debug!("{owner}: candidate {candidate} rejected");
                        rejected.push(candidate);
                    }
                },
                Some(PackageState::Failed) => rejected.push(candidate),
                // An ancestor still being validated cannot serve as a candidate.
                Some(PackageState::Resolving) => {
                    in_progress.get_or_insert(candidate);
                }
                Some(PackageState::Published) | None => {}
            }
        }

        if valid.is_empty() {
            if let Some(ancestor) = in_progress {
                let path = self.cycle_path(&ancestor);
                return Err(ResolveError::CyclicDependency {
                    package: owner,
                    declaration,
                    path,
                });
            }
            return Err(ResolveError::MissingDependency {
                package: owner,
                declaration,
                rejected,
            });
        }

        let valid = Arc::new(valid);
        package.record_candidates(Arc::clone(&declaration), Arc::clone(&valid));

        let packs = self.lookup();
        for candidate in valid.iter() {
            if let Some(dependency) = packs.lookup(candidate) {
                package.inherit_candidates(dependency.candidate_map());
            }
        }

        if let Some(offending) = package.self_references().and_then(|decls| decls.keys().next()) {
            return Err(ResolveError::InvalidDependency {
                package: owner,
                declaration: Arc::clone(offending),
            });
        }
        Ok(())
    }

    /// The chain of packs being validated from `ancestor` to the innermost,
    /// closed back onto `ancestor`.
    fn cycle_path(&self, ancestor: &Identifier) -> Vec<Identifier> {
        let start = self
            .stack
            .iter()
            .position(|id| id == ancestor)
            .unwrap_or(0);
        let mut path = self.stack[start..].to_vec();
        path.push(ancestor.clone());
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::PublishOnly;
    use packsmith_core::dependency::Requirement;
    use packsmith_core::identifier::PackName;
    use packsmith_core::version::VersionRange;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn pack(identifier: &str, deps: &[(&str, &str)]) -> Package {
        let reqs = deps.iter().map(|(name, range)| {
            Requirement::new(
                PackName::parse(name).unwrap(),
                VersionRange::parse(range).unwrap(),
            )
        });
        Package::new(id(identifier), reqs).unwrap()
    }

    #[test]
    fn lone_pack_resolves_with_zero_count() {
        let mut registry = Registry::new();
        let mut resolver = Resolver::new(&mut registry);
        resolver.register(pack("core:base@1.0", &[])).unwrap();

        let summary = resolver.validate();
        assert_eq!(summary.resolved, vec![id("core:base@1.0")]);
        assert!(summary.is_clean());
        assert_eq!(resolver.check(&id("core:base@1.0")).unwrap(), 0);
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut registry = Registry::new();
        let mut resolver = Resolver::new(&mut registry);
        resolver
            .register(pack("core:base@1.0", &[("extra:lib", "*")]))
            .unwrap();
        let err = resolver.register(pack("core:base@1.0", &[])).unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateIdentifier { .. }));
        assert_eq!(resolver.report().len(), 1);
        assert_eq!(
            resolver.state(&id("core:base@1.0")),
            Some(PackageState::Unresolved)
        );
    }

    #[test]
    fn state_moves_through_lifecycle() {
        let mut registry = Registry::new();
        let mut resolver = Resolver::new(&mut registry);
        let base = id("core:base@1.0");
        assert_eq!(resolver.state(&base), None);

        resolver.register(pack("core:base@1.0", &[])).unwrap();
        assert_eq!(resolver.state(&base), Some(PackageState::Unresolved));
        resolver.validate();
        assert_eq!(resolver.state(&base), Some(PackageState::Resolved));
        resolver.compile(&mut PublishOnly);
        assert_eq!(resolver.state(&base), Some(PackageState::Published));
    }

    #[test]
    fn direct_self_reference_is_invalid() {
        let mut registry = Registry::new();
        let mut resolver = Resolver::new(&mut registry);
        resolver.register(pack("mod:c@1.0", &[("mod:c", "[5.0]")])).unwrap();

        let err = resolver.check(&id("mod:c@1.0")).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidDependency { .. }), "got {err:?}");
        assert_eq!(resolver.state(&id("mod:c@1.0")), Some(PackageState::Failed));
    }

    #[test]
    fn failed_check_is_memoized() {
        let mut registry = Registry::new();
        let mut resolver = Resolver::new(&mut registry);
        resolver.register(pack("mod:a@1.0", &[("core:base", "*")])).unwrap();

        let first = resolver.check(&id("mod:a@1.0")).unwrap_err();
        let second = resolver.check(&id("mod:a@1.0")).unwrap_err();
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(resolver.report().len(), 1);
    }

    #[test]
    fn unknown_identifier() {
        let mut registry = Registry::new();
        let mut resolver = Resolver::new(&mut registry);
        let err = resolver.check(&id("mod:ghost@1.0")).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownPackage { .. }));
    }

    #[test]
    fn cycle_path_is_closed() {
        let mut registry = Registry::new();
        let mut resolver = Resolver::new(&mut registry);
        resolver.register(pack("mod:a@1.0", &[("mod:b", "*")])).unwrap();
        resolver.register(pack("mod:b@1.0", &[("mod:a", "*")])).unwrap();

        resolver.validate();
        let cyclic = resolver
            .report()
            .iter()
            .find_map(|f| match f {
                ResolveError::CyclicDependency { package, path, .. } => Some((package, path)),
                _ => None,
            })
            .expect("a cycle is reported");
        assert_eq!(cyclic.0, &id("mod:b@1.0"));
        assert_eq!(
            cyclic.1,
            &vec![id("mod:a@1.0"), id("mod:b@1.0"), id("mod:a@1.0")]
        );
    }
}
