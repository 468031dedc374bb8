//! Narrowing a pack's candidate map to one ordered candidate list per
//! referenced pack line, and rejecting lines whose candidates disagree on
//! their own dependencies.

use std::collections::BTreeSet;
use std::sync::Arc;

use packsmith_core::dependency::DependencyDeclaration;
use packsmith_core::identifier::{sort_by_highest_version, Identifier, PackName};
use packsmith_core::package::{DeclarationCandidates, Package};

use crate::error::ResolveError;

/// Read access to packs that finished validation (published or resolved).
pub trait PackLookup {
    fn lookup(&self, identifier: &Identifier) -> Option<&Package>;
}

/// Fill `package`'s filtered map and raise its transitive dependency count.
///
/// For every pack line in the candidate map, the candidate sets of all
/// declarations on that line are intersected. Inherited identifiers that no
/// longer name a known pack are dropped first. The survivors must agree on
/// which pack lines they depend on. The stored list is highest version
/// first.
///
/// The count becomes the length of the longest dependency path below
/// `package`: one more than the deepest survivor on any line. Every survivor
/// therefore sorts before `package` in compile order, and the count stays
/// bounded by the number of packs.
///
/// Nothing is written to `package` unless every line passes.
pub fn filter_dependencies<L: PackLookup>(
    package: &mut Package,
    packs: &L,
) -> Result<(), ResolveError> {
    let owner = package.identifier().clone();
    let mut filtered = Vec::with_capacity(package.candidate_map().len());
    let mut depth = 0u64;

    for (name, declarations) in package.candidate_map() {
        let (declaration, surviving) = intersect(&owner, declarations, packs)?;
        let ordered = sort_by_highest_version(surviving);

        check_sub_dependencies(&owner, declaration, &ordered, packs)?;

        let deepest = ordered
            .iter()
            .filter_map(|id| packs.lookup(id))
            .map(Package::transitive_dependency_count)
            .max()
            .unwrap_or(0);
        depth = depth.max(deepest.saturating_add(1));

        tracing::trace!("{owner}: {name} narrowed to {} candidate(s)", ordered.len());
        filtered.push((name.clone(), ordered));
    }

    for (name, ordered) in filtered {
        package.set_filtered(name, ordered);
    }
    package.add_dependency_count(depth);
    Ok(())
}

/// Intersect the candidate sets of every declaration on one pack line.
///
/// Sets inherited from published packs can name versions that failed to
/// compile in an earlier batch; those are not in `packs` and are dropped.
/// Returns the first declaration (the one later checks are reported
/// against) and the surviving identifiers.
fn intersect<'a, L: PackLookup>(
    owner: &Identifier,
    declarations: &'a DeclarationCandidates,
    packs: &L,
) -> Result<(&'a Arc<DependencyDeclaration>, BTreeSet<Identifier>), ResolveError> {
    let mut entries = declarations.iter();
    let Some((first, first_set)) = entries.next() else {
        return Err(ResolveError::UnknownPackage {
            identifier: owner.clone(),
        });
    };

    let (mut surviving, stale): (BTreeSet<Identifier>, BTreeSet<Identifier>) = first_set
        .iter()
        .cloned()
        .partition(|id| packs.lookup(id).is_some());
    if surviving.is_empty() {
        return Err(ResolveError::MissingDependency {
            package: owner.clone(),
            declaration: Arc::clone(first),
            rejected: stale.into_iter().collect(),
        });
    }
    if !stale.is_empty() {
        tracing::debug!("{owner}: dropping unknown candidate(s) for {}", first.target());
    }

    for (declaration, set) in entries {
        surviving.retain(|id| set.contains(id));
        if surviving.is_empty() {
            let window = declaration.requirement().range();
            let conflicting = declarations
                .keys()
                .find(|other| !other.requirement().range().intersects(window))
                .unwrap_or(first);
            return Err(ResolveError::IncompatibleDependencyVersions {
                package: owner.clone(),
                declaration: Arc::clone(declaration),
                conflicting: Arc::clone(conflicting),
            });
        }
    }
    Ok((first, surviving))
}

/// Every surviving candidate must declare exactly the pack lines that the
/// lowest surviving version declares.
///
/// A candidate with an extra line diverges. A candidate that drops one of
/// the model's lines is reported as missing those lines.
fn check_sub_dependencies<L: PackLookup>(
    owner: &Identifier,
    declaration: &Arc<DependencyDeclaration>,
    ordered: &[Identifier],
    packs: &L,
) -> Result<(), ResolveError> {
    let Some((model_id, others)) = ordered.split_last() else {
        return Ok(());
    };
    let Some(model) = packs.lookup(model_id) else {
        return Err(ResolveError::MissingDependency {
            package: owner.clone(),
            declaration: Arc::clone(declaration),
            rejected: vec![model_id.clone()],
        });
    };
    let expected = model.declared_names();

    for candidate_id in others.iter().rev() {
        let Some(candidate) = packs.lookup(candidate_id) else {
            continue;
        };
        let actual = candidate.declared_names();

        if let Some(unexpected) = actual.difference(&expected).next() {
            return Err(ResolveError::DivergingDependencies {
                package: owner.clone(),
                declaration: Arc::clone(declaration),
                model: model_id.clone(),
                candidate: candidate_id.clone(),
                unexpected: PackName::clone(unexpected),
            });
        }

        let missing: Vec<PackName> = expected
            .difference(&actual)
            .map(|name| PackName::clone(name))
            .collect();
        if !missing.is_empty() {
            return Err(ResolveError::MissingDependencies {
                package: owner.clone(),
                declaration: Arc::clone(declaration),
                model: model_id.clone(),
                candidate: candidate_id.clone(),
                missing,
            });
        }
    }
    Ok(())
}
