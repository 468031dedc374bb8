//! A pack: its identity, declared dependencies, and resolver-computed state.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::dependency::{DependencyDeclaration, Requirement};
use crate::identifier::{Identifier, PackName};

/// Identifiers able to satisfy one declaration. Shared between packs that
/// inherit the same declaration.
pub type CandidateSet = Arc<BTreeSet<Identifier>>;

/// Every declaration targeting one pack line, with its candidates.
pub type DeclarationCandidates = BTreeMap<Arc<DependencyDeclaration>, CandidateSet>;

/// Referenced pack line -> declarations on it -> candidates.
pub type CandidateMap = BTreeMap<PackName, DeclarationCandidates>;

/// Referenced pack line -> intersected candidates, highest version first.
pub type FilteredMap = BTreeMap<PackName, Vec<Identifier>>;

/// Errors raised while assembling a pack from its declarations.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum PackageError {
    #[error("pack {package} declares more than one dependency on {name}")]
    #[diagnostic(
        code(packsmith::package::duplicate_dependency),
        help("Merge the declarations into a single version window")
    )]
    DuplicateDependency { package: Identifier, name: PackName },
}

/// Descriptive fields carried through to compilers and lockfiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackInfo {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<String>,
    /// Directory the pack was loaded from, if any.
    pub root: Option<PathBuf>,
    /// SHA-256 of the manifest source, if known.
    pub checksum: Option<String>,
}

/// A named, versioned unit of content with its declared dependencies.
///
/// Created unresolved. The resolver fills the candidate and filtered maps;
/// once published to a registry the pack is never mutated again.
#[derive(Debug, Clone)]
pub struct Package {
    identifier: Identifier,
    dependencies: Vec<Arc<DependencyDeclaration>>,
    info: PackInfo,
    candidate_map: CandidateMap,
    filtered_map: FilteredMap,
    transitive_dependency_count: u64,
}

impl Package {
    /// Build a pack, rejecting repeated declarations on the same pack line.
    ///
    /// Self-reference is left to the resolver, which must also catch it
    /// when it arrives through a transitive chain.
    pub fn new<I>(identifier: Identifier, requirements: I) -> Result<Self, PackageError>
    where
        I: IntoIterator<Item = Requirement>,
    {
        let mut seen = BTreeSet::new();
        let mut dependencies = Vec::new();
        for requirement in requirements {
            if !seen.insert(requirement.name().clone()) {
                return Err(PackageError::DuplicateDependency {
                    name: requirement.name().clone(),
                    package: identifier,
                });
            }
            dependencies.push(Arc::new(DependencyDeclaration::new(
                identifier.clone(),
                requirement,
            )));
        }

        Ok(Self {
            identifier,
            dependencies,
            info: PackInfo::default(),
            candidate_map: CandidateMap::new(),
            filtered_map: FilteredMap::new(),
            transitive_dependency_count: 0,
        })
    }

    pub fn with_info(mut self, info: PackInfo) -> Self {
        self.info = info;
        self
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn name(&self) -> &PackName {
        self.identifier.name()
    }

    pub fn info(&self) -> &PackInfo {
        &self.info
    }

    pub fn dependencies(&self) -> &[Arc<DependencyDeclaration>] {
        &self.dependencies
    }

    /// The pack lines this pack declares directly, ignoring versions.
    pub fn declared_names(&self) -> BTreeSet<&PackName> {
        self.dependencies.iter().map(|d| d.target()).collect()
    }

    pub fn candidate_map(&self) -> &CandidateMap {
        &self.candidate_map
    }

    pub fn filtered_map(&self) -> &FilteredMap {
        &self.filtered_map
    }

    /// The chosen (highest) version for each referenced pack line.
    pub fn selected(&self) -> impl Iterator<Item = &Identifier> {
        self.filtered_map.values().filter_map(|ids| ids.first())
    }

    pub fn transitive_dependency_count(&self) -> u64 {
        self.transitive_dependency_count
    }

    /// Record the candidates found for one of this pack's declarations.
    pub fn record_candidates(&mut self, declaration: Arc<DependencyDeclaration>, set: CandidateSet) {
        self.candidate_map
            .entry(declaration.target().clone())
            .or_default()
            .insert(declaration, set);
    }

    /// Fold another pack's candidate map into this one.
    ///
    /// Entries are shared, not deep-copied.
    pub fn inherit_candidates(&mut self, other: &CandidateMap) {
        for (name, declarations) in other {
            let slot = self.candidate_map.entry(name.clone()).or_default();
            for (declaration, set) in declarations {
                slot.entry(Arc::clone(declaration))
                    .or_insert_with(|| Arc::clone(set));
            }
        }
    }

    /// Declarations (direct or inherited) that target this pack's own line.
    pub fn self_references(&self) -> Option<&DeclarationCandidates> {
        self.candidate_map.get(self.identifier.name())
    }

    pub fn set_filtered(&mut self, name: PackName, identifiers: Vec<Identifier>) {
        self.filtered_map.insert(name, identifiers);
    }

    pub fn add_dependency_count(&mut self, amount: u64) {
        self.transitive_dependency_count =
            self.transitive_dependency_count.saturating_add(amount);
    }
}
