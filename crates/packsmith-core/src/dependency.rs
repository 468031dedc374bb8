//! Dependency requirements and the declarations that carry them.

use std::collections::BTreeSet;
use std::fmt;

use crate::identifier::{Identifier, PackName};
use crate::version::VersionRange;

/// A request for any version of `name` inside `range`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Requirement {
    name: PackName,
    range: VersionRange,
}

impl Requirement {
    pub fn new(name: PackName, range: VersionRange) -> Self {
        Self { name, range }
    }

    /// A requirement satisfied by every version of `name`.
    pub fn any(name: PackName) -> Self {
        Self::new(name, VersionRange::any())
    }

    pub fn name(&self) -> &PackName {
        &self.name
    }

    pub fn range(&self) -> &VersionRange {
        &self.range
    }

    /// True iff the identifier is on this pack line and inside the window.
    pub fn compatible(&self, identifier: &Identifier) -> bool {
        identifier.name() == &self.name && self.range.contains(identifier.version())
    }

    /// Every identifier from `identifiers` that satisfies this requirement.
    pub fn compatible_in<'a, I>(&self, identifiers: I) -> BTreeSet<Identifier>
    where
        I: IntoIterator<Item = &'a Identifier>,
    {
        identifiers
            .into_iter()
            .filter(|id| self.compatible(id))
            .cloned()
            .collect()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.range.is_any() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.range)
        }
    }
}

/// One pack's stated requirement on another pack line. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyDeclaration {
    source: Identifier,
    requirement: Requirement,
}

impl DependencyDeclaration {
    pub fn new(source: Identifier, requirement: Requirement) -> Self {
        Self {
            source,
            requirement,
        }
    }

    /// The pack that declared this dependency.
    pub fn source(&self) -> &Identifier {
        &self.source
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// The pack line this declaration points at.
    pub fn target(&self) -> &PackName {
        self.requirement.name()
    }
}

impl fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (declared by {})", self.requirement, self.source)
    }
}
