//! Resolution failures.
//!
//! Every variant names the pack that was discarded and the declaration(s)
//! that caused it, enough to rebuild an "X requires Y but ..." message.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use packsmith_core::dependency::DependencyDeclaration;
use packsmith_core::identifier::{Identifier, PackName};

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ResolveError {
    #[error("'{identifier}' is a duplicate identifier")]
    #[diagnostic(
        code(packsmith::resolve::duplicate_identifier),
        help("Each pack version may only be registered once")
    )]
    DuplicateIdentifier { identifier: Identifier },

    #[error("{package} requires {declaration}, which cannot be traced{}", rejected_note(.rejected))]
    #[diagnostic(code(packsmith::resolve::missing_dependency))]
    MissingDependency {
        package: Identifier,
        declaration: Arc<DependencyDeclaration>,
        /// Compatible packs that were discarded during their own validation.
        rejected: Vec<Identifier>,
    },

    #[error("{package} depends on its own pack line through {declaration}")]
    #[diagnostic(code(packsmith::resolve::invalid_dependency), help("This may have been caused by a sub-dependency"))]
    InvalidDependency {
        package: Identifier,
        declaration: Arc<DependencyDeclaration>,
    },

    #[error("{package} requires {declaration}, which is incompatible with the versions allowed by {conflicting}")]
    #[diagnostic(code(packsmith::resolve::incompatible_versions), help("This may have been caused by a sub-dependency"))]
    IncompatibleDependencyVersions {
        package: Identifier,
        declaration: Arc<DependencyDeclaration>,
        conflicting: Arc<DependencyDeclaration>,
    },

    #[error("{package} requires {declaration}, but candidate {candidate} also depends on {unexpected}, which {model} does not")]
    #[diagnostic(
        code(packsmith::resolve::diverging_dependencies),
        help("Every version satisfying one requirement must declare the same dependencies; narrow the version window")
    )]
    DivergingDependencies {
        package: Identifier,
        declaration: Arc<DependencyDeclaration>,
        model: Identifier,
        candidate: Identifier,
        unexpected: PackName,
    },

    #[error("{package} requires {declaration}, but candidate {candidate} is missing {} required by {model}", names(.missing))]
    #[diagnostic(
        code(packsmith::resolve::missing_dependencies),
        help("Every version satisfying one requirement must declare the same dependencies; narrow the version window")
    )]
    MissingDependencies {
        package: Identifier,
        declaration: Arc<DependencyDeclaration>,
        model: Identifier,
        candidate: Identifier,
        missing: Vec<PackName>,
    },

    #[error("{package} is part of a dependency cycle: {}", path_display(.path))]
    #[diagnostic(code(packsmith::resolve::cycle))]
    CyclicDependency {
        package: Identifier,
        declaration: Arc<DependencyDeclaration>,
        path: Vec<Identifier>,
    },

    #[error("{identifier} is not registered")]
    #[diagnostic(code(packsmith::resolve::unknown))]
    UnknownPackage { identifier: Identifier },

    #[error("{package} cannot compile: no version of {name} was published")]
    #[diagnostic(code(packsmith::resolve::unpublished))]
    UnpublishedDependency { package: Identifier, name: PackName },

    #[error("{package} failed to compile: {message}")]
    #[diagnostic(code(packsmith::resolve::compilation))]
    Compilation { package: Identifier, message: String },
}

impl ResolveError {
    /// The pack this failure discarded.
    pub fn package(&self) -> &Identifier {
        match self {
            ResolveError::DuplicateIdentifier { identifier }
            | ResolveError::UnknownPackage { identifier } => identifier,
            ResolveError::MissingDependency { package, .. }
            | ResolveError::InvalidDependency { package, .. }
            | ResolveError::IncompatibleDependencyVersions { package, .. }
            | ResolveError::DivergingDependencies { package, .. }
            | ResolveError::MissingDependencies { package, .. }
            | ResolveError::CyclicDependency { package, .. }
            | ResolveError::UnpublishedDependency { package, .. }
            | ResolveError::Compilation { package, .. } => package,
        }
    }

    /// The declaration at fault, when the failure has one.
    pub fn declaration(&self) -> Option<&Arc<DependencyDeclaration>> {
        match self {
            ResolveError::MissingDependency { declaration, .. }
            | ResolveError::InvalidDependency { declaration, .. }
            | ResolveError::IncompatibleDependencyVersions { declaration, .. }
            | ResolveError::DivergingDependencies { declaration, .. }
            | ResolveError::MissingDependencies { declaration, .. }
            | ResolveError::CyclicDependency { declaration, .. } => Some(declaration),
            _ => None,
        }
    }

    /// Short stable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::DuplicateIdentifier { .. } => "duplicate-identifier",
            ResolveError::MissingDependency { .. } => "missing-dependency",
            ResolveError::InvalidDependency { .. } => "invalid-dependency",
            ResolveError::IncompatibleDependencyVersions { .. } => "incompatible-versions",
            ResolveError::DivergingDependencies { .. } => "diverging-dependencies",
            ResolveError::MissingDependencies { .. } => "missing-dependencies",
            ResolveError::CyclicDependency { .. } => "cyclic-dependency",
            ResolveError::UnknownPackage { .. } => "unknown-package",
            ResolveError::UnpublishedDependency { .. } => "unpublished-dependency",
            ResolveError::Compilation { .. } => "compilation",
        }
    }
}

fn rejected_note(rejected: &[Identifier]) -> String {
    if rejected.is_empty() {
        return String::new();
    }
    let list: Vec<String> = rejected.iter().map(|id| id.to_string()).collect();
    format!(" (rejected candidates: {})", list.join(", "))
}

fn names(names: &[PackName]) -> String {
    let list: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    list.join(", ")
}

fn path_display(path: &[Identifier]) -> String {
    let list: Vec<String> = path.iter().map(|id| id.to_string()).collect();
    list.join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use packsmith_core::dependency::Requirement;
    use packsmith_core::version::VersionRange;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn decl(source: &str, target: &str, range: &str) -> Arc<DependencyDeclaration> {
        Arc::new(DependencyDeclaration::new(
            id(source),
            Requirement::new(
                PackName::parse(target).unwrap(),
                VersionRange::parse(range).unwrap(),
            ),
        ))
    }

    #[test]
    fn missing_dependency_message() {
        let err = ResolveError::MissingDependency {
            package: id("mod:a@1.0"),
            declaration: decl("mod:a@1.0", "core:base", "[1.0,2.0)"),
            rejected: vec![],
        };
        assert_eq!(
            err.to_string(),
            "mod:a@1.0.0 requires core:base [1.0.0,2.0.0) (declared by mod:a@1.0.0), which cannot be traced"
        );
        assert_eq!(err.package(), &id("mod:a@1.0"));
        assert_eq!(err.kind(), "missing-dependency");
    }

    #[test]
    fn missing_dependency_lists_rejected() {
        let err = ResolveError::MissingDependency {
            package: id("mod:a@1.0"),
            declaration: decl("mod:a@1.0", "core:base", "*"),
            rejected: vec![id("core:base@1.0"), id("core:base@1.1")],
        };
        assert!(err
            .to_string()
            .ends_with("(rejected candidates: core:base@1.0.0, core:base@1.1.0)"));
    }

    #[test]
    fn cycle_message() {
        let err = ResolveError::CyclicDependency {
            package: id("mod:b@1.0"),
            declaration: decl("mod:b@1.0", "mod:a", "*"),
            path: vec![id("mod:a@1.0"), id("mod:b@1.0"), id("mod:a@1.0")],
        };
        assert_eq!(
            err.to_string(),
            "mod:b@1.0.0 is part of a dependency cycle: mod:a@1.0.0 -> mod:b@1.0.0 -> mod:a@1.0.0"
        );
        assert!(err.declaration().is_some());
    }

    #[test]
    fn missing_dependencies_lists_names() {
        let err = ResolveError::MissingDependencies {
            package: id("mod:a@1.0"),
            declaration: decl("mod:a@1.0", "core:base", "*"),
            model: id("core:base@1.1"),
            candidate: id("core:base@1.0"),
            missing: vec![PackName::parse("extra:lib").unwrap()],
        };
        assert!(err
            .to_string()
            .contains("candidate core:base@1.0.0 is missing extra:lib required by core:base@1.1.0"));
    }
}
