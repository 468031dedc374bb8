//! Namespaced pack names and versioned identifiers.

use std::fmt;
use std::str::FromStr;

use miette::Diagnostic;
use thiserror::Error;

use crate::version::{Version, VersionError};

/// Errors raised while parsing pack names and identifiers.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("'{input}' is not a valid pack identifier: {reason}")]
    #[diagnostic(
        code(packsmith::identifier),
        help("Identifiers take the form `namespace:name`, e.g. `core:base`")
    )]
    Malformed { input: String, reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Version(#[from] VersionError),
}

/// A `namespace:name` pair naming a pack line, independent of version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackName {
    namespace: String,
    name: String,
}

impl PackName {
    pub fn new(namespace: &str, name: &str) -> Result<Self, IdentifierError> {
        let input = format!("{namespace}:{name}");
        check_segment(&input, "namespace", namespace)?;
        check_segment(&input, "name", name)?;
        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse `"namespace:name"`.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        match input.split_once(':') {
            Some((namespace, name)) => Self::new(namespace, name).map_err(|e| match e {
                IdentifierError::Malformed { reason, .. } => IdentifierError::Malformed {
                    input: input.to_string(),
                    reason,
                },
                other => other,
            }),
            None => Err(IdentifierError::Malformed {
                input: input.to_string(),
                reason: "missing ':' between namespace and name".to_string(),
            }),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach a version, producing a full identifier.
    pub fn at(&self, version: Version) -> Identifier {
        Identifier {
            name: self.clone(),
            version,
        }
    }
}

fn check_segment(input: &str, what: &str, segment: &str) -> Result<(), IdentifierError> {
    let reason = if segment.is_empty() {
        format!("{what} is empty")
    } else if segment.contains(':') {
        format!("{what} contains ':'")
    } else if segment.chars().any(char::is_whitespace) {
        format!("{what} contains whitespace")
    } else {
        return Ok(());
    };
    Err(IdentifierError::Malformed {
        input: input.to_string(),
        reason,
    })
}

impl FromStr for PackName {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// A pack name at one exact version. Unique within a resolution universe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    name: PackName,
    version: Version,
}

impl Identifier {
    pub fn new(name: PackName, version: Version) -> Self {
        Self { name, version }
    }

    /// Parse `"namespace:name@version"`.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let (name, version) = input
            .rsplit_once('@')
            .ok_or_else(|| IdentifierError::Malformed {
                input: input.to_string(),
                reason: "missing '@' before the version".to_string(),
            })?;
        Ok(Self {
            name: PackName::parse(name)?,
            version: Version::parse(version)?,
        })
    }

    pub fn name(&self) -> &PackName {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Whether both identifiers belong to the same pack line, ignoring version.
    pub fn same_line(&self, other: &Identifier) -> bool {
        self.name == other.name
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Sort identifiers from highest to lowest version.
///
/// Ties (same version, different lines) fall back to name order so the
/// result is deterministic.
pub fn sort_by_highest_version<I>(identifiers: I) -> Vec<Identifier>
where
    I: IntoIterator<Item = Identifier>,
{
    let mut sorted: Vec<Identifier> = identifiers.into_iter().collect();
    sorted.sort_by(|a, b| {
        b.version
            .cmp(&a.version)
            .then_with(|| a.name.cmp(&b.name))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pack_name() {
        let name = PackName::parse("core:base").unwrap();
        assert_eq!(name.namespace(), "core");
        assert_eq!(name.name(), "base");
        assert_eq!(name.to_string(), "core:base");
    }

    #[test]
    fn reject_bad_pack_names() {
        for bad in ["core", ":base", "core:", "core:base:extra", "co re:base"] {
            assert!(PackName::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn malformed_name_reports_whole_input() {
        let err = PackName::parse("core:").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'core:' is not a valid pack identifier: name is empty"
        );
    }

    #[test]
    fn parse_identifier() {
        let id = Identifier::parse("mod:a@1.2").unwrap();
        assert_eq!(id.name().to_string(), "mod:a");
        assert_eq!(id.version(), &Version::new(1, 2, 0));
        assert_eq!(id.to_string(), "mod:a@1.2.0");
    }

    #[test]
    fn identifier_needs_version() {
        assert!(Identifier::parse("mod:a").is_err());
        assert!(Identifier::parse("mod:a@x").is_err());
    }

    #[test]
    fn equality_is_exact_but_lines_ignore_version() {
        let a = Identifier::parse("core:base@1.0").unwrap();
        let b = Identifier::parse("core:base@1.0.0").unwrap();
        let c = Identifier::parse("core:base@1.1").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.same_line(&c));
    }

    #[test]
    fn sorts_highest_first() {
        let ids = ["core:base@1.0", "core:base@2.0", "core:base@1.5"]
            .iter()
            .map(|s| Identifier::parse(s).unwrap());
        let sorted: Vec<String> = sort_by_highest_version(ids)
            .iter()
            .map(|i| i.to_string())
            .collect();
        assert_eq!(
            sorted,
            vec!["core:base@2.0.0", "core:base@1.5.0", "core:base@1.0.0"]
        );
    }
}
