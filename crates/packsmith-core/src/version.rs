//! Pack versions and version windows.
//!
//! Versions are up to three dot-separated non-negative integers. Missing
//! components are zero, so `1.0` and `1.0.0` name the same version.
//!
//! Windows use interval notation:
//! `[1.0,2.0)`, `[1.0,]`, `(,2.0)`, `[1.5]` (exact). A bare version is an
//! exact window, and `*` (or an empty string) accepts every version.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while building versions and version windows.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum VersionError {
    #[error("'{input}' is not a valid version")]
    #[diagnostic(
        code(packsmith::version::malformed),
        help("Versions are one to three dot-separated non-negative integers, e.g. `1.4.0`")
    )]
    Malformed { input: String },

    #[error("'{input}' is not a valid version range: {reason}")]
    #[diagnostic(code(packsmith::version::range))]
    MalformedRange { input: String, reason: String },

    #[error("maximum version {max} may not be lower than minimum version {min}")]
    #[diagnostic(
        code(packsmith::version::bounds),
        help("Swap the bounds or widen the window so it contains at least one version")
    )]
    BoundsInverted { min: String, max: String },
}

/// A comparable pack version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version(semver::Version);

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse `"1"`, `"1.2"` or `"1.2.3"`.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let malformed = || VersionError::Malformed {
            input: input.to_string(),
        };
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(malformed());
        }

        let mut parts = [0u64; 3];
        let mut count = 0;
        for token in trimmed.split('.') {
            if count == parts.len() || token.is_empty() {
                return Err(malformed());
            }
            if !token.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            parts[count] = token.parse().map_err(|_| malformed())?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0.major, self.0.minor, self.0.patch)
    }
}

/// One end of a [`VersionRange`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: true,
        }
    }

    pub fn exclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: false,
        }
    }
}

/// A window of acceptable versions. `None` on either side means unbounded.
///
/// A constructed range is never empty: at least one version satisfies it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionRange {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl VersionRange {
    /// Build a range, rejecting windows that contain no version.
    pub fn new(lower: Option<Bound>, upper: Option<Bound>) -> Result<Self, VersionError> {
        if window_is_empty(lower.as_ref(), upper.as_ref()) {
            // Both bounds are present whenever the window is empty.
            let show = |b: &Option<Bound>| {
                b.as_ref()
                    .map(|b| b.version.to_string())
                    .unwrap_or_default()
            };
            return Err(VersionError::BoundsInverted {
                min: show(&lower),
                max: show(&upper),
            });
        }
        Ok(Self { lower, upper })
    }

    /// The window accepting every version.
    pub fn any() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// The window accepting exactly `version`.
    pub fn exact(version: Version) -> Self {
        Self {
            lower: Some(Bound::inclusive(version.clone())),
            upper: Some(Bound::inclusive(version)),
        }
    }

    /// A closed window `[min, max]`; either side may be unbounded.
    pub fn between(min: Option<Version>, max: Option<Version>) -> Result<Self, VersionError> {
        Self::new(min.map(Bound::inclusive), max.map(Bound::inclusive))
    }

    /// Parse interval notation, a bare exact version, or `*`.
    pub fn parse(spec: &str) -> Result<Self, VersionError> {
        let s = spec.trim();
        if s.is_empty() || s == "*" {
            return Ok(Self::any());
        }
        if !s.starts_with('[') && !s.starts_with('(') {
            return Ok(Self::exact(Version::parse(s)?));
        }

        let malformed = |reason: &str| VersionError::MalformedRange {
            input: spec.to_string(),
            reason: reason.to_string(),
        };
        if s.len() < 2 || !(s.ends_with(']') || s.ends_with(')')) {
            return Err(malformed("missing closing bracket"));
        }

        let open_inclusive = s.starts_with('[');
        let close_inclusive = s.ends_with(']');
        let inner = &s[1..s.len() - 1];

        if let Some((lower, upper)) = inner.split_once(',') {
            if upper.contains(',') {
                return Err(malformed("expected at most two bounds"));
            }
            let bound = |text: &str, inclusive: bool| -> Result<Option<Bound>, VersionError> {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Bound {
                    version: Version::parse(text)?,
                    inclusive,
                }))
            };
            Self::new(bound(lower, open_inclusive)?, bound(upper, close_inclusive)?)
        } else {
            // [1.0] means exactly 1.0
            if !open_inclusive || !close_inclusive {
                return Err(malformed("an exact version must use square brackets"));
            }
            Ok(Self::exact(Version::parse(inner)?))
        }
    }

    pub fn lower(&self) -> Option<&Bound> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&Bound> {
        self.upper.as_ref()
    }

    pub fn is_any(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// Whether the window admits exactly one version.
    pub fn is_exact(&self) -> bool {
        matches!(
            (&self.lower, &self.upper),
            (Some(l), Some(u)) if l.version == u.version
        )
    }

    /// Check if a version satisfies this range.
    pub fn contains(&self, version: &Version) -> bool {
        if let Some(ref lower) = self.lower {
            let cmp = version.cmp(&lower.version);
            if lower.inclusive {
                if cmp == Ordering::Less {
                    return false;
                }
            } else if cmp != Ordering::Greater {
                return false;
            }
        }
        if let Some(ref upper) = self.upper {
            let cmp = version.cmp(&upper.version);
            if upper.inclusive {
                if cmp == Ordering::Greater {
                    return false;
                }
            } else if cmp != Ordering::Less {
                return false;
            }
        }
        true
    }

    /// Whether some version satisfies both windows.
    pub fn intersects(&self, other: &Self) -> bool {
        let lower = tighter_lower(self.lower.as_ref(), other.lower.as_ref());
        let upper = tighter_upper(self.upper.as_ref(), other.upper.as_ref());
        !window_is_empty(lower, upper)
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return f.write_str("*");
        }
        if self.is_exact() {
            if let Some(ref lower) = self.lower {
                return write!(f, "[{}]", lower.version);
            }
        }
        match &self.lower {
            Some(b) => write!(f, "{}{}", if b.inclusive { '[' } else { '(' }, b.version)?,
            None => f.write_str("(")?,
        }
        f.write_str(",")?;
        match &self.upper {
            Some(b) => write!(f, "{}{}", b.version, if b.inclusive { ']' } else { ')' }),
            None => f.write_str(")"),
        }
    }
}

fn window_is_empty(lower: Option<&Bound>, upper: Option<&Bound>) -> bool {
    match (lower, upper) {
        (Some(l), Some(u)) => match l.version.cmp(&u.version) {
            Ordering::Greater => true,
            Ordering::Equal => !(l.inclusive && u.inclusive),
            Ordering::Less => false,
        },
        _ => false,
    }
}

fn tighter_lower<'a>(a: Option<&'a Bound>, b: Option<&'a Bound>) -> Option<&'a Bound> {
    match (a, b) {
        (None, x) | (x, None) => x,
        (Some(a), Some(b)) => match a.version.cmp(&b.version) {
            Ordering::Greater => Some(a),
            Ordering::Less => Some(b),
            Ordering::Equal if a.inclusive => Some(b),
            Ordering::Equal => Some(a),
        },
    }
}

fn tighter_upper<'a>(a: Option<&'a Bound>, b: Option<&'a Bound>) -> Option<&'a Bound> {
    match (a, b) {
        (None, x) | (x, None) => x,
        (Some(a), Some(b)) => match a.version.cmp(&b.version) {
            Ordering::Less => Some(a),
            Ordering::Greater => Some(b),
            Ordering::Equal if a.inclusive => Some(b),
            Ordering::Equal => Some(a),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn missing_components_are_zero() {
        assert_eq!(v("1"), v("1.0.0"));
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("2.1").to_string(), "2.1.0");
    }

    #[test]
    fn three_part_ordering() {
        assert!(v("1.0.0") < v("1.0.1"));
        assert!(v("1.0.1") < v("1.1.0"));
        assert!(v("1.9.9") < v("2.0"));
        assert!(v("1.10") > v("1.9"));
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["", "1.", ".1", "1.0.0.0", "1.x", "-1", "1.0-beta"] {
            assert!(Version::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn version_range_inclusive() {
        let range = VersionRange::parse("[1.0,2.0]").unwrap();
        assert!(range.contains(&v("1.0")));
        assert!(range.contains(&v("1.5")));
        assert!(range.contains(&v("2.0")));
        assert!(!range.contains(&v("0.9")));
        assert!(!range.contains(&v("2.1")));
    }

    #[test]
    fn version_range_exclusive_upper() {
        let range = VersionRange::parse("[1.0,2.0)").unwrap();
        assert!(range.contains(&v("1.0")));
        assert!(range.contains(&v("1.9.9")));
        assert!(!range.contains(&v("2.0")));
    }

    #[test]
    fn version_range_open_sides() {
        let below = VersionRange::parse("(,2.0)").unwrap();
        assert!(below.contains(&v("0.0.1")));
        assert!(!below.contains(&v("2.0")));

        let above = VersionRange::parse("[1.2,)").unwrap();
        assert!(above.contains(&v("99")));
        assert!(!above.contains(&v("1.1")));
    }

    #[test]
    fn exact_forms() {
        let bracketed = VersionRange::parse("[1.5]").unwrap();
        let bare = VersionRange::parse("1.5").unwrap();
        assert_eq!(bracketed, bare);
        assert!(bare.is_exact());
        assert!(bare.contains(&v("1.5.0")));
        assert!(!bare.contains(&v("1.5.1")));
    }

    #[test]
    fn star_is_any() {
        let range = VersionRange::parse("*").unwrap();
        assert!(range.is_any());
        assert!(range.contains(&v("0")));
    }

    #[test]
    fn inverted_bounds_rejected() {
        let err = VersionRange::parse("[2.0,1.0]").unwrap_err();
        assert!(matches!(err, VersionError::BoundsInverted { .. }));

        let err = VersionRange::between(Some(v("3")), Some(v("2"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "maximum version 2.0.0 may not be lower than minimum version 3.0.0"
        );
    }

    #[test]
    fn empty_half_open_window_rejected() {
        assert!(VersionRange::parse("[1.0,1.0)").is_err());
        assert!(VersionRange::parse("[1.0,1.0]").is_ok());
    }

    #[test]
    fn malformed_ranges() {
        assert!(VersionRange::parse("[1.0,2.0").is_err());
        assert!(VersionRange::parse("[1.0,2.0,3.0]").is_err());
        assert!(VersionRange::parse("(1.0)").is_err());
    }

    #[test]
    fn intersection() {
        let a = VersionRange::parse("[1.0,2.0)").unwrap();
        let b = VersionRange::parse("[1.5,3.0]").unwrap();
        let c = VersionRange::parse("[2.0,3.0]").unwrap();
        let d = VersionRange::parse("[2.0]").unwrap();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(c.intersects(&d));
        assert!(VersionRange::any().intersects(&a));
    }

    #[test]
    fn display_round_trips() {
        for spec in ["[1.0.0,2.0.0)", "(,2.0.0]", "[1.0.0,)", "[1.5.0]", "*"] {
            let range = VersionRange::parse(spec).unwrap();
            assert_eq!(range.to_string(), spec);
        }
    }
}
