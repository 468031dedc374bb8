//! Collected resolution and compilation failures.

use std::fmt;

use packsmith_core::identifier::Identifier;

use crate::error::ResolveError;

/// Every pack discarded during a run, with the reason.
#[derive(Debug, Default, Clone)]
pub struct FailureReport {
    pub failures: Vec<ResolveError>,
}

impl FailureReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, failure: ResolveError) {
        self.failures.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolveError> {
        self.failures.iter()
    }

    /// Failures recorded against one pack.
    pub fn for_package<'a, 'b>(
        &'a self,
        identifier: &'b Identifier,
    ) -> impl Iterator<Item = &'a ResolveError> + 'b
    where
        'a: 'b,
    {
        self.failures
            .iter()
            .filter(move |f| f.package() == identifier)
    }

    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.for_package(identifier).next().is_some()
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "No failures.");
        }
        writeln!(f, "Discarded packs ({}):", self.failures.len())?;
        for failure in &self.failures {
            writeln!(f, "  [{}] {}", failure.kind(), failure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report() {
        let report = FailureReport::new();
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
        assert_eq!(report.to_string(), "No failures.");
    }

    #[test]
    fn report_with_failures() {
        let dup = Identifier::parse("mod:a@1.0").unwrap();
        let other = Identifier::parse("mod:b@1.0").unwrap();
        let mut report = FailureReport::new();
        report.add(ResolveError::DuplicateIdentifier {
            identifier: dup.clone(),
        });
        assert_eq!(report.len(), 1);
        assert!(report.contains(&dup));
        assert!(!report.contains(&other));
        let s = report.to_string();
        assert!(s.contains("Discarded packs (1)"));
        assert!(s.contains("[duplicate-identifier] 'mod:a@1.0.0' is a duplicate identifier"));
    }
}
