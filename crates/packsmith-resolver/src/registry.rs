//! Published packs, keyed by identifier.

use std::collections::BTreeMap;
use std::sync::Arc;

use packsmith_core::identifier::{Identifier, PackName};
use packsmith_core::package::Package;

/// The set of resolved and compiled packs available as dependencies.
///
/// Published packs are frozen: they are only ever handed out behind `Arc`.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    packs: BTreeMap<Identifier, Arc<Package>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a pack. Returns false (and keeps the existing entry) if the
    /// identifier is already present.
    pub fn publish(&mut self, package: Arc<Package>) -> bool {
        let id = package.identifier().clone();
        if self.packs.contains_key(&id) {
            return false;
        }
        tracing::debug!("published {id}");
        self.packs.insert(id, package);
        true
    }

    pub fn get(&self, identifier: &Identifier) -> Option<&Arc<Package>> {
        self.packs.get(identifier)
    }

    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.packs.contains_key(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.packs.keys()
    }

    pub fn packages(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.packs.values()
    }

    /// Every published version of one pack line, lowest first.
    pub fn versions_of<'a>(&'a self, name: &'a PackName) -> impl Iterator<Item = &'a Identifier> + 'a {
        self.packs.keys().filter(move |id| id.name() == name)
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}
