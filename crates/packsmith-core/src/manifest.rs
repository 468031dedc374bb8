use serde::{Deserialize, Serialize};
use std::path::Path;

use packsmith_util::errors::PacksmithError;

use crate::dependency::Requirement;
use crate::identifier::{Identifier, PackName};
use crate::package::{PackInfo, Package};
use crate::version::{Version, VersionRange};

/// File name of a pack manifest inside a pack directory.
pub const MANIFEST_FILE: &str = "pack.toml";

/// The parsed representation of a `pack.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackManifest {
    pub pack: PackSection,

    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
}

/// Pack identity and metadata from the `[pack]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackSection {
    pub identifier: String,
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

/// One `[[dependencies]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub identifier: String,
    #[serde(default)]
    pub version: Option<VersionSpec>,
}

/// A dependency version: a string (exact, `*`, or interval notation) or an
/// inclusive `{ min, max }` table where either side may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionSpec {
    Text(String),
    Window {
        #[serde(default)]
        min: Option<String>,
        #[serde(default)]
        max: Option<String>,
    },
}

impl VersionSpec {
    pub fn to_range(&self) -> Result<VersionRange, crate::version::VersionError> {
        match self {
            VersionSpec::Text(spec) => VersionRange::parse(spec),
            VersionSpec::Window { min, max } => {
                let min = min.as_deref().map(Version::parse).transpose()?;
                let max = max.as_deref().map(Version::parse).transpose()?;
                VersionRange::between(min, max)
            }
        }
    }
}

impl PackManifest {
    /// Parse a manifest from a TOML string.
    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            PacksmithError::Manifest {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load and parse a `pack.toml` file.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        read_manifest(path).map(|(manifest, _)| manifest)
    }

    pub fn identifier(&self) -> miette::Result<Identifier> {
        let name = PackName::parse(&self.pack.identifier).map_err(manifest_error)?;
        let version = Version::parse(&self.pack.version).map_err(manifest_error)?;
        Ok(name.at(version))
    }

    /// Build an unresolved [`Package`] from this manifest.
    pub fn to_package(&self) -> miette::Result<Package> {
        let identifier = self.identifier()?;

        let mut requirements = Vec::with_capacity(self.dependencies.len());
        for entry in &self.dependencies {
            let name = PackName::parse(&entry.identifier).map_err(|e| {
                manifest_error(format!("{identifier}: dependency {}", e))
            })?;
            let range = match &entry.version {
                Some(spec) => spec.to_range().map_err(|e| {
                    manifest_error(format!("{identifier}: dependency on {name}: {e}"))
                })?,
                None => VersionRange::any(),
            };
            requirements.push(Requirement::new(name, range));
        }

        let package = Package::new(identifier, requirements).map_err(manifest_error)?;
        Ok(package.with_info(PackInfo {
            display_name: self.pack.name.clone(),
            description: self.pack.description.clone(),
            authors: self.pack.authors.clone(),
            root: None,
            checksum: None,
        }))
    }
}

fn manifest_error(e: impl std::fmt::Display) -> PacksmithError {
    PacksmithError::Manifest {
        message: e.to_string(),
    }
}

/// Load the pack in `dir`, recording where it came from and a checksum of
/// its manifest.
pub fn load_pack(dir: &Path) -> miette::Result<Package> {
    let (manifest, content) = read_manifest(&dir.join(MANIFEST_FILE))?;
    let package = manifest.to_package()?;

    let mut info = package.info().clone();
    info.root = Some(dir.to_path_buf());
    info.checksum = Some(packsmith_util::hash::manifest_checksum(&content));
    Ok(package.with_info(info))
}

/// Read and parse a manifest, keeping the raw text for checksumming.
fn read_manifest(path: &Path) -> miette::Result<(PackManifest, String)> {
    let content = std::fs::read_to_string(path).map_err(|e| PacksmithError::Manifest {
        message: format!("Failed to read {}: {e}", path.display()),
    })?;
    let manifest = toml::from_str(&content).map_err(|e| PacksmithError::Manifest {
        message: format!("Failed to parse {}: {e}", path.display()),
    })?;
    Ok((manifest, content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_spec_forms() {
        let exact = VersionSpec::Text("1.0".to_string()).to_range().unwrap();
        assert!(exact.is_exact());

        let window = VersionSpec::Window {
            min: Some("1.0".to_string()),
            max: None,
        }
        .to_range()
        .unwrap();
        assert_eq!(window.to_string(), "[1.0.0,)");

        let inverted = VersionSpec::Window {
            min: Some("2.0".to_string()),
            max: Some("1.0".to_string()),
        };
        assert!(inverted.to_range().is_err());
    }
}
