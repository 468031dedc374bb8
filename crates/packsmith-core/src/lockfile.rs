use serde::{Deserialize, Serialize};
use std::path::Path;

use packsmith_util::errors::PacksmithError;

/// Deterministic record of every compiled pack and the versions it resolved to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lockfile {
    #[serde(default)]
    pub pack: Vec<LockedPack>,
}

/// A single compiled pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPack {
    pub identifier: String,
    pub version: String,
    #[serde(default)]
    pub checksum: Option<String>,
    /// Compile-order key; dependencies always carry a smaller value.
    #[serde(rename = "dependency-count")]
    pub dependency_count: u64,
    #[serde(default)]
    pub dependencies: Vec<LockedDependency>,
}

/// The versions a pack may use for one referenced pack line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedDependency {
    pub identifier: String,
    /// Highest acceptable version.
    pub selected: String,
    /// Every acceptable version, highest first.
    #[serde(default)]
    pub acceptable: Vec<String>,
}

impl Lockfile {
    /// Load and parse a `Packsmith.lock` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PacksmithError::Generic {
            message: format!("Failed to read lockfile: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| {
            PacksmithError::Generic {
                message: format!("Failed to parse lockfile: {e}"),
            }
            .into()
        })
    }

    /// Serialize the lockfile to a pretty-printed TOML string.
    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn write_to(&self, path: &Path) -> miette::Result<()> {
        let content = self.to_string_pretty().map_err(|e| PacksmithError::Generic {
            message: format!("Failed to serialize lockfile: {e}"),
        })?;
        packsmith_util::fs::write_file(path, &content).map_err(PacksmithError::Io)?;
        Ok(())
    }

    /// Find a locked pack by `namespace:name` and version.
    pub fn find(&self, identifier: &str, version: &str) -> Option<&LockedPack> {
        self.pack
            .iter()
            .find(|p| p.identifier == identifier && p.version == version)
    }
}
