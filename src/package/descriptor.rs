//! Package descriptors: a dependency name, the version it should be at, and its scope.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Which dependency set of the manifest a package belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageKind {
    #[serde(rename = "dependencies")]
    Runtime,
    #[serde(rename = "devDependencies")]
    Development,
}

/// A dependency found at the wrong version, with the version or range it should be at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    #[serde(rename = "packageName")]
    pub name: String,
    pub expected_version_or_range: String,
    #[serde(rename = "packageType")]
    pub kind: PackageKind,
}

impl PackageDescriptor {
    pub fn new(
        name: impl Into<String>,
        expected_version_or_range: impl Into<String>,
        kind: PackageKind,
    ) -> Self {
        Self {
            name: name.into(),
            expected_version_or_range: expected_version_or_range.into(),
            kind,
        }
    }

    /// Parse a `name@range` spec. Scoped names (`@scope/name@range`) keep their leading `@`.
    pub fn parse(spec: &str, kind: PackageKind) -> Result<Self> {
        let at_pos = spec
            .rfind('@')
            .filter(|&pos| pos > 0)
            .ok_or_else(|| anyhow!("Invalid package '{}'. Expected 'name@version'.", spec))?;

        let (name, version) = spec.split_at(at_pos);
        let version = &version[1..]; // Skip the @
        if version.is_empty() {
            return Err(anyhow!(
                "Invalid package '{}': version after @ cannot be empty.",
                spec
            ));
        }

        Ok(Self::new(name, version, kind))
    }

    /// The `name@range` token handed to the package manager.
    pub fn versioned_spec(&self) -> String {
        format!("{}@{}", self.name, self.expected_version_or_range)
    }
}

impl std::fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.versioned_spec())
    }
}

/// Read a JSON array of descriptors, as produced by the version validation step.
pub fn parse_descriptors_json(json: &str) -> Result<Vec<PackageDescriptor>> {
    serde_json::from_str(json).context("Failed to parse package list")
}
