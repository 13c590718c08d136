//! Packages and their declared language-version compatibility.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A resolved package in the build graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name
    pub name: String,

    /// Managed-language major versions this package accepts.
    ///
    /// `None` means the package builds with any toolchain version.
    #[serde(default)]
    pub language_versions: Option<BTreeSet<u32>>,
}

impl Package {
    /// Create a package that accepts any language version.
    pub fn new(name: impl Into<String>) -> Self {
        Package {
            name: name.into(),
            language_versions: None,
        }
    }

    /// Restrict the package to the given language versions.
    pub fn with_language_versions(mut self, versions: impl IntoIterator<Item = u32>) -> Self {
        self.language_versions = Some(versions.into_iter().collect());
        self
    }

    /// Check whether the package can be built by a toolchain at `current`.
    pub fn supports(&self, current: u32) -> bool {
        match &self.language_versions {
            None => true,
            Some(versions) => versions.contains(&current),
        }
    }
}
