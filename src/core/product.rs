//! Products: the linked artifacts a package vends.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of linked artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductKind {
    /// Executable program
    Executable,
    /// Static library (.a)
    StaticLibrary,
    /// Shared library (.so/.dylib)
    DynamicLibrary,
    /// Test bundle
    TestBundle,
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKind::Executable => write!(f, "executable"),
            ProductKind::StaticLibrary => write!(f, "static-library"),
            ProductKind::DynamicLibrary => write!(f, "dynamic-library"),
            ProductKind::TestBundle => write!(f, "test-bundle"),
        }
    }
}

/// A product built from one or more targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product name (unique across the graph)
    pub name: String,

    /// What gets linked
    pub kind: ProductKind,

    /// Constituent target names, in declaration order
    pub targets: Vec<String>,
}

impl Product {
    /// Create a new product.
    pub fn new(
        name: impl Into<String>,
        kind: ProductKind,
        targets: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Product {
            name: name.into(),
            kind,
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether dependents link against this product instead of embedding it.
    pub fn is_dynamic(&self) -> bool {
        self.kind == ProductKind::DynamicLibrary
    }
}
