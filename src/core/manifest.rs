//! Graph description file (`Quay.graph.toml`).
//!
//! The resolver hands over its result as a TOML file listing packages,
//! targets and products. Paths are relative to the file's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::target::Dependency;
use crate::core::{Package, PackageGraph, Product, ProductKind, Sources, Target};

/// Default file name of a graph description.
pub const GRAPH_MANIFEST_NAME: &str = "Quay.graph.toml";

/// Parsed graph description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphManifest {
    /// Packages; the first is the root
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageEntry>,

    /// Targets
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetEntry>,

    /// Products
    #[serde(default, rename = "product")]
    pub products: Vec<ProductEntry>,
}

/// `[[package]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageEntry {
    pub name: String,

    /// Accepted language major versions (absent = any)
    #[serde(default)]
    pub language_versions: Option<Vec<u32>>,
}

/// `[[target]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetEntry {
    pub name: String,
    pub package: String,

    /// Source root (default: `Sources/<name>`)
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Source files relative to the root
    pub sources: Vec<PathBuf>,

    /// Public headers directory relative to the root
    #[serde(default)]
    pub include: Option<PathBuf>,

    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
}

/// A dependency: a bare target name or `{ product = "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyEntry {
    Target(String),
    Product { product: String },
}

/// `[[product]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductEntry {
    pub name: String,
    pub kind: ProductKind,
    pub targets: Vec<String>,
}

impl GraphManifest {
    /// Load a graph description from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read graph description: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("failed to parse graph description: {}", path.display()))
    }

    /// Parse graph description content.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Convert into a validated graph, resolving source roots against `base`.
    pub fn into_graph(self, base: &Path) -> Result<PackageGraph> {
        let packages = self
            .packages
            .into_iter()
            .map(|p| Package {
                name: p.name,
                language_versions: p.language_versions.map(|v| v.into_iter().collect()),
            })
            .collect();

        let targets = self
            .targets
            .into_iter()
            .map(|t| {
                let root = t
                    .root
                    .unwrap_or_else(|| Path::new("Sources").join(&t.name));

                Target {
                    sources: Sources::new(base.join(root), t.sources),
                    public_include_dir: t.include,
                    dependencies: t
                        .dependencies
                        .into_iter()
                        .map(|d| match d {
                            DependencyEntry::Target(name) => Dependency::Target(name),
                            DependencyEntry::Product { product } => Dependency::Product(product),
                        })
                        .collect(),
                    name: t.name,
                    package: t.package,
                }
            })
            .collect();

        let products = self
            .products
            .into_iter()
            .map(|p| Product::new(p.name, p.kind, p.targets))
            .collect();

        Ok(PackageGraph::new(packages, targets, products)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[package]]
name = "root"
language-versions = [4, 5]

[[package]]
name = "dep"

[[target]]
name = "exe"
package = "root"
sources = ["main.swift"]
dependencies = ["clib", { product = "Dep" }]

[[target]]
name = "clib"
package = "root"
root = "Sources/clib"
sources = ["clib.c"]
include = "include"

[[target]]
name = "deplib"
package = "dep"
root = "/deps/dep/Sources/deplib"
sources = ["deplib.swift"]

[[product]]
name = "exe"
kind = "executable"
targets = ["exe"]

[[product]]
name = "Dep"
kind = "dynamic-library"
targets = ["deplib"]
"#;

    #[test]
    fn test_parse_and_convert() {
        let manifest = GraphManifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.packages.len(), 2);
        assert_eq!(manifest.targets.len(), 3);
        assert_eq!(manifest.products.len(), 2);

        let graph = manifest.into_graph(Path::new("/work")).unwrap();
        assert_eq!(
            graph.root_package().language_versions,
            Some([4, 5].into_iter().collect())
        );

        let exe = graph.target(graph.target_id("exe").unwrap());
        assert_eq!(exe.sources.root, PathBuf::from("/work/Sources/exe"));
        assert_eq!(
            exe.dependencies,
            vec![
                Dependency::Target("clib".to_string()),
                Dependency::Product("Dep".to_string())
            ]
        );

        let clib = graph.target(graph.target_id("clib").unwrap());
        assert_eq!(
            clib.include_dir(),
            Some(PathBuf::from("/work/Sources/clib/include"))
        );

        let deplib = graph.target(graph.target_id("deplib").unwrap());
        assert_eq!(deplib.sources.root, PathBuf::from("/deps/dep/Sources/deplib"));
    }

    #[test]
    fn test_invalid_graph_is_rejected() {
        let manifest = GraphManifest::parse(
            r#"
[[package]]
name = "root"

[[target]]
name = "exe"
package = "root"
sources = ["main.swift"]
dependencies = ["nope"]
"#,
        )
        .unwrap();

        let err = manifest.into_graph(Path::new("/work")).unwrap_err();
        assert!(err.to_string().contains("unknown target `nope`"));
    }

    #[test]
    fn test_unknown_product_kind() {
        let result = GraphManifest::parse(
            r#"
[[product]]
name = "x"
kind = "framework"
targets = ["x"]
"#,
        );
        assert!(result.is_err());
    }
}
