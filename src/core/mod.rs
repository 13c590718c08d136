//! Core data structures for Quay.
//!
//! This module contains the input side of build planning:
//! - Packages with their language-version declarations
//! - Targets and their source composition
//! - Products and their kinds
//! - The validated package graph and its description file

pub mod graph;
pub mod manifest;
pub mod package;
pub mod product;
pub mod target;

pub use graph::{GraphError, PackageGraph, PackageId, ProductId, TargetId};
pub use manifest::{GraphManifest, GRAPH_MANIFEST_NAME};
pub use package::Package;
pub use product::{Product, ProductKind};
pub use target::{Dependency, SourceComposition, SourceLanguage, Sources, Target};
