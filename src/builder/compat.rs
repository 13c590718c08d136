//! Language-version compatibility checking.
//!
//! Runs before any description is synthesized. Packages are visited root
//! first, then breadth-first along package dependencies (ties in input
//! order); the first package that rejects the toolchain's version aborts
//! planning and is reported under its own name.

use crate::builder::errors::BuildPlanError;
use crate::core::{PackageGraph, PackageId};

/// Validates every package against the toolchain's language version.
pub struct CompatibilityChecker<'a> {
    graph: &'a PackageGraph,
    current: u32,
}

impl<'a> CompatibilityChecker<'a> {
    /// Create a checker for `current`, the toolchain's major version.
    pub fn new(graph: &'a PackageGraph, current: u32) -> Self {
        CompatibilityChecker { graph, current }
    }

    /// The order in which packages are checked.
    pub fn order(&self) -> Vec<PackageId> {
        self.graph.packages_root_first()
    }

    /// Check every package, stopping at the first incompatible one.
    pub fn check(&self) -> Result<(), BuildPlanError> {
        for pkg_id in self.order() {
            let package = self.graph.package(pkg_id);

            if package.supports(self.current) {
                continue;
            }

            tracing::debug!(
                "package {} rejects language version {}",
                package.name,
                self.current
            );

            return Err(BuildPlanError::IncompatibleVersion {
                package: package.name.clone(),
                required: package.language_versions.clone().unwrap_or_default(),
                current: self.current,
            });
        }

        Ok(())
    }
}
