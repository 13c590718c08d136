//! Quay - build-plan synthesis for Swift packages with C-family targets
//!
//! This crate turns a resolved package graph and a toolchain description into
//! exact, reproducible compiler and linker invocations. Execution of those
//! invocations is left to the caller.

pub mod builder;
pub mod core;
pub mod util;

/// Test utilities for Quay unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildParameters, BuildPlan, BuildPlanError, Configuration, ToolchainDescriptor};
pub use core::{GraphError, GraphManifest, PackageGraph};
