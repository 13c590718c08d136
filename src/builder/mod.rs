//! Build planning.
//!
//! This module turns a validated [`PackageGraph`](crate::core::PackageGraph)
//! and [`BuildParameters`] into a [`BuildPlan`]: compile arguments for every
//! target and link arguments for every product. Nothing here runs a compiler.

pub mod compat;
pub mod context;
pub mod errors;
pub mod module_map;
pub mod plan;
pub mod product;
pub mod target;
pub mod toolchain;

pub use compat::CompatibilityChecker;
pub use context::{BuildFlags, BuildParameters, Configuration};
pub use errors::BuildPlanError;
pub use module_map::{HeaderLayout, ModuleMap};
pub use plan::BuildPlan;
pub use product::ProductDescription;
pub use target::{
    CompileUnit, ManagedTargetDescription, NativeTargetDescription, TargetDescription,
};
pub use toolchain::{Platform, PlatformTraits, ToolchainDescriptor};
