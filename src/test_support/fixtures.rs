//! Test fixtures for common planning scenarios.

use std::fs;
use std::path::Path;

use crate::builder::context::{BuildParameters, Configuration};
use crate::builder::toolchain::{Platform, ToolchainDescriptor};
use crate::core::{Package, PackageGraph, Product, ProductKind, Sources, Target};

/// Data path used by every fixture.
pub const DATA_PATH: &str = "/path/to/build";

/// Toolchain with fake driver paths, implementing language version 4.
pub fn toolchain() -> ToolchainDescriptor {
    ToolchainDescriptor::new("/fake/swiftc", "/fake/clang", 4)
}

/// Linux parameters with eight jobs and no user flags.
pub fn params(configuration: Configuration) -> BuildParameters {
    BuildParameters::new(DATA_PATH, configuration, toolchain())
        .with_platform(Platform::Linux)
        .with_jobs(8)
}

/// A Swift target with a single source file.
pub fn swift_target(name: &str, package: &str, file: &str) -> Target {
    Target::new(name, package, Sources::new(format!("/pkg/Sources/{name}"), [file]))
}

/// A C target rooted under `root`.
pub fn c_target(name: &str, package: &str, root: &Path, file: &str) -> Target {
    Target::new(name, package, Sources::new(root, [file]))
}

/// `exe` (main.swift) depending on `lib` (lib.swift), vended as executable `exe`.
pub fn exe_and_lib() -> PackageGraph {
    PackageGraph::new(
        vec![Package::new("root")],
        vec![
            swift_target("exe", "root", "main.swift").depends_on("lib"),
            swift_target("lib", "root", "lib.swift"),
        ],
        vec![Product::new("exe", ProductKind::Executable, ["exe"])],
    )
    .unwrap()
}

/// Create empty files under `dir`, with parent directories.
pub fn touch_all(dir: &Path, files: &[&str]) {
    for file in files {
        let path = dir.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
    }
}
