//! End-to-end planning tests through the public library API.
//!
//! Graphs are loaded from TOML descriptions on disk so that header probing
//! sees real directories.

use std::fs;
use std::path::{Path, PathBuf};

use quay::builder::toolchain::Platform;
use quay::builder::{BuildParameters, BuildPlan, BuildPlanError, Configuration, TargetDescription};
use quay::core::GraphManifest;
use quay::ToolchainDescriptor;
use tempfile::TempDir;

const GRAPH: &str = r#"
[[package]]
name = "app"

[[package]]
name = "vendor"
language-versions = [4, 5]

[[target]]
name = "App"
package = "app"
sources = ["main.swift", "Bridge.mm"]
dependencies = ["Core", { product = "Net" }]

[[target]]
name = "Core"
package = "app"
sources = ["core.swift"]
dependencies = ["CHelpers"]

[[target]]
name = "CHelpers"
package = "app"
sources = ["helpers.c"]
include = "include"
dependencies = ["CVendor"]

[[target]]
name = "CVendor"
package = "vendor"
root = "Vendor/CVendor"
sources = ["vendor.c"]
include = "include"

[[target]]
name = "Net"
package = "vendor"
root = "Vendor/Net"
sources = ["net.swift"]

[[product]]
name = "App"
kind = "executable"
targets = ["App"]

[[product]]
name = "Net"
kind = "dynamic-library"
targets = ["Net"]

[[product]]
name = "AppTests"
kind = "test-bundle"
targets = ["Core"]
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "Quay.graph.toml", GRAPH);
    write(tmp.path(), "Sources/CHelpers/include/CHelpers.h", "");
    write(tmp.path(), "Vendor/CVendor/include/vendor/api.h", "");
    tmp
}

fn plan(tmp: &TempDir, configuration: Configuration, platform: Platform) -> BuildPlan {
    let graph = GraphManifest::load(&tmp.path().join("Quay.graph.toml"))
        .unwrap()
        .into_graph(tmp.path())
        .unwrap();

    let params = BuildParameters::new(
        tmp.path().join(".build"),
        configuration,
        ToolchainDescriptor::new("/usr/bin/swiftc", "/usr/bin/clang", 5),
    )
    .with_platform(platform)
    .with_jobs(4);

    BuildPlan::new(&params, &graph).unwrap()
}

#[test]
fn test_counts_and_variants() {
    let tmp = project();
    let plan = plan(&tmp, Configuration::Debug, Platform::Linux);

    assert_eq!(plan.target_count(), 5);
    assert_eq!(plan.product_count(), 3);

    let variants: Vec<(&str, bool)> = plan
        .targets()
        .map(|t| (t.name(), matches!(t, TargetDescription::Managed(_))))
        .collect();
    assert_eq!(
        variants,
        [
            ("App", true),
            ("Core", true),
            ("CHelpers", false),
            ("CVendor", false),
            ("Net", true),
        ]
    );
}

#[test]
fn test_module_maps_propagate_transitively() {
    let tmp = project();
    let plan = plan(&tmp, Configuration::Debug, Platform::Linux);
    let build = tmp.path().join(".build/debug");

    for name in ["CHelpers", "CVendor"] {
        let map = plan.target_description(name).unwrap().module_map().unwrap();
        assert_eq!(
            map.path,
            build.join(format!("{}.build", name)).join("module.modulemap")
        );
    }

    // App reaches both C targets through Core
    let app = plan.target_description("App").unwrap();
    let bridged = app
        .compile_arguments()
        .iter()
        .filter(|a| a.starts_with("-fmodule-map-file="))
        .count();
    assert_eq!(bridged, 2);
}

#[test]
fn test_native_include_visibility() {
    let tmp = project();
    let plan = plan(&tmp, Configuration::Debug, Platform::Linux);

    let args = plan.target_description("CHelpers").unwrap().compile_arguments();
    let own = tmp.path().join("Sources/CHelpers/include").display().to_string();
    let vendor = tmp.path().join("Vendor/CVendor/include").display().to_string();

    let own_pos = args.iter().position(|a| *a == own).unwrap();
    assert_eq!(args[own_pos - 1], "-I");

    // Other package's headers are a regular include
    let vendor_pos = args.iter().position(|a| *a == vendor).unwrap();
    assert_eq!(args[vendor_pos - 1], "-I");
    assert!(own_pos < vendor_pos);
    assert!(!args.iter().any(|a| a == "-fobjc-arc"));
}

#[test]
fn test_executable_links_dynamic_dependency() {
    let tmp = project();
    let plan = plan(&tmp, Configuration::Debug, Platform::Darwin);

    let net = plan.product_description("Net").unwrap();
    assert_eq!(
        net.output,
        tmp.path().join(".build/debug/libNet.dylib")
    );

    let app = plan.product_description("App").unwrap();
    assert_eq!(app.linked_targets, ["App", "Core", "CHelpers", "CVendor"]);
    assert_eq!(app.dynamic_libraries, ["Net"]);
    assert!(app.link_arguments.iter().any(|a| a == "-lNet"));
    assert!(!app.objects.iter().any(|o| o.to_string_lossy().contains("Net.build")));

    // Bridge.mm is Objective-C++
    assert!(app.link_arguments.iter().any(|a| a == "-lc++"));
}

#[test]
fn test_test_bundle_layouts() {
    let tmp = project();
    let build = tmp.path().join(".build/release");

    let linux = plan(&tmp, Configuration::Release, Platform::Linux);
    let bundle = linux.product_description("AppTests").unwrap();
    assert_eq!(bundle.output, build.join("AppTests.xctest"));
    assert_eq!(
        bundle.link_arguments.last().map(PathBuf::from),
        Some(build.join("AppTests.product/test-driver.o"))
    );

    let darwin = plan(&tmp, Configuration::Release, Platform::Darwin);
    let bundle = darwin.product_description("AppTests").unwrap();
    assert_eq!(
        bundle.output,
        build.join("AppTests.xctest/Contents/MacOS/AppTests")
    );
}

#[test]
fn test_identical_inputs_identical_plans() {
    let tmp = project();
    let a = serde_json::to_string(&plan(&tmp, Configuration::Debug, Platform::Linux)).unwrap();
    let b = serde_json::to_string(&plan(&tmp, Configuration::Debug, Platform::Linux)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_dependency_version_mismatch() {
    let tmp = project();
    let graph = GraphManifest::load(&tmp.path().join("Quay.graph.toml"))
        .unwrap()
        .into_graph(tmp.path())
        .unwrap();

    let params = BuildParameters::new(
        tmp.path().join(".build"),
        Configuration::Debug,
        ToolchainDescriptor::new("/usr/bin/swiftc", "/usr/bin/clang", 3),
    );

    match BuildPlan::new(&params, &graph) {
        Err(BuildPlanError::IncompatibleVersion {
            package, current, ..
        }) => {
            assert_eq!(package, "vendor");
            assert_eq!(current, 3);
        }
        other => panic!("unexpected result: {:?}", other.map(|p| p.target_count())),
    }

    // Nothing was written by the failed attempt
    assert!(!tmp.path().join(".build").exists());
}
