//! CLI integration tests for Quay.
//!
//! These tests drive the `quay` binary against graph descriptions written to
//! temporary directories.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const GRAPH: &str = r#"
[[package]]
name = "root"

[[target]]
name = "exe"
package = "root"
sources = ["main.swift"]
dependencies = ["lib", "CLib"]

[[target]]
name = "lib"
package = "root"
sources = ["lib.swift"]

[[target]]
name = "CLib"
package = "root"
sources = ["clib.c"]
include = "include"

[[product]]
name = "exe"
kind = "executable"
targets = ["exe"]
"#;

/// Get the quay binary command, isolated from the user's global config.
fn quay(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("quay").unwrap();
    cmd.env("HOME", home)
        .env_remove("QUAY_GRAPH")
        .env_remove("QUAY_SWIFTC")
        .env_remove("QUAY_CLANG");
    cmd
}

/// Create a project with the standard graph and CLib's public header.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("Quay.graph.toml"), GRAPH).unwrap();

    let include = tmp.path().join("Sources/CLib/include");
    fs::create_dir_all(&include).unwrap();
    fs::write(include.join("CLib.h"), "int clib(void);\n").unwrap();

    tmp
}

// ============================================================================
// quay plan
// ============================================================================

#[test]
fn test_plan_prints_json() {
    let tmp = project();

    let output = quay(tmp.path())
        .args(["plan", "--platform", "linux", "--jobs", "4"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["targets"].as_array().unwrap().len(), 3);
    assert_eq!(plan["products"].as_array().unwrap().len(), 1);
    assert_eq!(plan["build_order"][2], "exe");
}

#[test]
fn test_plan_summary() {
    let tmp = project();

    quay(tmp.path())
        .args(["plan", "--summary", "--release"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3 targets, 1 products (release)"));
}

#[test]
fn test_plan_with_explicit_graph_path() {
    let tmp = project();
    let elsewhere = TempDir::new().unwrap();

    quay(tmp.path())
        .args(["plan", "--summary", "--graph"])
        .arg(tmp.path().join("Quay.graph.toml"))
        .current_dir(elsewhere.path())
        .assert()
        .success();
}

#[test]
fn test_plan_writes_side_outputs() {
    let tmp = project();
    let db = tmp.path().join("compile_commands.json");

    quay(tmp.path())
        .args(["plan", "--summary", "--write-module-maps", "--emit-compile-commands"])
        .arg(&db)
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp
        .path()
        .join(".build/debug/CLib.build/module.modulemap")
        .exists());

    let content = fs::read_to_string(&db).unwrap();
    assert!(content.contains("clib.c"));
}

#[test]
fn test_plan_missing_graph() {
    let tmp = TempDir::new().unwrap();

    quay(tmp.path())
        .arg("plan")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find graph description"));
}

#[test]
fn test_plan_incompatible_version() {
    let tmp = project();
    let graph = GRAPH.replace(
        "name = \"root\"\n",
        "name = \"root\"\nlanguage-versions = [3, 5]\n",
    );
    fs::write(tmp.path().join("Quay.graph.toml"), graph).unwrap();

    quay(tmp.path())
        .args(["plan", "--language-version", "4", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error: package `root` is not compatible with language version 4",
        ))
        .stderr(predicate::str::contains("[3, 5]"));
}

#[test]
fn test_plan_graph_cycle() {
    let tmp = project();
    let graph = GRAPH.replace(
        "sources = [\"lib.swift\"]\n",
        "sources = [\"lib.swift\"]\ndependencies = [\"exe\"]\n",
    );
    fs::write(tmp.path().join("Quay.graph.toml"), graph).unwrap();

    quay(tmp.path())
        .args(["plan", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle detected"));
}

#[test]
fn test_plan_help_documents_host_defaults() {
    let tmp = TempDir::new().unwrap();

    quay(tmp.path())
        .args(["plan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("available parallelism"))
        .stdout(predicate::str::contains("defaults to the host"));
}

// ============================================================================
// quay flags
// ============================================================================

#[test]
fn test_flags_managed_target() {
    let tmp = project();

    quay(tmp.path())
        .args(["flags", "exe", "--platform", "linux", "--jobs", "2", "--swiftc", "/opt/swiftc"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(managed, module exe)"))
        .stdout(predicate::str::contains("/opt/swiftc"))
        .stdout(predicate::str::contains("-j2"))
        .stdout(predicate::str::contains("-fmodule-map-file="));
}

#[test]
fn test_flags_native_target_release() {
    let tmp = project();

    quay(tmp.path())
        .args(["flags", "CLib", "--release", "--Xcc", "-DNDEBUG"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(native, module CLib)"))
        .stdout(predicate::str::contains("-O2"))
        .stdout(predicate::str::contains("-DNDEBUG"))
        .stdout(predicate::str::contains("module.modulemap"));
}

#[test]
fn test_flags_unknown_target() {
    let tmp = project();

    quay(tmp.path())
        .args(["flags", "ghost", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find target `ghost`"));
}

// ============================================================================
// quay linkplan
// ============================================================================

#[test]
fn test_linkplan_order() {
    let tmp = project();

    let output = quay(tmp.path())
        .args(["linkplan", "exe", "--platform", "linux", "--Xlinker", "-rpath=/opt"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("1. exe"));
    assert!(stdout.contains("2. lib"));
    assert!(stdout.contains("3. CLib"));
    assert!(stdout.contains("-emit-executable"));
    assert!(stdout.trim_end().ends_with("-rpath=/opt"));

    let exe = stdout.find("exe.build/main.swift.o").unwrap();
    let lib = stdout.find("lib.build/lib.swift.o").unwrap();
    assert!(exe < lib);
}

#[test]
fn test_linkplan_unknown_product() {
    let tmp = project();

    quay(tmp.path())
        .args(["linkplan", "ghost", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find product `ghost`"));
}

// ============================================================================
// quay toolchain
// ============================================================================

#[test]
fn test_toolchain_uses_project_config() {
    let tmp = project();
    fs::create_dir_all(tmp.path().join(".quay")).unwrap();
    fs::write(
        tmp.path().join(".quay/toolchain.toml"),
        "[toolchain]\nswiftc = \"/project/swiftc\"\nlanguage-version = 4\n\n[build]\njobs = 3\n",
    )
    .unwrap();

    quay(tmp.path())
        .arg("toolchain")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("/project/swiftc"))
        .stdout(predicate::str::contains("language version:  4"))
        .stdout(predicate::str::contains("jobs:              3"));
}

#[test]
fn test_toolchain_flags_override_config() {
    let tmp = project();
    fs::create_dir_all(tmp.path().join(".quay")).unwrap();
    fs::write(
        tmp.path().join(".quay/toolchain.toml"),
        "[toolchain]\nclang = \"/project/clang\"\n",
    )
    .unwrap();

    quay(tmp.path())
        .args(["toolchain", "--clang", "/cli/clang"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("/cli/clang"))
        .stdout(predicate::str::contains("/project/clang").not());
}

#[test]
fn test_broken_project_config_is_reported() {
    let tmp = project();
    fs::create_dir_all(tmp.path().join(".quay")).unwrap();
    fs::write(tmp.path().join(".quay/toolchain.toml"), "[toolchain\n").unwrap();

    quay(tmp.path())
        .arg("toolchain")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse toolchain config"));
}
