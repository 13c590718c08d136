//! Command implementations

pub mod flags;
pub mod linkplan;
pub mod plan;
pub mod toolchain;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use quay::builder::{BuildParameters, BuildPlan, Configuration};
use quay::core::{GraphManifest, PackageGraph, GRAPH_MANIFEST_NAME};
use quay::util::config::{
    global_toolchain_config_path, load_toolchain_config, project_toolchain_config_path,
    ToolchainConfig,
};
use quay::util::diagnostic::suggestions;

use crate::cli::PlanOptions;

/// Default build output directory, next to the graph description.
const DEFAULT_DATA_DIR: &str = ".build";

/// Everything needed to plan: the graph and the resolved parameters.
pub struct Session {
    pub graph: PackageGraph,
    pub params: BuildParameters,
}

impl Session {
    /// Load the graph and merge configuration files with command-line flags.
    pub fn load(opts: &PlanOptions) -> Result<Self> {
        let graph_path = graph_path(opts)?;
        let root = graph_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let config = load_toolchain_config(
            global_toolchain_config_path().as_deref(),
            &project_toolchain_config_path(&root),
        )?;
        let params = parameters(opts, &config, &root)?;

        let graph = GraphManifest::load(&graph_path)?.into_graph(&root)?;
        tracing::debug!(
            "loaded {} packages, {} targets, {} products from {}",
            graph.package_count(),
            graph.target_count(),
            graph.product_count(),
            graph_path.display()
        );

        Ok(Session { graph, params })
    }

    /// Build the plan.
    pub fn plan(&self) -> Result<BuildPlan> {
        Ok(BuildPlan::new(&self.params, &self.graph)?)
    }
}

fn graph_path(opts: &PlanOptions) -> Result<PathBuf> {
    let path = match &opts.graph {
        Some(path) => path.clone(),
        None => std::env::current_dir()
            .context("failed to get current directory")?
            .join(GRAPH_MANIFEST_NAME),
    };

    if !path.exists() {
        bail!(
            "could not find graph description at {}\n{}",
            path.display(),
            suggestions::NO_GRAPH
        );
    }

    Ok(path)
}

/// Resolve build parameters. Flags win over project config, which wins over
/// global config.
fn parameters(opts: &PlanOptions, config: &ToolchainConfig, root: &Path) -> Result<BuildParameters> {
    let mut toolchain = config.toolchain_descriptor();
    if let Some(swiftc) = &opts.swiftc {
        toolchain.managed_compiler = swiftc.clone();
    }
    if let Some(clang) = &opts.clang {
        toolchain.native_compiler = clang.clone();
    }
    if let Some(sdk) = &opts.sdk {
        toolchain.default_sdk = Some(sdk.clone());
    }
    if let Some(version) = opts.language_version {
        toolchain.language_version = version;
    }

    let configuration = if opts.release {
        Configuration::Release
    } else {
        Configuration::Debug
    };

    let data_path = opts
        .data_path
        .clone()
        .or_else(|| config.build.data_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let mut params = BuildParameters::new(root.join(data_path), configuration, toolchain);

    if let Some(platform) = opts.platform.or(config.platform()?) {
        params = params.with_platform(platform);
    }
    if let Some(jobs) = opts.jobs.or(config.build.jobs) {
        params = params.with_jobs(jobs.max(1));
    }

    let mut flags = config.build_flags();
    flags.managed.extend(opts.xswiftc.iter().cloned());
    flags.native.extend(opts.xcc.iter().cloned());
    flags.linker.extend(opts.xlinker.iter().cloned());

    Ok(params.with_flags(flags))
}
