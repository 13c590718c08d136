//! Build parameters - configuration, output location and toolchain.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::builder::toolchain::{Platform, PlatformTraits, ToolchainDescriptor};

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    #[default]
    Debug,
    Release,
}

impl Configuration {
    /// Directory name under the data path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "debug",
            Configuration::Release => "release",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Configuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Configuration::Debug),
            "release" => Ok(Configuration::Release),
            _ => Err(format!(
                "invalid configuration '{}', valid values: debug, release",
                s
            )),
        }
    }
}

/// User-supplied extra flags, per tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildFlags {
    /// Appended to managed compile arguments
    pub managed: Vec<String>,
    /// Appended to native compile arguments
    pub native: Vec<String>,
    /// Passed to the linker via `-Xlinker`
    pub linker: Vec<String>,
}

/// Everything, besides the graph, that build planning depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParameters {
    /// Root of all build output (e.g. `.build`)
    pub data_path: PathBuf,

    /// Debug or release
    pub configuration: Configuration,

    /// Compiler drivers
    pub toolchain: ToolchainDescriptor,

    /// Platform the build targets
    pub platform: Platform,

    /// Parallelism passed to the managed compiler
    pub jobs: usize,

    /// User flags
    pub flags: BuildFlags,
}

impl BuildParameters {
    /// Create parameters for the host platform.
    ///
    /// Platform and jobs come from the host, so plans differ between
    /// machines unless both are set explicitly.
    pub fn new(
        data_path: impl Into<PathBuf>,
        configuration: Configuration,
        toolchain: ToolchainDescriptor,
    ) -> Self {
        BuildParameters {
            data_path: data_path.into(),
            configuration,
            toolchain,
            platform: Platform::host(),
            jobs: default_jobs(),
            flags: BuildFlags::default(),
        }
    }

    /// Target a specific platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set the parallelism.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set the user flags.
    pub fn with_flags(mut self, flags: BuildFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Check if this is a debug build.
    pub fn is_debug(&self) -> bool {
        self.configuration == Configuration::Debug
    }

    /// `<data_path>/<configuration>`.
    pub fn build_path(&self) -> PathBuf {
        self.data_path.join(self.configuration.as_str())
    }

    /// Shared module cache for both compiler families.
    pub fn module_cache_path(&self) -> PathBuf {
        self.build_path().join("ModuleCache")
    }

    /// Intermediate output directory of a target.
    pub fn target_build_dir(&self, target: &str) -> PathBuf {
        self.build_path().join(format!("{}.build", target))
    }

    /// Intermediate output directory of a product.
    pub fn product_build_dir(&self, product: &str) -> PathBuf {
        self.build_path().join(format!("{}.product", product))
    }

    /// Object file for a source, keyed by target and relative source path.
    pub fn object_path(&self, target: &str, source: &Path) -> PathBuf {
        let mut name = source.as_os_str().to_owned();
        name.push(".o");
        self.target_build_dir(target).join(name)
    }

    /// Row of the platform table for the target platform.
    pub fn platform_traits(&self) -> &'static PlatformTraits {
        self.platform.traits()
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
