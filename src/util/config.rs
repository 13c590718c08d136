//! Configuration file support for Quay.
//!
//! Toolchain overrides live in two locations:
//! - Global: `~/.quay/toolchain.toml` - User-wide defaults
//! - Project: `.quay/toolchain.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config; command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::context::BuildFlags;
use crate::builder::toolchain::{Platform, ToolchainDescriptor};

/// Managed compiler used when nothing is configured.
pub const DEFAULT_MANAGED_COMPILER: &str = "swiftc";

/// Native compiler used when nothing is configured.
pub const DEFAULT_NATIVE_COMPILER: &str = "clang";

/// Language version assumed when nothing is configured.
pub const DEFAULT_LANGUAGE_VERSION: u32 = 5;

/// Toolchain configuration for compiler overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Toolchain settings
    pub toolchain: ToolchainSettings,

    /// Build settings
    pub build: BuildSettings,
}

/// Compiler drivers and their extra flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Path to the managed compiler driver (e.g., /usr/bin/swiftc)
    pub swiftc: Option<PathBuf>,

    /// Path to the C-family compiler driver (e.g., /usr/bin/clang)
    pub clang: Option<PathBuf>,

    /// SDK passed to both drivers
    pub sdk: Option<PathBuf>,

    /// Managed-language major version implemented by the driver
    pub language_version: Option<u32>,

    /// Target platform (darwin or linux)
    pub platform: Option<String>,

    /// Platform flags for the managed compiler
    pub swift_flags: Vec<String>,

    /// Platform flags for the C-family compiler
    pub cflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

/// Build output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildSettings {
    /// Root of build output, relative to the project
    pub data_path: Option<PathBuf>,

    /// Parallelism for managed compiles
    pub jobs: Option<usize>,
}

impl ToolchainConfig {
    /// Load toolchain configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read toolchain config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse toolchain config: {}", path.display()))
    }

    /// Load toolchain configuration if the file exists.
    ///
    /// A missing file is not an error; a file that exists but cannot be read
    /// or parsed is.
    pub fn load_if_exists(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let config = Self::load(path)?;
        tracing::debug!("loaded toolchain config from {}", path.display());
        Ok(Some(config))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainConfig) {
        let (tc, build) = (other.toolchain, other.build);

        if tc.swiftc.is_some() {
            self.toolchain.swiftc = tc.swiftc;
        }
        if tc.clang.is_some() {
            self.toolchain.clang = tc.clang;
        }
        if tc.sdk.is_some() {
            self.toolchain.sdk = tc.sdk;
        }
        if tc.language_version.is_some() {
            self.toolchain.language_version = tc.language_version;
        }
        if tc.platform.is_some() {
            self.toolchain.platform = tc.platform;
        }
        if !tc.swift_flags.is_empty() {
            self.toolchain.swift_flags = tc.swift_flags;
        }
        if !tc.cflags.is_empty() {
            self.toolchain.cflags = tc.cflags;
        }
        if !tc.ldflags.is_empty() {
            self.toolchain.ldflags = tc.ldflags;
        }
        if build.data_path.is_some() {
            self.build.data_path = build.data_path;
        }
        if build.jobs.is_some() {
            self.build.jobs = build.jobs;
        }
    }

    /// Toolchain descriptor with defaults filled in.
    pub fn toolchain_descriptor(&self) -> ToolchainDescriptor {
        let tc = &self.toolchain;
        let mut descriptor = ToolchainDescriptor::new(
            tc.swiftc
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MANAGED_COMPILER)),
            tc.clang
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_NATIVE_COMPILER)),
            tc.language_version.unwrap_or(DEFAULT_LANGUAGE_VERSION),
        );
        descriptor.default_sdk = tc.sdk.clone();
        descriptor.managed_platform_flags = tc.swift_flags.clone();
        descriptor.native_platform_flags = tc.cflags.clone();
        descriptor
    }

    /// Configured platform, if any.
    pub fn platform(&self) -> Result<Option<Platform>> {
        self.toolchain
            .platform
            .as_deref()
            .map(|s| s.parse::<Platform>().map_err(anyhow::Error::msg))
            .transpose()
    }

    /// User flags contributed by the config.
    pub fn build_flags(&self) -> BuildFlags {
        BuildFlags {
            managed: Vec::new(),
            native: Vec::new(),
            linker: self.toolchain.ldflags.clone(),
        }
    }
}

/// Load merged toolchain configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.quay/toolchain.toml)
/// 2. Global config (~/.quay/toolchain.toml)
/// 3. Defaults
pub fn load_toolchain_config(
    global_path: Option<&Path>,
    project_path: &Path,
) -> Result<ToolchainConfig> {
    let mut config = ToolchainConfig::default();

    if let Some(global_path) = global_path {
        if let Some(global) = ToolchainConfig::load_if_exists(global_path)? {
            config.merge(global);
        }
    }

    if let Some(project) = ToolchainConfig::load_if_exists(project_path)? {
        config.merge(project);
    }

    Ok(config)
}

/// Get the global quay config directory (~/.quay).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".quay"))
}

/// Get the global toolchain config path (~/.quay/toolchain.toml).
pub fn global_toolchain_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("toolchain.toml"))
}

/// Get the project toolchain config path (.quay/toolchain.toml).
pub fn project_toolchain_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".quay").join("toolchain.toml")
}
