//! Toolchain description and per-platform traits.
//!
//! The engine drives two compiler families: the managed (`swiftc`-style)
//! driver, which also links every product, and the native (`clang`-style)
//! driver for C-family targets. Platform differences are kept in a single
//! table so a new platform adds a row, not a branch.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Apple platforms (macOS)
    Darwin = 0,
    /// GNU/Linux
    Linux = 1,
}

/// How a test bundle is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestBundleLayout {
    /// `<name>.xctest/Contents/MacOS/<name>`, linked with `-bundle`
    Bundle,
    /// `<name>.xctest` as a plain executable plus a synthesized test driver
    FlatExecutable,
}

/// Platform-dependent facts used when synthesizing arguments.
#[derive(Debug)]
pub struct PlatformTraits {
    pub platform: Platform,
    pub dynamic_library_extension: &'static str,
    pub static_library_extension: &'static str,
    pub cxx_runtime_flag: &'static str,
    pub objc_arc: bool,
    pub test_bundle: TestBundleLayout,
}

static PLATFORM_TABLE: [PlatformTraits; 2] = [
    PlatformTraits {
        platform: Platform::Darwin,
        dynamic_library_extension: "dylib",
        static_library_extension: "a",
        cxx_runtime_flag: "-lc++",
        objc_arc: true,
        test_bundle: TestBundleLayout::Bundle,
    },
    PlatformTraits {
        platform: Platform::Linux,
        dynamic_library_extension: "so",
        static_library_extension: "a",
        cxx_runtime_flag: "-lstdc++",
        objc_arc: false,
        test_bundle: TestBundleLayout::FlatExecutable,
    },
];

impl Platform {
    /// Detect the host platform.
    ///
    /// Anything that is not macOS is treated as a GNU/Linux-style platform.
    pub fn host() -> Self {
        if std::env::consts::OS == "macos" {
            Platform::Darwin
        } else {
            Platform::Linux
        }
    }

    /// Look up this platform's row in the traits table.
    pub fn traits(self) -> &'static PlatformTraits {
        &PLATFORM_TABLE[self as usize]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Darwin => write!(f, "darwin"),
            Platform::Linux => write!(f, "linux"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "darwin" | "macos" => Ok(Platform::Darwin),
            "linux" => Ok(Platform::Linux),
            _ => Err(format!(
                "invalid platform '{}', valid values: darwin, linux",
                s
            )),
        }
    }
}

/// Paths and fixed arguments of the two compiler drivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainDescriptor {
    /// Managed compiler driver, also used to link products
    pub managed_compiler: PathBuf,

    /// Native C-family compiler driver
    pub native_compiler: PathBuf,

    /// SDK passed to both drivers, if any
    #[serde(default)]
    pub default_sdk: Option<PathBuf>,

    /// Managed-language major version this toolchain implements
    pub language_version: u32,

    /// Extra managed-compiler flags required by the platform
    #[serde(default)]
    pub managed_platform_flags: Vec<String>,

    /// Extra native-compiler flags required by the platform
    #[serde(default)]
    pub native_platform_flags: Vec<String>,
}

impl ToolchainDescriptor {
    /// Create a descriptor with no SDK and no platform flags.
    pub fn new(
        managed_compiler: impl Into<PathBuf>,
        native_compiler: impl Into<PathBuf>,
        language_version: u32,
    ) -> Self {
        ToolchainDescriptor {
            managed_compiler: managed_compiler.into(),
            native_compiler: native_compiler.into(),
            default_sdk: None,
            language_version,
            managed_platform_flags: Vec::new(),
            native_platform_flags: Vec::new(),
        }
    }

    /// Set the default SDK.
    pub fn with_sdk(mut self, sdk: impl Into<PathBuf>) -> Self {
        self.default_sdk = Some(sdk.into());
        self
    }

    /// Managed-compiler flags contributed by the toolchain itself.
    pub fn managed_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(sdk) = &self.default_sdk {
            flags.push("-sdk".to_string());
            flags.push(sdk.display().to_string());
        }
        flags.extend(self.managed_platform_flags.iter().cloned());
        flags
    }

    /// Native-compiler flags contributed by the toolchain itself.
    pub fn native_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(sdk) = &self.default_sdk {
            flags.push("-isysroot".to_string());
            flags.push(sdk.display().to_string());
        }
        flags.extend(self.native_platform_flags.iter().cloned());
        flags
    }
}
