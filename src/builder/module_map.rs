//! Module map synthesis for C-family targets.
//!
//! A target with public headers gets a generated `module.modulemap` in its
//! build directory so that Swift targets can import it. The header layout
//! decides the map's shape:
//!
//! - `include/<Module>.h` or `include/<Module>/<Module>.h`: umbrella header
//! - anything else: the whole include directory is the umbrella
//!
//! Probing is read-only. Writing the file is a separate, explicit step.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::builder::errors::BuildPlanError;

/// File name of every generated module map.
pub const MODULE_MAP_FILENAME: &str = "module.modulemap";

/// How a module's public headers are exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "kebab-case")]
pub enum HeaderLayout {
    /// A single header that includes everything else
    UmbrellaHeader(PathBuf),
    /// Every header under a directory
    UmbrellaDirectory(PathBuf),
}

/// A generated module map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMap {
    /// Where the map is (or will be) written
    pub path: PathBuf,
    /// Module name declared in the map
    pub module_name: String,
    /// Header layout found by probing
    pub layout: HeaderLayout,
}

impl ModuleMap {
    /// Probe `include_dir` and describe the module map for a target.
    ///
    /// Returns `None` when the directory is missing or holds no files; such a
    /// target cannot be imported as a module. Any other I/O error is fatal.
    pub fn probe(
        module_name: &str,
        include_dir: &Path,
        target_build_dir: &Path,
    ) -> Result<Option<Self>, BuildPlanError> {
        if !contains_files(include_dir)? {
            tracing::debug!(
                "no public headers in {}, skipping module map for {}",
                include_dir.display(),
                module_name
            );
            return Ok(None);
        }

        let flat = include_dir.join(format!("{}.h", module_name));
        let nested = include_dir.join(module_name).join(format!("{}.h", module_name));

        let layout = if flat.is_file() {
            HeaderLayout::UmbrellaHeader(flat)
        } else if nested.is_file() {
            HeaderLayout::UmbrellaHeader(nested)
        } else {
            HeaderLayout::UmbrellaDirectory(include_dir.to_path_buf())
        };

        Ok(Some(ModuleMap {
            path: target_build_dir.join(MODULE_MAP_FILENAME),
            module_name: module_name.to_string(),
            layout,
        }))
    }

    /// Render the module map file contents.
    pub fn render(&self) -> String {
        let umbrella = match &self.layout {
            HeaderLayout::UmbrellaHeader(header) => {
                format!("umbrella header \"{}\"", header.display())
            }
            HeaderLayout::UmbrellaDirectory(dir) => format!("umbrella \"{}\"", dir.display()),
        };

        format!(
            "module {} {{\n    {}\n    export *\n}}\n",
            self.module_name, umbrella
        )
    }

    /// Write the rendered map to its path, creating parent directories.
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(&self.path, self.render())
            .with_context(|| format!("failed to write module map: {}", self.path.display()))
    }
}

/// Whether `dir` holds at least one file, at any depth.
///
/// Symlinked headers and header directories count. Dangling links do not.
fn contains_files(dir: &Path) -> Result<bool, BuildPlanError> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => return Ok(true),
            Ok(_) => {}
            Err(err) => {
                let not_found =
                    err.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound);
                if not_found && err.depth() == 0 {
                    return Ok(false);
                }
                if not_found {
                    tracing::debug!("skipping dangling link in {}", dir.display());
                    continue;
                }
                return Err(BuildPlanError::HeaderProbe {
                    path: dir.to_path_buf(),
                    source: err.into(),
                });
            }
        }
    }

    Ok(false)
}
