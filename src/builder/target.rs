//! Per-target compile descriptions.
//!
//! A target containing any Swift source is compiled by the managed driver
//! ([`ManagedTargetDescription`]); a pure C-family target is compiled by the
//! native driver ([`NativeTargetDescription`]). C-family files inside a
//! Swift target are private implementation detail of that target.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::context::{BuildParameters, Configuration};
use crate::builder::errors::BuildPlanError;
use crate::builder::module_map::ModuleMap;
use crate::core::{PackageGraph, SourceComposition, TargetId};
use crate::util::hash::Fingerprint;

/// Preprocessor define marking code built by the package tooling.
pub const PACKAGE_DEFINE: &str = "-DSWIFT_PACKAGE";

/// A single C-family source and its object file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileUnit {
    /// Absolute source path
    pub source: PathBuf,
    /// Object file produced from it
    pub object: PathBuf,
}

/// Description of a target compiled by the managed driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedTargetDescription {
    pub target: String,
    pub package: String,
    pub module_name: String,

    /// Arguments for the managed compiler, without sources or outputs
    pub compile_arguments: Vec<String>,

    /// Absolute Swift sources
    pub sources: Vec<PathBuf>,

    /// Every object file: Swift objects, then private C-family objects
    pub objects: Vec<PathBuf>,

    /// Private C-family sources of a mixed target
    pub native_units: Vec<CompileUnit>,

    /// Arguments for the private C-family sources (empty if there are none)
    pub native_arguments: Vec<String>,

    /// Module map exposing the C-family part of a mixed target
    pub module_map: Option<ModuleMap>,

    /// Whether any source is C++
    pub is_cxx: bool,
}

/// Description of a target compiled by the native driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTargetDescription {
    pub target: String,
    pub package: String,
    pub module_name: String,

    /// Arguments shared by every source of the target
    pub basic_arguments: Vec<String>,

    /// One compile unit per source
    pub units: Vec<CompileUnit>,

    /// Object files, in source order
    pub objects: Vec<PathBuf>,

    /// Present iff the target has a non-empty public headers directory
    pub module_map: Option<ModuleMap>,

    /// Whether any source is C++
    pub is_cxx: bool,
}

/// Compile description of one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum TargetDescription {
    Managed(ManagedTargetDescription),
    Native(NativeTargetDescription),
}

impl TargetDescription {
    /// Target name.
    pub fn name(&self) -> &str {
        match self {
            TargetDescription::Managed(d) => &d.target,
            TargetDescription::Native(d) => &d.target,
        }
    }

    /// Owning package name.
    pub fn package(&self) -> &str {
        match self {
            TargetDescription::Managed(d) => &d.package,
            TargetDescription::Native(d) => &d.package,
        }
    }

    /// Module name (C99 identifier).
    pub fn module_name(&self) -> &str {
        match self {
            TargetDescription::Managed(d) => &d.module_name,
            TargetDescription::Native(d) => &d.module_name,
        }
    }

    /// The target's compile arguments.
    ///
    /// For native targets these are the basic arguments shared by every
    /// source file.
    pub fn compile_arguments(&self) -> &[String] {
        match self {
            TargetDescription::Managed(d) => &d.compile_arguments,
            TargetDescription::Native(d) => &d.basic_arguments,
        }
    }

    /// Object files this target produces.
    pub fn objects(&self) -> &[PathBuf] {
        match self {
            TargetDescription::Managed(d) => &d.objects,
            TargetDescription::Native(d) => &d.objects,
        }
    }

    /// C-family compile units together with their arguments.
    pub fn native_units(&self) -> (&[CompileUnit], &[String]) {
        match self {
            TargetDescription::Managed(d) => (&d.native_units, &d.native_arguments),
            TargetDescription::Native(d) => (&d.units, &d.basic_arguments),
        }
    }

    /// The generated module map, if the target can be imported as a module.
    pub fn module_map(&self) -> Option<&ModuleMap> {
        match self {
            TargetDescription::Managed(d) => d.module_map.as_ref(),
            TargetDescription::Native(d) => d.module_map.as_ref(),
        }
    }

    /// Whether linking this target needs the C++ runtime.
    pub fn is_cxx(&self) -> bool {
        match self {
            TargetDescription::Managed(d) => d.is_cxx,
            TargetDescription::Native(d) => d.is_cxx,
        }
    }

    /// Stable hash of everything the compile step depends on.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        fp.update_str(self.name())
            .update_strs(self.compile_arguments().iter().map(String::as_str))
            .update_paths(self.objects());

        let (units, native_args) = self.native_units();
        fp.update_strs(native_args.iter().map(String::as_str));
        for unit in units {
            fp.update_path(&unit.source);
        }

        fp.update_opt(
            self.module_map()
                .map(|m| m.path.to_string_lossy())
                .as_deref(),
        );
        fp.finish()
    }
}

/// Builds target descriptions in dependency-first order.
///
/// Descriptions of dependencies must already be in `built` so their module
/// maps can be referenced.
pub(crate) struct TargetDescriptionBuilder<'a> {
    params: &'a BuildParameters,
    graph: &'a PackageGraph,
    built: &'a BTreeMap<TargetId, TargetDescription>,
}

impl<'a> TargetDescriptionBuilder<'a> {
    pub(crate) fn new(
        params: &'a BuildParameters,
        graph: &'a PackageGraph,
        built: &'a BTreeMap<TargetId, TargetDescription>,
    ) -> Self {
        TargetDescriptionBuilder {
            params,
            graph,
            built,
        }
    }

    /// Describe `id`, given its memoized transitive dependency closure.
    pub(crate) fn build(
        &self,
        id: TargetId,
        closure: &[TargetId],
    ) -> Result<TargetDescription, BuildPlanError> {
        let target = self.graph.target(id);
        let module_name = target.c99_name();

        let module_map = match target.include_dir() {
            Some(include) => ModuleMap::probe(
                &module_name,
                &include,
                &self.params.target_build_dir(&target.name),
            )?,
            None => None,
        };

        let units: Vec<CompileUnit> = target
            .sources
            .native_files()
            .map(|file| self.compile_unit(&target.name, &target.sources.root, file))
            .collect();

        let description = match target.composition() {
            Some(SourceComposition::Native) => {
                TargetDescription::Native(NativeTargetDescription {
                    target: target.name.clone(),
                    package: target.package.clone(),
                    basic_arguments: self.native_arguments(id, &module_name, closure),
                    objects: units.iter().map(|u| u.object.clone()).collect(),
                    units,
                    module_name,
                    module_map,
                    is_cxx: target.sources.has_cxx(),
                })
            }
            Some(SourceComposition::Managed) | Some(SourceComposition::Mixed) | None => {
                let sources: Vec<PathBuf> = target
                    .sources
                    .managed_files()
                    .map(|file| target.sources.root.join(file))
                    .collect();

                let mut objects: Vec<PathBuf> = target
                    .sources
                    .managed_files()
                    .map(|file| self.params.object_path(&target.name, file))
                    .collect();
                objects.extend(units.iter().map(|u| u.object.clone()));

                let native_arguments = if units.is_empty() {
                    Vec::new()
                } else {
                    self.native_arguments(id, &module_name, closure)
                };

                TargetDescription::Managed(ManagedTargetDescription {
                    target: target.name.clone(),
                    package: target.package.clone(),
                    compile_arguments: self.managed_arguments(closure),
                    sources,
                    objects,
                    native_units: units,
                    native_arguments,
                    module_name,
                    module_map,
                    is_cxx: target.sources.has_cxx(),
                })
            }
        };

        tracing::debug!(
            "described target {} ({} objects, module map: {})",
            description.name(),
            description.objects().len(),
            description.module_map().is_some()
        );

        Ok(description)
    }

    fn compile_unit(&self, target: &str, root: &Path, file: &Path) -> CompileUnit {
        CompileUnit {
            source: root.join(file),
            object: self.params.object_path(target, file),
        }
    }

    /// Managed compiler arguments.
    fn managed_arguments(&self, closure: &[TargetId]) -> Vec<String> {
        let params = self.params;
        let mut args: Vec<String> = match params.configuration {
            Configuration::Debug => vec!["-Onone".into(), "-g".into(), "-enable-testing".into()],
            Configuration::Release => vec!["-O".into()],
        };

        if params.is_debug() {
            args.push(format!("-j{}", params.jobs));
        }
        args.push(PACKAGE_DEFINE.to_string());

        args.extend(params.toolchain.managed_flags());
        args.extend(params.flags.managed.iter().cloned());

        // Module maps of C-family dependencies, direct or transitive
        for dep in closure {
            let Some(map) = self.built.get(dep).and_then(TargetDescription::module_map) else {
                continue;
            };
            let Some(include) = self.graph.target(*dep).include_dir() else {
                continue;
            };

            args.push("-Xcc".to_string());
            args.push(format!("-fmodule-map-file={}", map.path.display()));
            args.push("-I".to_string());
            args.push(include.display().to_string());
        }

        args.push("-module-cache-path".to_string());
        args.push(params.module_cache_path().display().to_string());

        args
    }

    /// Native compiler arguments shared by every C-family source of `id`.
    fn native_arguments(&self, id: TargetId, module_name: &str, closure: &[TargetId]) -> Vec<String> {
        let params = self.params;
        let mut args: Vec<String> = match params.configuration {
            Configuration::Debug => vec!["-g".into(), "-O0".into()],
            Configuration::Release => vec!["-O2".into()],
        };

        if params.platform_traits().objc_arc {
            args.push("-fobjc-arc".to_string());
        }

        args.extend(params.toolchain.native_flags());
        args.extend(params.flags.native.iter().cloned());

        args.push("-fmodules".to_string());
        args.push(format!("-fmodule-name={}", module_name));

        if let Some(own) = self.graph.target(id).include_dir() {
            args.push("-I".to_string());
            args.push(own.display().to_string());
        }

        // Same-package headers are quoted includes; other packages' are regular
        let package = self.graph.target_package(id);
        let (local, external): (Vec<TargetId>, Vec<TargetId>) = closure
            .iter()
            .copied()
            .partition(|dep| self.graph.target_package(*dep) == package);

        for (flag, deps) in [("-iquote", &local), ("-I", &external)] {
            for dep in deps {
                if let Some(include) = self.graph.target(*dep).include_dir() {
                    args.push(flag.to_string());
                    args.push(include.display().to_string());
                }
            }
        }

        args.push(format!(
            "-fmodules-cache-path={}",
            params.module_cache_path().display()
        ));

        args
    }
}
