//! Product link descriptions.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::builder::context::BuildParameters;
use crate::builder::target::TargetDescription;
use crate::builder::toolchain::TestBundleLayout;
use crate::core::graph::{topological_sort, ResolvedDependency};
use crate::core::target::c99_name;
use crate::core::{PackageGraph, ProductId, ProductKind, TargetId};

/// Object synthesized for flat test executables to run discovered tests.
pub const TEST_DRIVER_OBJECT: &str = "test-driver.o";

/// How a product gets linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescription {
    /// Product name
    pub product: String,

    /// What gets linked
    pub kind: ProductKind,

    /// Artifact path
    pub output: PathBuf,

    /// Statically linked targets, in link order
    pub linked_targets: Vec<String>,

    /// Dynamic library products linked against with `-l`
    pub dynamic_libraries: Vec<String>,

    /// Object files passed to the linker, in order
    pub objects: Vec<PathBuf>,

    /// Full linker invocation, compiler driver first
    pub link_arguments: Vec<String>,
}

impl ProductDescription {
    /// Whether the link needs the C++ runtime.
    pub fn links_cxx_runtime(&self, params: &BuildParameters) -> bool {
        let flag = params.platform_traits().cxx_runtime_flag;
        self.link_arguments.iter().any(|arg| arg == flag)
    }
}

/// Artifact path of a product.
pub fn output_path(params: &BuildParameters, name: &str, kind: ProductKind) -> PathBuf {
    let build = params.build_path();
    let traits = params.platform_traits();

    match kind {
        ProductKind::Executable => build.join(name),
        ProductKind::StaticLibrary => {
            build.join(format!("lib{}.{}", name, traits.static_library_extension))
        }
        ProductKind::DynamicLibrary => {
            build.join(format!("lib{}.{}", name, traits.dynamic_library_extension))
        }
        ProductKind::TestBundle => match traits.test_bundle {
            TestBundleLayout::Bundle => build
                .join(format!("{}.xctest", name))
                .join("Contents")
                .join("MacOS")
                .join(name),
            TestBundleLayout::FlatExecutable => build.join(format!("{}.xctest", name)),
        },
    }
}

fn emission_flags(kind: ProductKind, layout: TestBundleLayout) -> &'static [&'static str] {
    match kind {
        ProductKind::Executable => &["-emit-executable"],
        ProductKind::StaticLibrary => &["-emit-library", "-static"],
        ProductKind::DynamicLibrary => &["-emit-library"],
        ProductKind::TestBundle => match layout {
            TestBundleLayout::Bundle => &["-Xlinker", "-bundle"],
            TestBundleLayout::FlatExecutable => &["-emit-executable"],
        },
    }
}

/// Targets statically linked into `id`, each before its own dependencies.
///
/// Dependencies on dynamic library products are not traversed.
fn linked_targets(graph: &PackageGraph, id: ProductId) -> Vec<TargetId> {
    topological_sort(graph.product_targets(id), |t| {
        let mut succs = Vec::new();
        for dep in graph.dependencies(t) {
            match *dep {
                ResolvedDependency::Target(t) => succs.push(t),
                ResolvedDependency::Product(p) if !graph.product(p).is_dynamic() => {
                    succs.extend_from_slice(graph.product_targets(p))
                }
                ResolvedDependency::Product(_) => {}
            }
        }
        succs
    })
}

/// Dynamic library products reached from `linked`, in discovery order.
fn dynamic_libraries(graph: &PackageGraph, linked: &[TargetId]) -> Vec<ProductId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for &t in linked {
        for dep in graph.dependencies(t) {
            if let ResolvedDependency::Product(p) = *dep {
                if graph.product(p).is_dynamic() && seen.insert(p) {
                    out.push(p);
                }
            }
        }
    }

    out
}

/// Describe the link of product `id`.
///
/// Every linked target must already be in `targets`; the plan builds all
/// targets before any product.
pub(crate) fn describe(
    params: &BuildParameters,
    graph: &PackageGraph,
    id: ProductId,
    targets: &BTreeMap<TargetId, TargetDescription>,
) -> ProductDescription {
    let product = graph.product(id);
    let traits = params.platform_traits();
    let output = output_path(params, &product.name, product.kind);

    let linked = linked_targets(graph, id);
    let dynamic: Vec<String> = dynamic_libraries(graph, &linked)
        .into_iter()
        .map(|p| graph.product(p).name.clone())
        .collect();

    let linked_descriptions: Vec<&TargetDescription> =
        linked.iter().filter_map(|t| targets.get(t)).collect();

    let objects: Vec<PathBuf> = linked_descriptions
        .iter()
        .flat_map(|d| d.objects().iter().cloned())
        .collect();

    let mut args = vec![params.toolchain.managed_compiler.display().to_string()];
    if params.is_debug() {
        args.push("-g".to_string());
    }
    args.push("-L".to_string());
    args.push(params.build_path().display().to_string());
    args.push("-o".to_string());
    args.push(output.display().to_string());
    args.push("-module-name".to_string());
    args.push(c99_name(&product.name));

    args.extend(dynamic.iter().map(|name| format!("-l{}", name)));
    args.extend(
        emission_flags(product.kind, traits.test_bundle)
            .iter()
            .map(|s| s.to_string()),
    );
    args.extend(objects.iter().map(|o| o.display().to_string()));

    if product.kind == ProductKind::TestBundle
        && traits.test_bundle == TestBundleLayout::FlatExecutable
    {
        let driver = params
            .product_build_dir(&product.name)
            .join(TEST_DRIVER_OBJECT);
        args.push(driver.display().to_string());
    }

    if linked_descriptions.iter().any(|d| d.is_cxx()) {
        args.push(traits.cxx_runtime_flag.to_string());
    }

    for flag in &params.flags.linker {
        args.push("-Xlinker".to_string());
        args.push(flag.clone());
    }

    tracing::debug!(
        "described {} {} ({} targets, {} dynamic)",
        product.kind,
        product.name,
        linked.len(),
        dynamic.len()
    );

    ProductDescription {
        product: product.name.clone(),
        kind: product.kind,
        output,
        linked_targets: linked
            .iter()
            .map(|t| graph.target(*t).name.clone())
            .collect(),
        dynamic_libraries: dynamic,
        objects,
        link_arguments: args,
    }
}
