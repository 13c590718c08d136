//! PackageGraph - the validated, immutable input to build planning.
//!
//! The graph owns every package, target and product of a resolved package
//! tree and addresses them by stable index keys in input order. Once created
//! it is read-only; validation (unique names, known references, acyclicity)
//! happens exactly once, in [`PackageGraph::new`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::path::PathBuf;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use thiserror::Error;

use crate::core::{Package, Product, Target};
use crate::core::target::Dependency;
use crate::util::diagnostic::Diagnostic;

/// Errors found while validating a package graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("package graph has no packages")]
    NoPackages,

    #[error("duplicate {kind} name `{name}`")]
    DuplicateName { kind: &'static str, name: String },

    #[error("target `{target}` belongs to unknown package `{package}`")]
    UnknownPackage { target: String, package: String },

    #[error("target `{target}` depends on unknown {kind} `{dependency}`")]
    UnknownDependency {
        target: String,
        kind: &'static str,
        dependency: String,
    },

    #[error("product `{product}` references unknown target `{target}`")]
    UnknownProductTarget { product: String, target: String },

    #[error("product `{product}` has no targets")]
    EmptyProduct { product: String },

    #[error("target `{target}` has no compilable sources")]
    EmptyTarget { target: String },

    #[error("target `{target}` lists source `{}` outside its source root", file.display())]
    SourceOutsideRoot { target: String, file: PathBuf },

    #[error("cycle detected in target graph involving `{target}`")]
    CycleDetected { target: String },
}

impl GraphError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());

        match self {
            GraphError::UnknownDependency { dependency, .. } => diag.with_suggestion(format!(
                "Declare `{}` in the graph or remove the dependency",
                dependency
            )),
            GraphError::EmptyTarget { .. } => diag
                .with_context("recognised sources: .swift, .c, .m, .mm, .cpp, .cc, .cxx")
                .with_suggestion("Add at least one source file to the target"),
            GraphError::SourceOutsideRoot { .. } => diag
                .with_context("source paths must be relative to the target root, without `..`")
                .with_suggestion("Move the file under the target root or set the target's `root`"),
            GraphError::CycleDetected { .. } => diag.with_suggestion(
                "Break the cycle by removing or restructuring target dependencies",
            ),
            _ => diag,
        }
    }
}

macro_rules! index_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(usize);

        impl $name {
            /// Position in input order.
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

index_key!(
    /// Stable key of a package.
    PackageId
);
index_key!(
    /// Stable key of a target.
    TargetId
);
index_key!(
    /// Stable key of a product.
    ProductId
);

/// A dependency edge with its reference resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedDependency {
    Target(TargetId),
    Product(ProductId),
}

/// The resolved package graph.
#[derive(Debug, Clone)]
pub struct PackageGraph {
    packages: Vec<Package>,
    targets: Vec<Target>,
    products: Vec<Product>,

    target_package: Vec<PackageId>,
    target_deps: Vec<Vec<ResolvedDependency>>,
    product_targets: Vec<Vec<TargetId>>,

    package_index: HashMap<String, PackageId>,
    target_index: HashMap<String, TargetId>,
    product_index: HashMap<String, ProductId>,
}

fn index_names<K: Copy>(
    kind: &'static str,
    names: impl Iterator<Item = String>,
    key: impl Fn(usize) -> K,
) -> Result<HashMap<String, K>, GraphError> {
    let mut index = HashMap::new();
    for (i, name) in names.enumerate() {
        if index.insert(name.clone(), key(i)).is_some() {
            return Err(GraphError::DuplicateName { kind, name });
        }
    }
    Ok(index)
}

impl PackageGraph {
    /// Validate and index a resolved graph.
    ///
    /// The first package is the root package.
    pub fn new(
        packages: Vec<Package>,
        targets: Vec<Target>,
        products: Vec<Product>,
    ) -> Result<Self, GraphError> {
        if packages.is_empty() {
            return Err(GraphError::NoPackages);
        }

        let package_index =
            index_names("package", packages.iter().map(|p| p.name.clone()), PackageId)?;
        let target_index =
            index_names("target", targets.iter().map(|t| t.name.clone()), TargetId)?;
        let product_index =
            index_names("product", products.iter().map(|p| p.name.clone()), ProductId)?;

        let mut target_package = Vec::with_capacity(targets.len());
        let mut target_deps = Vec::with_capacity(targets.len());

        for target in &targets {
            if target.composition().is_none() {
                return Err(GraphError::EmptyTarget {
                    target: target.name.clone(),
                });
            }

            if let Some(file) = target.sources.escaping_file() {
                return Err(GraphError::SourceOutsideRoot {
                    target: target.name.clone(),
                    file: file.to_path_buf(),
                });
            }

            let package = package_index.get(&target.package).copied().ok_or_else(|| {
                GraphError::UnknownPackage {
                    target: target.name.clone(),
                    package: target.package.clone(),
                }
            })?;
            target_package.push(package);

            let deps = target
                .dependencies
                .iter()
                .map(|dep| match dep {
                    Dependency::Target(name) => target_index
                        .get(name)
                        .map(|id| ResolvedDependency::Target(*id))
                        .ok_or_else(|| GraphError::UnknownDependency {
                            target: target.name.clone(),
                            kind: "target",
                            dependency: name.clone(),
                        }),
                    Dependency::Product(name) => product_index
                        .get(name)
                        .map(|id| ResolvedDependency::Product(*id))
                        .ok_or_else(|| GraphError::UnknownDependency {
                            target: target.name.clone(),
                            kind: "product",
                            dependency: name.clone(),
                        }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            target_deps.push(deps);
        }

        let mut product_targets = Vec::with_capacity(products.len());
        for product in &products {
            if product.targets.is_empty() {
                return Err(GraphError::EmptyProduct {
                    product: product.name.clone(),
                });
            }

            let ids = product
                .targets
                .iter()
                .map(|name| {
                    target_index.get(name).copied().ok_or_else(|| {
                        GraphError::UnknownProductTarget {
                            product: product.name.clone(),
                            target: name.clone(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            product_targets.push(ids);
        }

        let graph = PackageGraph {
            packages,
            targets,
            products,
            target_package,
            target_deps,
            product_targets,
            package_index,
            target_index,
            product_index,
        };

        graph.check_acyclic()?;

        Ok(graph)
    }

    /// Reject cycles, including cycles that pass through products.
    fn check_acyclic(&self) -> Result<(), GraphError> {
        let mut graph: DiGraph<TargetId, ()> = DiGraph::with_capacity(self.targets.len(), 0);
        let nodes: Vec<NodeIndex> = self.target_ids().map(|id| graph.add_node(id)).collect();

        for id in self.target_ids() {
            for dep in self.compile_successors(id) {
                graph.update_edge(nodes[id.0], nodes[dep.0], ());
            }
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| GraphError::CycleDetected {
            target: self.targets[graph[cycle.node_id()].0].name.clone(),
        })
    }

    /// The root package.
    pub fn root_package(&self) -> &Package {
        &self.packages[0]
    }

    /// The root package key.
    pub fn root_package_id(&self) -> PackageId {
        PackageId(0)
    }

    /// Get a package.
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    /// Look up a package by name.
    pub fn package_id(&self, name: &str) -> Option<PackageId> {
        self.package_index.get(name).copied()
    }

    /// All package keys in input order.
    pub fn package_ids(&self) -> impl Iterator<Item = PackageId> {
        (0..self.packages.len()).map(PackageId)
    }

    /// Get a target.
    pub fn target(&self, id: TargetId) -> &Target {
        &self.targets[id.0]
    }

    /// Look up a target by name.
    pub fn target_id(&self, name: &str) -> Option<TargetId> {
        self.target_index.get(name).copied()
    }

    /// All target keys in input order.
    pub fn target_ids(&self) -> impl Iterator<Item = TargetId> {
        (0..self.targets.len()).map(TargetId)
    }

    /// The package owning a target.
    pub fn target_package(&self, id: TargetId) -> PackageId {
        self.target_package[id.0]
    }

    /// Resolved dependencies of a target, in declaration order.
    pub fn dependencies(&self, id: TargetId) -> &[ResolvedDependency] {
        &self.target_deps[id.0]
    }

    /// Get a product.
    pub fn product(&self, id: ProductId) -> &Product {
        &self.products[id.0]
    }

    /// Look up a product by name.
    pub fn product_id(&self, name: &str) -> Option<ProductId> {
        self.product_index.get(name).copied()
    }

    /// All product keys in input order.
    pub fn product_ids(&self) -> impl Iterator<Item = ProductId> {
        (0..self.products.len()).map(ProductId)
    }

    /// Constituent targets of a product.
    pub fn product_targets(&self, id: ProductId) -> &[TargetId] {
        &self.product_targets[id.0]
    }

    /// Number of packages.
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Number of targets.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Number of products.
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Targets whose modules are visible when compiling `id`.
    ///
    /// Product dependencies expand to the product's targets regardless of
    /// product kind: a dynamic library is still imported at compile time.
    pub fn compile_successors(&self, id: TargetId) -> Vec<TargetId> {
        let mut out = Vec::new();
        for dep in self.dependencies(id) {
            match *dep {
                ResolvedDependency::Target(t) => out.push(t),
                ResolvedDependency::Product(p) => out.extend_from_slice(self.product_targets(p)),
            }
        }
        out
    }

    /// Every target reachable from `id`, excluding `id` itself.
    ///
    /// Each target precedes its own dependencies; siblings keep declaration
    /// order.
    pub fn transitive_dependencies(&self, id: TargetId) -> Vec<TargetId> {
        let mut order = topological_sort(&[id], |t| self.compile_successors(t));
        order.retain(|t| *t != id);
        order
    }

    /// All targets ordered so that dependencies come before dependents.
    pub fn dependency_first_order(&self) -> Vec<TargetId> {
        let roots: Vec<TargetId> = self.target_ids().collect();
        let mut order = topological_sort(&roots, |t| self.compile_successors(t));
        order.reverse();
        order
    }

    /// Packages directly depended upon by `pkg`'s targets, in input order.
    pub fn package_dependencies(&self, pkg: PackageId) -> Vec<PackageId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for id in self.target_ids().filter(|t| self.target_package(*t) == pkg) {
            for dep in self.compile_successors(id) {
                let dep_pkg = self.target_package(dep);
                if dep_pkg != pkg && seen.insert(dep_pkg) {
                    out.push(dep_pkg);
                }
            }
        }

        out
    }

    /// Packages reachable from the root, breadth-first, root first.
    ///
    /// Packages the root cannot reach are appended in input order so that
    /// every package in the graph is visited exactly once.
    pub fn packages_root_first(&self) -> Vec<PackageId> {
        let mut seen = HashSet::new();
        let mut order = Vec::with_capacity(self.packages.len());
        let mut queue = VecDeque::from([self.root_package_id()]);
        seen.insert(self.root_package_id());

        while let Some(pkg) = queue.pop_front() {
            order.push(pkg);
            for dep in self.package_dependencies(pkg) {
                if seen.insert(dep) {
                    queue.push_back(dep);
                }
            }
        }

        for pkg in self.package_ids() {
            if seen.insert(pkg) {
                order.push(pkg);
            }
        }

        order
    }
}

/// Depth-first topological sort with a stable tie-break.
///
/// Every node precedes all of its successors. Among nodes with no ordering
/// constraint, roots and successors keep the order they were given in. The
/// input must be acyclic.
pub fn topological_sort<T, F>(roots: &[T], mut successors: F) -> Vec<T>
where
    T: Copy + Eq + Hash,
    F: FnMut(T) -> Vec<T>,
{
    fn visit<T, F>(node: T, successors: &mut F, visited: &mut HashSet<T>, out: &mut Vec<T>)
    where
        T: Copy + Eq + Hash,
        F: FnMut(T) -> Vec<T>,
    {
        if !visited.insert(node) {
            return;
        }
        for next in successors(node).into_iter().rev() {
            visit(next, successors, visited, out);
        }
        out.push(node);
    }

    let mut visited = HashSet::new();
    let mut out = Vec::new();

    for root in roots.iter().rev() {
        visit(*root, &mut successors, &mut visited, &mut out);
    }

    out.reverse();
    out
}
