//! Build plan generation.
//!
//! A BuildPlan holds one compile description per target and one link
//! description per product of a package graph. Construction is two-phase:
//! the whole graph is checked for language-version compatibility first, and
//! only then are descriptions synthesized, dependencies before dependents.
//! The finished plan is immutable.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::compat::CompatibilityChecker;
use crate::builder::context::BuildParameters;
use crate::builder::errors::BuildPlanError;
use crate::builder::product::{self, ProductDescription};
use crate::builder::target::{TargetDescription, TargetDescriptionBuilder};
use crate::core::{PackageGraph, TargetId};

/// A complete build plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Parameters the plan was built with
    pub parameters: BuildParameters,

    /// Target descriptions, in graph input order
    pub targets: Vec<TargetDescription>,

    /// Product descriptions, in graph input order
    pub products: Vec<ProductDescription>,

    /// Target names, dependencies before dependents
    pub build_order: Vec<String>,
}

impl BuildPlan {
    /// Build the plan for `graph`.
    ///
    /// Fails without producing any description if a package rejects the
    /// toolchain's language version, or if probing public headers fails.
    pub fn new(params: &BuildParameters, graph: &PackageGraph) -> Result<Self, BuildPlanError> {
        CompatibilityChecker::new(graph, params.toolchain.language_version).check()?;

        // Closures are walked once per target and shared by every consumer
        let closures: Vec<Vec<TargetId>> = graph
            .target_ids()
            .map(|id| graph.transitive_dependencies(id))
            .collect();

        let order = graph.dependency_first_order();
        let mut built: BTreeMap<TargetId, TargetDescription> = BTreeMap::new();

        for &id in &order {
            let description = TargetDescriptionBuilder::new(params, graph, &built)
                .build(id, &closures[id.index()])?;
            built.insert(id, description);
        }

        let products: Vec<ProductDescription> = graph
            .product_ids()
            .map(|id| product::describe(params, graph, id, &built))
            .collect();

        let plan = BuildPlan {
            parameters: params.clone(),
            build_order: order
                .iter()
                .map(|id| graph.target(*id).name.clone())
                .collect(),
            targets: built.into_values().collect(),
            products,
        };

        tracing::info!(
            "planned {} targets and {} products ({})",
            plan.target_count(),
            plan.product_count(),
            params.configuration
        );

        Ok(plan)
    }

    /// Look up a target's description.
    pub fn target_description(&self, name: &str) -> Result<&TargetDescription, BuildPlanError> {
        self.targets
            .iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| BuildPlanError::TargetNotFound {
                name: name.to_string(),
            })
    }

    /// Look up a product's description.
    pub fn product_description(&self, name: &str) -> Result<&ProductDescription, BuildPlanError> {
        self.products
            .iter()
            .find(|d| d.product == name)
            .ok_or_else(|| BuildPlanError::ProductNotFound {
                name: name.to_string(),
            })
    }

    /// Target descriptions in graph input order.
    pub fn targets(&self) -> impl Iterator<Item = &TargetDescription> {
        self.targets.iter()
    }

    /// Product descriptions in graph input order.
    pub fn products(&self) -> impl Iterator<Item = &ProductDescription> {
        self.products.iter()
    }

    /// Get the number of target descriptions.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Get the number of product descriptions.
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Emit compile_commands.json for IDE integration.
    ///
    /// Covers every C-family source, including the private sources of
    /// mixed targets.
    pub fn emit_compile_commands(&self, path: &Path) -> Result<usize> {
        let compiler = self.parameters.toolchain.native_compiler.display().to_string();
        let compiler = compiler.as_str();

        let commands: Vec<CompileCommand> = self
            .targets
            .iter()
            .flat_map(|target| {
                let (units, args) = target.native_units();
                units.iter().map(move |unit| {
                    let mut arguments = Vec::with_capacity(args.len() + 5);
                    arguments.push(compiler.to_string());
                    arguments.extend(args.iter().cloned());
                    arguments.push("-c".to_string());
                    arguments.push(unit.source.display().to_string());
                    arguments.push("-o".to_string());
                    arguments.push(unit.object.display().to_string());

                    CompileCommand {
                        directory: unit
                            .source
                            .parent()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| ".".to_string()),
                        file: unit.source.display().to_string(),
                        arguments,
                        output: Some(unit.object.display().to_string()),
                    }
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&commands)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;

        tracing::debug!("wrote {} compile commands to {}", commands.len(), path.display());
        Ok(commands.len())
    }

    /// Write every module map in the plan to disk.
    pub fn write_module_maps(&self) -> Result<usize> {
        let mut written = 0;
        for map in self.targets.iter().filter_map(TargetDescription::module_map) {
            map.write()?;
            written += 1;
        }
        Ok(written)
    }
}

/// compile_commands.json entry.
#[derive(Debug, Serialize, Deserialize)]
struct CompileCommand {
    directory: String,
    file: String,
    arguments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}
