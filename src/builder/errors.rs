//! Build planning error types and diagnostics.

use std::collections::BTreeSet;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error raised while building or querying a [`BuildPlan`](crate::builder::BuildPlan).
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildPlanError {
    /// A package does not accept the toolchain's language version.
    #[error(
        "package `{package}` requires language version {}, but the toolchain provides {current}",
        format_versions(.required)
    )]
    #[diagnostic(code(quay::plan::incompatible_version))]
    IncompatibleVersion {
        package: String,
        required: BTreeSet<u32>,
        current: u32,
    },

    /// A target name is not part of the plan.
    #[error("target `{name}` not found in build plan")]
    #[diagnostic(code(quay::plan::target_not_found))]
    TargetNotFound { name: String },

    /// A product name is not part of the plan.
    #[error("product `{name}` not found in build plan")]
    #[diagnostic(code(quay::plan::product_not_found))]
    ProductNotFound { name: String },

    /// Reading a public headers directory failed.
    #[error("failed to probe public headers in {}", .path.display())]
    #[diagnostic(code(quay::plan::header_probe))]
    HeaderProbe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_versions(versions: &BTreeSet<u32>) -> String {
    let list: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
    format!("[{}]", list.join(", "))
}

impl BuildPlanError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildPlanError::IncompatibleVersion {
                package,
                required,
                current,
            } => Diagnostic::error(format!(
                "package `{}` is not compatible with language version {}",
                package, current
            ))
            .with_context(format!(
                "`{}` declares language versions {}",
                package,
                format_versions(required)
            ))
            .with_suggestion("Use a toolchain that implements one of the declared versions")
            .with_suggestion(format!(
                "Update `{}` to a release that supports version {}",
                package, current
            )),

            BuildPlanError::TargetNotFound { name } => {
                Diagnostic::error(format!("could not find target `{}`", name))
                    .with_suggestion("Run `quay plan --summary` to check the graph loads, then compare target names")
            }

            BuildPlanError::ProductNotFound { name } => {
                Diagnostic::error(format!("could not find product `{}`", name))
                    .with_suggestion("Check the `[[product]]` entries in the graph description")
            }

            BuildPlanError::HeaderProbe { path, source } => {
                Diagnostic::error(format!("failed to read public headers: {}", source))
                    .with_location(path)
            }
        }
    }
}
