//! `quay flags` command

use anyhow::Result;

use quay::builder::TargetDescription;

use crate::cli::FlagsArgs;
use crate::commands::Session;

pub fn execute(args: FlagsArgs) -> Result<()> {
    let session = Session::load(&args.options)?;
    let plan = session.plan()?;
    let target = plan.target_description(&args.target)?;

    let (kind, compiler) = match target {
        TargetDescription::Managed(_) => ("managed", &session.params.toolchain.managed_compiler),
        TargetDescription::Native(_) => ("native", &session.params.toolchain.native_compiler),
    };

    println!(
        "# Compile arguments for `{}` ({}, module {}):",
        target.name(),
        kind,
        target.module_name()
    );
    println!("  {}", compiler.display());
    for arg in target.compile_arguments() {
        println!("  {}", arg);
    }

    if let TargetDescription::Managed(managed) = target {
        if !managed.native_arguments.is_empty() {
            println!();
            println!("# C-family arguments for private sources:");
            for arg in &managed.native_arguments {
                println!("  {}", arg);
            }
        }
    }

    println!();
    println!("# Objects:");
    for object in target.objects() {
        println!("  {}", object.display());
    }

    match target.module_map() {
        Some(map) => println!("\n# Module map: {}", map.path.display()),
        None => println!("\n# Module map: (none)"),
    }

    println!("# Fingerprint: {}", target.fingerprint());

    Ok(())
}
