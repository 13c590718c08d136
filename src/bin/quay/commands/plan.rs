//! `quay plan` command

use anyhow::Result;

use crate::cli::PlanArgs;
use crate::commands::Session;

pub fn execute(args: PlanArgs) -> Result<()> {
    let session = Session::load(&args.options)?;
    let plan = session.plan()?;

    if let Some(path) = &args.emit_compile_commands {
        let count = plan.emit_compile_commands(path)?;
        tracing::info!("wrote {} compile commands to {}", count, path.display());
    }

    if args.write_module_maps {
        let count = plan.write_module_maps()?;
        tracing::info!("wrote {} module maps", count);
    }

    if args.summary {
        println!(
            "{} targets, {} products ({})",
            plan.target_count(),
            plan.product_count(),
            plan.parameters.configuration
        );
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
