//! `quay linkplan` command

use anyhow::Result;

use crate::cli::LinkplanArgs;
use crate::commands::Session;

pub fn execute(args: LinkplanArgs) -> Result<()> {
    let session = Session::load(&args.options)?;
    let plan = session.plan()?;
    let product = plan.product_description(&args.product)?;

    println!("# Link plan for `{}` ({}):", product.product, product.kind);
    println!("# Output: {}", product.output.display());
    println!();

    println!("# Link order:");
    for (i, target) in product.linked_targets.iter().enumerate() {
        println!("  {}. {}", i + 1, target);
    }

    if !product.dynamic_libraries.is_empty() {
        println!();
        println!("# Dynamic libraries:");
        for lib in &product.dynamic_libraries {
            println!("  -l{}", lib);
        }
    }

    println!();
    println!("# Link arguments:");
    for arg in &product.link_arguments {
        println!("  {}", arg);
    }

    Ok(())
}
