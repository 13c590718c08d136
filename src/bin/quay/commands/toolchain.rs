//! `quay toolchain` command

use anyhow::Result;

use crate::cli::ToolchainArgs;
use crate::commands::Session;

pub fn execute(args: ToolchainArgs) -> Result<()> {
    let session = Session::load(&args.options)?;
    let params = &session.params;
    let toolchain = &params.toolchain;

    println!("managed compiler:  {}", toolchain.managed_compiler.display());
    println!("native compiler:   {}", toolchain.native_compiler.display());
    println!("language version:  {}", toolchain.language_version);
    if let Some(sdk) = &toolchain.default_sdk {
        println!("sdk:               {}", sdk.display());
    }
    println!("platform:          {}", params.platform);
    println!("configuration:     {}", params.configuration);
    println!("build path:        {}", params.build_path().display());
    println!("jobs:              {}", params.jobs);

    Ok(())
}
