//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use quay::builder::toolchain::Platform;

/// Quay - build-plan synthesis for Swift packages with C-family targets
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the complete build plan as JSON
    Plan(PlanArgs),

    /// Show compile arguments for a target
    Flags(FlagsArgs),

    /// Show the link order and arguments for a product
    Linkplan(LinkplanArgs),

    /// Show the resolved toolchain
    Toolchain(ToolchainArgs),
}

/// Options shared by every command that builds a plan.
#[derive(Args, Debug, Clone)]
pub struct PlanOptions {
    /// Path to the graph description (defaults to ./Quay.graph.toml)
    #[arg(long, env = "QUAY_GRAPH")]
    pub graph: Option<PathBuf>,

    /// Plan a release build
    #[arg(short, long)]
    pub release: bool,

    /// Root of build output (defaults to .build next to the graph)
    #[arg(long)]
    pub data_path: Option<PathBuf>,

    /// Number of parallel jobs passed to the managed compiler (defaults to
    /// the host's available parallelism; pass it for reproducible plans)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Target platform (darwin or linux, defaults to the host; pass it for
    /// reproducible plans)
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Managed compiler driver
    #[arg(long, env = "QUAY_SWIFTC")]
    pub swiftc: Option<PathBuf>,

    /// C-family compiler driver
    #[arg(long, env = "QUAY_CLANG")]
    pub clang: Option<PathBuf>,

    /// SDK passed to both drivers
    #[arg(long)]
    pub sdk: Option<PathBuf>,

    /// Language version implemented by the managed compiler
    #[arg(long)]
    pub language_version: Option<u32>,

    /// Extra managed compiler flag (repeatable)
    #[arg(long = "Xswiftc", value_name = "FLAG", allow_hyphen_values = true)]
    pub xswiftc: Vec<String>,

    /// Extra C-family compiler flag (repeatable)
    #[arg(long = "Xcc", value_name = "FLAG", allow_hyphen_values = true)]
    pub xcc: Vec<String>,

    /// Extra linker flag (repeatable)
    #[arg(long = "Xlinker", value_name = "FLAG", allow_hyphen_values = true)]
    pub xlinker: Vec<String>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub options: PlanOptions,

    /// Write compile_commands.json to this path
    #[arg(long, value_name = "PATH")]
    pub emit_compile_commands: Option<PathBuf>,

    /// Write generated module maps into the build directory
    #[arg(long)]
    pub write_module_maps: bool,

    /// Print a one-line summary instead of JSON
    #[arg(long)]
    pub summary: bool,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Target to show flags for
    pub target: String,

    #[command(flatten)]
    pub options: PlanOptions,
}

#[derive(Args)]
pub struct LinkplanArgs {
    /// Product to show link plan for
    pub product: String,

    #[command(flatten)]
    pub options: PlanOptions,
}

#[derive(Args)]
pub struct ToolchainArgs {
    #[command(flatten)]
    pub options: PlanOptions,
}
