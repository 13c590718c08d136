//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod hash;

pub use config::ToolchainConfig;
pub use diagnostic::Diagnostic;
