//! Test utilities for Quay unit tests.
//!
//! Fixed build parameters (so argument lists are reproducible across hosts)
//! and helpers for laying out public headers on disk.

pub mod fixtures;

pub use fixtures::*;
