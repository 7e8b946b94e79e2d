//! Tooling & Integration Layer
//!
//! Command-line access to a sled-backed graph: bootstrap its indexes, resolve
//! identities, inspect stored edges and connect written records.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
