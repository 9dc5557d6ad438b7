//! CLI driver for the locator synthesis engine
//!
//! Loads a virtual document from JSON, runs synthesis or validation
//! against a chosen target node, and prints the outcome as JSON.

pub mod cli;

pub use cli::{run, Cli};
