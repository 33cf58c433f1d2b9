//! Autocomplete CLI
//!
//! This crate provides the command-line interface for the completion generator:
//! - install: Build the cache and print setup instructions
//! - create: Write every completion script and setup file
//! - script: Print the shell profile line
//! - generate: Print a completion script to stdout
//! - options: Dynamic flag values for generated scripts (hidden)

pub mod commands;

pub use commands::{Cli, Commands, Context};
