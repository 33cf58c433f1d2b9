//! Type definitions for the autocomplete generator
//!
//! This crate contains shared type definitions used across the workspace,
//! including the supported shells and the flag/completion discriminators.

pub mod flag;
pub mod shell;

pub use flag::{CompletionKind, FlagKind};
pub use shell::Shell;
