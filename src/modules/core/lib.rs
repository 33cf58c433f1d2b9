//! Core domain logic for the autocomplete generator
//!
//! This crate contains the registry model (plugins, commands, flags, topics),
//! the command-tree extraction shared by every shell generator, and the
//! error types used across the workspace.

pub mod domain;
pub mod error;
pub mod extract;
pub mod loader;
pub mod tree;

pub use domain::*;
pub use error::{AutocompleteError, Result};
pub use extract::{CommandSet, CompletionCommand, CompletionTopic};
pub use loader::{CachedLoader, CommandLoader};
pub use tree::{CommandTree, TreeNode};
