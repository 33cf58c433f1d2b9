//! Flag and completion discriminators

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a command flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Presence-only switch (`--json`)
    Boolean,
    /// Flag taking a value (`--target prod`)
    Option,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKind::Boolean => write!(f, "boolean"),
            FlagKind::Option => write!(f, "option"),
        }
    }
}

impl FromStr for FlagKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boolean" | "bool" => Ok(FlagKind::Boolean),
            "option" | "string" => Ok(FlagKind::Option),
            _ => Err(format!("Unknown flag type: {}", s)),
        }
    }
}

impl FlagKind {
    /// Returns true if the flag consumes a value
    pub fn takes_value(&self) -> bool {
        matches!(self, FlagKind::Option)
    }
}

/// How the values of an option flag are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    /// Values are known when the script is generated
    Static,
    /// Values are computed by the CLI at completion time
    Dynamic,
}

impl fmt::Display for CompletionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionKind::Static => write!(f, "static"),
            CompletionKind::Dynamic => write!(f, "dynamic"),
        }
    }
}
