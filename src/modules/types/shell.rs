//! Supported completion dialects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shells a completion script can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    /// GNU bash
    Bash,
    /// Z shell
    Zsh,
    /// PowerShell (pwsh 7+)
    Powershell,
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shell::Bash => write!(f, "bash"),
            Shell::Zsh => write!(f, "zsh"),
            Shell::Powershell => write!(f, "powershell"),
        }
    }
}

impl FromStr for Shell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "powershell" | "pwsh" => Ok(Shell::Powershell),
            _ => Err(format!("Unsupported shell: {}", s)),
        }
    }
}

impl Shell {
    /// Returns all supported shells
    pub fn all() -> &'static [Shell] {
        &[Shell::Bash, Shell::Zsh, Shell::Powershell]
    }

    /// Detect the shell from a `$SHELL`-style path such as `/usr/bin/zsh`
    pub fn from_path(path: &str) -> Option<Shell> {
        let name = path
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(path)
            .trim_end_matches(".exe");
        name.parse().ok()
    }

    /// File name of the generated completion function for `bin`
    pub fn function_file_name(&self, bin: &str) -> String {
        match self {
            Shell::Bash => format!("{}.bash", bin),
            Shell::Zsh => format!("_{}", bin),
            Shell::Powershell => format!("{}.ps1", bin),
        }
    }

    /// Returns true if the legacy (flat) generator supports this shell
    pub fn has_legacy_generator(&self) -> bool {
        matches!(self, Shell::Bash | Shell::Zsh)
    }
}
