//! Error types for the autocomplete generator

use thiserror::Error;

/// Main error type for autocomplete operations
#[derive(Error, Debug)]
pub enum AutocompleteError {
    /// Manifest file could not be read or parsed
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Manifest content is inconsistent
    #[error("Validation error: {0}")]
    Validation(String),

    /// A command definition could not be loaded from its source
    #[error("Failed to load command '{0}': {1}")]
    CommandLoad(String, String),

    /// Command id (or alias) is not registered
    #[error("Command not found: {0}")]
    UnknownCommand(String),

    /// Flag is not defined on the command
    #[error("Flag '{1}' not found on command '{0}'")]
    UnknownFlag(String, String),

    /// Shell argument is missing or not one of bash, zsh, powershell
    #[error("Unsupported shell: {0}")]
    UnsupportedShell(String),

    /// Dynamic flag option lookup failed
    #[error("Dynamic options error: {0}")]
    DynamicOptions(String),

    /// Script rendering failed
    #[error("Render error: {0}")]
    Render(String),

    /// File system error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error (inconsistent command tree)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AutocompleteError {
    /// Returns true if the error was caused by user input rather than a bug
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AutocompleteError::Manifest(_)
                | AutocompleteError::Validation(_)
                | AutocompleteError::UnknownCommand(_)
                | AutocompleteError::UnknownFlag(_, _)
                | AutocompleteError::UnsupportedShell(_)
        )
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        if self.is_user_error() {
            2
        } else {
            1
        }
    }
}

/// Result type alias using AutocompleteError
pub type Result<T> = std::result::Result<T, AutocompleteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AutocompleteError::UnknownFlag("deploy".into(), "target".into());
        assert_eq!(err.to_string(), "Flag 'target' not found on command 'deploy'");

        let err = AutocompleteError::CommandLoad("deploy".into(), "no source".into());
        assert_eq!(err.to_string(), "Failed to load command 'deploy': no source");
    }

    #[test]
    fn test_error_is_user_error() {
        assert!(AutocompleteError::UnsupportedShell("fish".into()).is_user_error());
        assert!(AutocompleteError::Validation("bad".into()).is_user_error());
        assert!(!AutocompleteError::Internal("no command".into()).is_user_error());
    }

    #[test]
    fn test_error_exit_code() {
        assert_eq!(AutocompleteError::Manifest("x".into()).exit_code(), 2);
        assert_eq!(AutocompleteError::Render("x".into()).exit_code(), 1);
    }
}
