//! Manifest parsing for the autocomplete generator
//!
//! This crate reads the registry snapshot (JSON or YAML manifest),
//! substitutes environment placeholders, validates it, and loads full
//! command definitions from their source files.

pub mod env;
pub mod loader;
pub mod manifest;
pub mod validator;

pub use loader::FileCommandLoader;
pub use manifest::ManifestParser;
pub use validator::ManifestValidator;

use autocomplete_core::{AutocompleteError, Registry};
use std::path::Path;

/// Parse and validate a manifest file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Registry, AutocompleteError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        AutocompleteError::Manifest(format!("Failed to read file '{}': {}", path.display(), e))
    })?;

    parse_string(&content)
}

/// Parse and validate a manifest from a string
pub fn parse_string(content: &str) -> Result<Registry, AutocompleteError> {
    let registry = ManifestParser::parse(content)?;

    let validator = ManifestValidator::new();
    validator.validate(&registry)?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_manifest() {
        let yaml = r#"
bin: mycli
commands:
  deploy:
    summary: Deploy a project
    flags:
      json:
        type: boolean
"#;
        let registry = parse_string(yaml).unwrap();
        assert_eq!(registry.bin, "mycli");
        assert_eq!(registry.commands().count(), 1);
    }

    #[test]
    fn test_parse_invalid_manifest_rejected() {
        let yaml = r#"
bin: mycli
commands:
  "deploy::functions": {}
"#;
        assert!(parse_string(yaml).is_err());
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
