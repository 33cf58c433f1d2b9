//! Environment placeholder substitution for manifests

use autocomplete_core::AutocompleteError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder syntax: {{ env.VAR_NAME }}
static ENV_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*env\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap()
});

/// Replaces `{{ env.VAR }}` placeholders with environment values
pub struct EnvSubstitutor {
    /// Fail on unset variables instead of leaving the placeholder
    strict: bool,
}

impl EnvSubstitutor {
    /// Strict substitutor: unset variables are an error
    pub fn new() -> Self {
        Self { strict: true }
    }

    /// Lenient substitutor: unset variables keep their placeholder
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Substitute every placeholder in `content`
    pub fn substitute(&self, content: &str) -> Result<String, AutocompleteError> {
        // A .env next to the working directory is optional
        let _ = dotenvy::dotenv();

        let mut missing: Vec<String> = Vec::new();
        let result = ENV_PATTERN.replace_all(content, |cap: &regex::Captures| {
            let name = &cap[1];
            match std::env::var(name) {
                Ok(value) => value,
                Err(_) => {
                    if self.strict && !missing.iter().any(|m| m == name) {
                        missing.push(name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });

        if !missing.is_empty() {
            return Err(AutocompleteError::Manifest(format!(
                "Environment variable(s) not set: {}",
                missing.join(", ")
            )));
        }

        Ok(result.into_owned())
    }

    /// Returns true if `content` has at least one placeholder
    pub fn has_placeholders(content: &str) -> bool {
        ENV_PATTERN.is_match(content)
    }
}

impl Default for EnvSubstitutor {
    fn default() -> Self {
        Self::new()
    }
}
