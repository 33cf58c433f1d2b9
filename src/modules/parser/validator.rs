//! Manifest validation

use autocomplete_core::{AutocompleteError, Command, Flag, Registry};
use autocomplete_types::{CompletionKind, FlagKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Executable names usable in shell function names and file names
static BIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

/// Characters that would break the value lists embedded in scripts, or that
/// the summary escaping would rewrite into visible backslashes
const RESERVED_VALUE_CHARS: &[char] = &[
    ' ', '\t', '\n', ',', '|', '"', '`', '$', '\\', '[', ']',
];

/// Manifest validator
pub struct ManifestValidator {
    /// Whether to check executable names against the allowed pattern
    strict_bin: bool,
}

impl ManifestValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self { strict_bin: true }
    }

    /// Create a validator that accepts any non-empty executable name
    pub fn lenient() -> Self {
        Self { strict_bin: false }
    }

    /// Validate the whole registry, returning the first problem found
    pub fn validate(&self, registry: &Registry) -> Result<(), AutocompleteError> {
        self.validate_bin(&registry.bin)?;
        for alias in &registry.bin_aliases {
            self.validate_bin(alias)?;
        }
        self.validate_separator(&registry.topic_separator)?;
        self.validate_commands(registry)?;
        Ok(())
    }

    fn validate_bin(&self, bin: &str) -> Result<(), AutocompleteError> {
        if bin.is_empty() {
            return Err(AutocompleteError::Validation(
                "Executable name cannot be empty".to_string(),
            ));
        }

        if self.strict_bin && !BIN_PATTERN.is_match(bin) {
            return Err(AutocompleteError::Validation(format!(
                "Invalid executable name '{}': only letters, digits, '.', '_' and '-' are allowed",
                bin
            )));
        }

        Ok(())
    }

    fn validate_separator(&self, separator: &str) -> Result<(), AutocompleteError> {
        if separator != ":" && separator != " " {
            return Err(AutocompleteError::Validation(format!(
                "Invalid topic separator '{}': must be ':' or ' '",
                separator
            )));
        }
        Ok(())
    }

    fn validate_commands(&self, registry: &Registry) -> Result<(), AutocompleteError> {
        let mut ids = HashSet::new();

        for command in registry.commands() {
            validate_id(&command.id, "Command id")?;

            if !ids.insert(command.id.as_str()) {
                return Err(AutocompleteError::Validation(format!(
                    "Duplicate command id: '{}'",
                    command.id
                )));
            }

            for alias in &command.aliases {
                validate_id(alias, "Alias")?;
            }

            self.validate_flags(command)?;
        }

        Ok(())
    }

    fn validate_flags(&self, command: &Command) -> Result<(), AutocompleteError> {
        let mut chars = HashSet::new();

        for flag in command.flags.values() {
            if flag.name.is_empty() {
                return Err(AutocompleteError::Validation(format!(
                    "Command '{}' has a flag with an empty name",
                    command.id
                )));
            }

            if flag.name.starts_with('-') || flag.name.chars().any(char::is_whitespace) {
                return Err(AutocompleteError::Validation(format!(
                    "Invalid flag name '{}' on command '{}'",
                    flag.name, command.id
                )));
            }

            if let Some(c) = flag.char {
                if !c.is_ascii_alphanumeric() {
                    return Err(AutocompleteError::Validation(format!(
                        "Invalid short flag '{}' on command '{}'",
                        c, command.id
                    )));
                }
                if !chars.insert(c) {
                    return Err(AutocompleteError::Validation(format!(
                        "Duplicate short flag '-{}' on command '{}'",
                        c, command.id
                    )));
                }
            }

            self.validate_completion(command, flag)?;
        }

        Ok(())
    }

    fn validate_completion(&self, command: &Command, flag: &Flag) -> Result<(), AutocompleteError> {
        if flag.kind == FlagKind::Boolean && (!flag.options.is_empty() || flag.completion.is_some())
        {
            return Err(AutocompleteError::Validation(format!(
                "Boolean flag '{}' on command '{}' cannot declare value completions",
                flag.name, command.id
            )));
        }

        let completion_options = flag.completion.iter().flat_map(|c| c.options.iter());
        for value in flag.options.iter().chain(completion_options) {
            if value.is_empty() || value.contains(RESERVED_VALUE_CHARS) {
                return Err(AutocompleteError::Validation(format!(
                    "Invalid option value '{}' for flag '{}' on command '{}'",
                    value, flag.name, command.id
                )));
            }
        }

        let Some(completion) = &flag.completion else {
            return Ok(());
        };

        if completion.kind == CompletionKind::Dynamic {
            let has_command = completion
                .command
                .as_deref()
                .map(|c| !c.trim().is_empty())
                .unwrap_or(false);
            if !has_command {
                return Err(AutocompleteError::Validation(format!(
                    "Dynamic completion for flag '{}' on command '{}' has no command",
                    flag.name, command.id
                )));
            }
        }

        if completion.cache_duration == Some(0) {
            return Err(AutocompleteError::Validation(format!(
                "Cache duration for flag '{}' on command '{}' must be positive",
                flag.name, command.id
            )));
        }

        Ok(())
    }
}

impl Default for ManifestValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Ids are colon-delimited, with no empty segment and no whitespace
fn validate_id(id: &str, what: &str) -> Result<(), AutocompleteError> {
    if id.is_empty() {
        return Err(AutocompleteError::Validation(format!(
            "{} cannot be empty",
            what
        )));
    }

    if id.split(':').any(str::is_empty) || id.chars().any(char::is_whitespace) {
        return Err(AutocompleteError::Validation(format!(
            "Invalid {} '{}': segments must be non-empty and contain no whitespace",
            what.to_lowercase(),
            id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocomplete_core::{FlagCompletion, Plugin};

    fn registry_with(command: Command) -> Registry {
        Registry::new("mycli").with_plugin(Plugin::new("core").with_command(command))
    }

    #[test]
    fn test_valid_registry() {
        let registry = registry_with(
            Command::new("deploy:functions")
                .with_flag(Flag::option("branch").with_char('b'))
                .with_flag(Flag::boolean("json")),
        );
        assert!(ManifestValidator::new().validate(&registry).is_ok());
    }

    #[test]
    fn test_invalid_bin() {
        let registry = Registry::new("my cli");
        assert!(ManifestValidator::new().validate(&registry).is_err());
        assert!(ManifestValidator::lenient().validate(&registry).is_ok());
        assert!(ManifestValidator::lenient()
            .validate(&Registry::new(""))
            .is_err());
    }

    #[test]
    fn test_invalid_separator() {
        let mut registry = Registry::new("mycli");
        registry.topic_separator = "/".to_string();
        let err = ManifestValidator::new().validate(&registry).unwrap_err();
        assert!(err.to_string().contains("topic separator"));
    }

    #[test]
    fn test_invalid_ids() {
        for id in ["", "deploy::functions", ":deploy", "deploy ", "dep loy"] {
            let registry = registry_with(Command::new(id));
            assert!(
                ManifestValidator::new().validate(&registry).is_err(),
                "id {:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_duplicate_ids_across_plugins() {
        let registry = registry_with(Command::new("deploy"))
            .with_plugin(Plugin::new("other").with_command(Command::new("deploy")));
        let err = ManifestValidator::new().validate(&registry).unwrap_err();
        assert!(err.to_string().contains("Duplicate command id"));
    }

    #[test]
    fn test_duplicate_short_flag() {
        let registry = registry_with(
            Command::new("deploy")
                .with_flag(Flag::option("branch").with_char('b'))
                .with_flag(Flag::boolean("bare").with_char('b')),
        );
        let err = ManifestValidator::new().validate(&registry).unwrap_err();
        assert!(err.to_string().contains("-b"));
    }

    #[test]
    fn test_dynamic_completion_needs_command() {
        let mut completion = FlagCompletion::dynamic("git branch");
        completion.command = None;
        let registry = registry_with(
            Command::new("deploy").with_flag(Flag::option("branch").with_completion(completion)),
        );
        assert!(ManifestValidator::new().validate(&registry).is_err());
    }

    #[test]
    fn test_zero_cache_duration() {
        let registry = registry_with(Command::new("deploy").with_flag(
            Flag::option("branch")
                .with_completion(FlagCompletion::dynamic("git branch").with_cache_duration(0)),
        ));
        let err = ManifestValidator::new().validate(&registry).unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_option_values_reserved_chars() {
        for value in ["a b", "a,b", "a|b", "", "a\"b", "`cmd`", "$HOME", r"a\b", "[x]"] {
            let registry = registry_with(
                Command::new("deploy").with_flag(Flag::option("target").with_options([value])),
            );
            assert!(
                ManifestValidator::new().validate(&registry).is_err(),
                "value {:?} should be rejected",
                value
            );
        }

        let registry = registry_with(Command::new("deploy").with_flag(
            Flag::option("target").with_completion(FlagCompletion::fixed(["dev", "prod-eu", "v1.2", "team/app"])),
        ));
        assert!(ManifestValidator::new().validate(&registry).is_ok());
    }

    #[test]
    fn test_boolean_with_options() {
        let registry = registry_with(
            Command::new("deploy").with_flag(Flag::boolean("json").with_options(["a"])),
        );
        assert!(ManifestValidator::new().validate(&registry).is_err());
    }
}
