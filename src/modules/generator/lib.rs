//! Completion script generators
//!
//! This crate turns a registry snapshot into shell completion scripts:
//! - bash: plain-text command blocks matched at completion time
//! - zsh: one `_arguments` function per topic, with cached dynamic values
//! - powershell: a nested hashtable walked by `Register-ArgumentCompleter`
//! - legacy: flat bash/zsh scripts compiled by `clap_complete`

pub mod bash;
pub mod cache;
pub mod layout;
pub mod legacy;
pub mod options;
pub mod powershell;
pub mod sanitize;
pub mod template;
pub mod zsh;

pub use bash::BashGenerator;
pub use cache::CacheWriter;
pub use layout::CacheLayout;
pub use legacy::{CompletionSpec, LegacyGenerator};
pub use options::{resolve_flag_options, DynamicOptions, OptionsRequest, ShellOptions, OPTIONS_COMMAND};
pub use powershell::PowerShellGenerator;
pub use sanitize::{Dialect, Sanitizer};
pub use template::TemplateContext;
pub use zsh::ZshGenerator;

use autocomplete_core::{CommandLoader, Registry, Result};
use autocomplete_types::Shell;

/// Generate the completion script for `shell`
///
/// Only the zsh generator loads commands through `loader`; bash and
/// PowerShell use the flags cached in the registry.
pub async fn generate(shell: Shell, registry: &Registry, loader: &dyn CommandLoader) -> Result<String> {
    match shell {
        Shell::Bash => Ok(BashGenerator::new(registry).generate()),
        Shell::Zsh => ZshGenerator::new(registry).generate(loader).await,
        Shell::Powershell => PowerShellGenerator::new(registry).generate(),
    }
}

/// Generate the flat legacy script for `shell` (bash or zsh)
pub fn generate_legacy(shell: Shell, registry: &Registry) -> Result<String> {
    LegacyGenerator::new(registry).generate(shell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocomplete_core::{AutocompleteError, CachedLoader, Command, Plugin};

    fn registry() -> Registry {
        Registry::new("mycli")
            .with_plugin(Plugin::new("core").with_command(Command::new("deploy:functions")))
    }

    #[tokio::test]
    async fn test_generate_every_shell() {
        let registry = registry();
        let bash = generate(Shell::Bash, &registry, &CachedLoader).await.unwrap();
        assert!(bash.starts_with("#!/usr/bin/env bash"));

        let zsh = generate(Shell::Zsh, &registry, &CachedLoader).await.unwrap();
        assert!(zsh.starts_with("#compdef mycli"));

        let ps = generate(Shell::Powershell, &registry, &CachedLoader).await.unwrap();
        assert!(ps.contains("Register-ArgumentCompleter"));
    }

    #[test]
    fn test_generate_legacy() {
        let registry = registry();
        assert!(generate_legacy(Shell::Bash, &registry).unwrap().contains("deploy:functions"));
        assert!(matches!(
            generate_legacy(Shell::Powershell, &registry),
            Err(AutocompleteError::UnsupportedShell(_))
        ));
    }
}
