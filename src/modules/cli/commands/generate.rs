//! Generate command: print a completion script to stdout

use autocomplete_core::Result;
use clap::Args;

use super::{parse_shell, Context};

/// Print a completion script to stdout
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Shell (bash, zsh, powershell)
    pub shell: String,

    /// Flat script compiled from the generic completion spec (bash, zsh)
    #[arg(long)]
    pub legacy: bool,
}

impl GenerateCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        print!("{}", self.render(ctx).await?);
        Ok(())
    }

    async fn render(&self, ctx: &Context) -> Result<String> {
        let shell = parse_shell(&self.shell)?;
        let (registry, _) = ctx.load()?;

        if self.legacy {
            autocomplete_generator::generate_legacy(shell, &registry)
        } else {
            autocomplete_generator::generate(shell, &registry, &ctx.loader()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_context;
    use autocomplete_core::AutocompleteError;

    fn command(shell: &str, legacy: bool) -> GenerateCommand {
        GenerateCommand {
            shell: shell.to_string(),
            legacy,
        }
    }

    #[tokio::test]
    async fn test_generate_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());

        for shell in ["bash", "zsh", "powershell"] {
            let first = command(shell, false).render(&ctx).await.unwrap();
            let second = command(shell, false).render(&ctx).await.unwrap();
            assert_eq!(first, second, "{} output differs", shell);
        }
    }

    #[tokio::test]
    async fn test_generate_zsh_uses_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        let zsh = command("zsh", false).render(&ctx).await.unwrap();
        let cache = dir.path().join("cache/autocomplete/flag_completion_cache");
        assert!(zsh.contains(&cache.display().to_string()));
    }

    #[tokio::test]
    async fn test_generate_legacy_powershell_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        let err = command("powershell", true).render(&ctx).await.unwrap_err();
        assert!(matches!(err, AutocompleteError::UnsupportedShell(_)));
    }
}
