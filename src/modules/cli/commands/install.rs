//! Install command: build the cache and print setup instructions

use autocomplete_core::{AutocompleteError, Result};
use autocomplete_generator::{CacheLayout, CacheWriter};
use autocomplete_types::Shell;
use clap::Args;
use tracing::info;

use super::{parse_shell, Context};

/// Build the completion cache and print setup instructions
#[derive(Args, Debug)]
pub struct InstallCommand {
    /// Shell to install for (bash, zsh, powershell); defaults to $SHELL
    pub shell: Option<String>,

    /// Rebuild the cache even if it already exists
    #[arg(short = 'r', long = "refresh-cache")]
    pub refresh_cache: bool,
}

impl InstallCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let shell = self.shell(std::env::var("SHELL").ok().as_deref())?;
        let (registry, cache_dir) = ctx.load()?;
        let loader = ctx.loader();
        let writer = CacheWriter::new(&registry, &cache_dir, &loader);

        if self.refresh_cache || !writer.is_populated(shell) {
            info!("Building the autocomplete cache for {}", registry.bin);
            writer.write_all().await?;
        }

        println!("{}", instructions(writer.layout(), shell, &registry.bin));
        Ok(())
    }

    /// Shell from the argument, falling back to `$SHELL`
    fn shell(&self, env_shell: Option<&str>) -> Result<Shell> {
        match (&self.shell, env_shell) {
            (Some(name), _) => parse_shell(name),
            (None, Some(path)) if !path.is_empty() => Shell::from_path(path)
                .ok_or_else(|| AutocompleteError::UnsupportedShell(path.to_string())),
            _ => Err(AutocompleteError::UnsupportedShell(
                "no shell given and $SHELL is not set".to_string(),
            )),
        }
    }
}

/// Setup instructions for one shell
pub fn instructions(layout: &CacheLayout, shell: Shell, bin: &str) -> String {
    let profile = layout.profile_hint(shell);
    let line = layout.profile_line(shell);

    let (reload, tab, note) = match shell {
        Shell::Bash => (format!("source {}", profile), "<TAB><TAB>", ""),
        Shell::Zsh => (
            format!("source {}", profile),
            "<TAB>",
            "\nNOTE: if completions do not show up, run `compaudit -D` to fix insecure directories.\n",
        ),
        Shell::Powershell => (format!(". {}", profile), "<TAB>", ""),
    };

    format!(
        r#"
Setup instructions for {bin} CLI autocomplete ({shell})

1) Add the setup line to {profile}:

  {line}

2) Reload your profile:

  {reload}

3) Test it out, e.g.:

  $ {bin} {tab}                 # command completion
  $ {bin} command --{tab}       # flag completion
{note}
Enjoy!
"#,
        bin = bin,
        shell = shell,
        profile = profile,
        line = line,
        reload = reload,
        tab = tab,
        note = note,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_context;
    use autocomplete_core::Registry;

    fn command(shell: Option<&str>, refresh_cache: bool) -> InstallCommand {
        InstallCommand {
            shell: shell.map(str::to_string),
            refresh_cache,
        }
    }

    #[test]
    fn test_shell_detection() {
        assert_eq!(command(Some("zsh"), false).shell(None).unwrap(), Shell::Zsh);
        assert_eq!(
            command(None, false).shell(Some("/bin/bash")).unwrap(),
            Shell::Bash
        );
        assert_eq!(
            command(Some("pwsh"), false).shell(Some("/bin/bash")).unwrap(),
            Shell::Powershell
        );
    }

    #[test]
    fn test_shell_detection_failures() {
        for (arg, env) in [(None, None), (None, Some("")), (None, Some("/bin/fish")), (Some("fish"), None)] {
            let err = command(arg, false).shell(env).unwrap_err();
            assert!(matches!(err, AutocompleteError::UnsupportedShell(_)));
            assert!(err.is_user_error());
        }
    }

    #[test]
    fn test_instructions() {
        let layout = CacheLayout::new("/home/me/.cache/my-cli", &Registry::new("my-cli"));

        let bash = instructions(&layout, Shell::Bash, "my-cli");
        assert!(bash.contains("~/.bashrc"));
        assert!(bash.contains(&layout.profile_line(Shell::Bash)));
        assert!(bash.contains("source ~/.bashrc"));

        let zsh = instructions(&layout, Shell::Zsh, "my-cli");
        assert!(zsh.contains("compaudit -D"));

        let ps = instructions(&layout, Shell::Powershell, "my-cli");
        assert!(ps.contains(". $PROFILE"));
        assert!(!ps.contains("compaudit"));
    }

    #[tokio::test]
    async fn test_install_builds_cache() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());

        command(Some("bash"), false).execute(&ctx).await.unwrap();
        let root = dir.path().join("cache/autocomplete");
        assert!(root.join("functions/bash/mycli.bash").is_file());
        assert!(root.join("functions/zsh/_mycli").is_file());

        // A populated cache is kept unless a refresh is requested
        std::fs::write(root.join("functions/bash/mycli.bash"), "stale").unwrap();
        command(Some("bash"), false).execute(&ctx).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(root.join("functions/bash/mycli.bash")).unwrap(),
            "stale"
        );

        command(Some("bash"), true).execute(&ctx).await.unwrap();
        assert_ne!(
            std::fs::read_to_string(root.join("functions/bash/mycli.bash")).unwrap(),
            "stale"
        );
    }
}
