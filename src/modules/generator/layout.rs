//! On-disk cache layout and the setup scripts that source generated files

use autocomplete_core::Registry;
use autocomplete_types::Shell;
use std::path::{Path, PathBuf};

/// Directory under the CLI cache dir holding everything completion-related
pub const AUTOCOMPLETE_DIR: &str = "autocomplete";

/// Directory for cached dynamic flag values, relative to [`AUTOCOMPLETE_DIR`]
pub const FLAG_CACHE_DIR: &str = "flag_completion_cache";

/// Paths of generated scripts for one CLI
///
/// ```text
/// <cache_dir>/autocomplete/
///   functions/bash/<bin>.bash
///   functions/zsh/_<bin>
///   functions/powershell/<bin>.ps1
///   bash_setup
///   zsh_setup
///   powershell_setup.ps1
///   flag_completion_cache/
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLayout {
    root: PathBuf,
    bin: String,
    env_prefix: String,
}

impl CacheLayout {
    /// Layout rooted at `<cache_dir>/autocomplete`
    pub fn new(cache_dir: impl AsRef<Path>, registry: &Registry) -> Self {
        Self {
            root: cache_dir.as_ref().join(AUTOCOMPLETE_DIR),
            bin: registry.bin.clone(),
            env_prefix: registry.env_prefix(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn functions_dir(&self, shell: Shell) -> PathBuf {
        self.root.join("functions").join(shell.to_string())
    }

    /// Completion function file for `shell`
    pub fn function_file(&self, shell: Shell) -> PathBuf {
        self.functions_dir(shell)
            .join(shell.function_file_name(&self.bin))
    }

    pub fn setup_file(&self, shell: Shell) -> PathBuf {
        match shell {
            Shell::Powershell => self.root.join("powershell_setup.ps1"),
            _ => self.root.join(format!("{}_setup", shell)),
        }
    }

    pub fn flag_cache_dir(&self) -> PathBuf {
        self.root.join(FLAG_CACHE_DIR)
    }

    /// Contents of the setup file for `shell`
    pub fn setup_script(&self, shell: Shell) -> String {
        match shell {
            Shell::Bash => {
                let var = format!("{}_AC_BASH_COMPFUNC_PATH", self.env_prefix);
                format!(
                    "{var}={path} && test -f ${var} && source ${var};\n",
                    var = var,
                    path = self.function_file(shell).display()
                )
            }
            Shell::Zsh => format!(
                "\nfpath=(\n{}\n$fpath\n);\nautoload -Uz compinit;\ncompinit;\n",
                self.functions_dir(shell).display()
            ),
            Shell::Powershell => dot_source(&self.function_file(shell)),
        }
    }

    /// Line users add to their shell profile
    pub fn profile_line(&self, shell: Shell) -> String {
        match shell {
            Shell::Powershell => dot_source(&self.setup_file(shell)),
            _ => {
                let var = format!(
                    "{}_AC_{}_SETUP_PATH",
                    self.env_prefix,
                    shell.to_string().to_uppercase()
                );
                format!(
                    "{var}={path} && test -f ${var} && source ${var};",
                    var = var,
                    path = self.setup_file(shell).display()
                )
            }
        }
    }

    /// Profile file the profile line usually goes into
    pub fn profile_hint(&self, shell: Shell) -> &'static str {
        match shell {
            Shell::Bash => "~/.bashrc",
            Shell::Zsh => "~/.zshrc",
            Shell::Powershell => "$PROFILE",
        }
    }
}

fn dot_source(path: &Path) -> String {
    format!(
        "if (Test-Path \"{path}\") {{ . \"{path}\" }}",
        path = path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> CacheLayout {
        CacheLayout::new("/home/me/.cache/my-cli", &Registry::new("my-cli"))
    }

    #[test]
    fn test_paths() {
        let layout = layout();
        assert_eq!(
            layout.function_file(Shell::Bash),
            PathBuf::from("/home/me/.cache/my-cli/autocomplete/functions/bash/my-cli.bash")
        );
        assert_eq!(
            layout.function_file(Shell::Zsh),
            PathBuf::from("/home/me/.cache/my-cli/autocomplete/functions/zsh/_my-cli")
        );
        assert_eq!(
            layout.setup_file(Shell::Zsh),
            PathBuf::from("/home/me/.cache/my-cli/autocomplete/zsh_setup")
        );
        assert_eq!(
            layout.flag_cache_dir(),
            PathBuf::from("/home/me/.cache/my-cli/autocomplete/flag_completion_cache")
        );
    }

    #[test]
    fn test_bash_setup_script() {
        assert_eq!(
            layout().setup_script(Shell::Bash),
            "MY_CLI_AC_BASH_COMPFUNC_PATH=/home/me/.cache/my-cli/autocomplete/functions/bash/my-cli.bash && test -f $MY_CLI_AC_BASH_COMPFUNC_PATH && source $MY_CLI_AC_BASH_COMPFUNC_PATH;\n"
        );
    }

    #[test]
    fn test_zsh_setup_script() {
        let script = layout().setup_script(Shell::Zsh);
        assert!(script.contains("fpath=(\n/home/me/.cache/my-cli/autocomplete/functions/zsh\n$fpath\n);"));
        assert!(script.ends_with("compinit;\n"));
    }

    #[test]
    fn test_profile_lines() {
        let layout = layout();
        assert_eq!(
            layout.profile_line(Shell::Zsh),
            "MY_CLI_AC_ZSH_SETUP_PATH=/home/me/.cache/my-cli/autocomplete/zsh_setup && test -f $MY_CLI_AC_ZSH_SETUP_PATH && source $MY_CLI_AC_ZSH_SETUP_PATH;"
        );
        assert!(layout
            .profile_line(Shell::Powershell)
            .contains(". \"/home/me/.cache/my-cli/autocomplete/powershell_setup.ps1\""));
    }
}
