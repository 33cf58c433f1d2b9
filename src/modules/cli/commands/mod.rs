//! CLI commands

mod create;
mod generate;
mod install;
mod options;
mod script;

pub use create::CreateCommand;
pub use generate::GenerateCommand;
pub use install::InstallCommand;
pub use options::OptionsCommand;
pub use script::ScriptCommand;

use autocomplete_core::{AutocompleteError, Registry, Result};
use autocomplete_parser::FileCommandLoader;
use autocomplete_types::Shell;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "AUTOCOMPLETE_CACHE_DIR";

/// Executable name of this tool
pub const BIN_NAME: &str = "autocomplete";

/// Shell completion generator for plugin-based CLIs
#[derive(Parser, Debug)]
#[command(name = BIN_NAME)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// CLI manifest path (JSON or YAML)
    ///
    /// This is a *global* option so it can be specified after subcommands,
    /// e.g. `autocomplete create -f mycli.json`.
    #[arg(
        short = 'f',
        long = "file",
        global = true,
        default_value = "cli.manifest.json"
    )]
    pub manifest: PathBuf,

    /// Cache directory (defaults to the manifest's cacheDir or the user cache dir)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the completion cache and print setup instructions
    Install(InstallCommand),

    /// Write completion scripts and setup files for every shell
    Create(CreateCommand),

    /// Print the line to add to a shell profile
    Script(ScriptCommand),

    /// Print a completion script to stdout
    Generate(GenerateCommand),

    /// List values for a flag's dynamic completion
    #[command(hide = true, alias = "autocomplete:options")]
    Options(OptionsCommand),
}

impl Cli {
    /// Global options shared by every command
    pub fn context(&self) -> Context {
        Context {
            manifest: self.manifest.clone(),
            cache_dir: self.cache_dir.clone(),
        }
    }
}

/// Manifest location and cache overrides
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub manifest: PathBuf,
    pub cache_dir: Option<PathBuf>,
}

impl Context {
    /// Parse the manifest and pin the registry to the effective cache dir
    ///
    /// Without an `optionsCommand` in the manifest, dynamic values are
    /// looked up through this tool's `options` command for the same manifest.
    pub fn load(&self) -> Result<(Registry, PathBuf)> {
        let mut registry = autocomplete_parser::parse_file(&self.manifest)?;
        let cache_dir = resolve_cache_dir(
            self.cache_dir.as_deref(),
            std::env::var_os(CACHE_DIR_ENV),
            &registry,
        )?;
        debug!(cache_dir = %cache_dir.display(), "using cache dir");
        registry.cache_dir = Some(cache_dir.clone());
        if registry.options_command.is_none() {
            registry.options_command = Some(self.options_command()?);
        }
        Ok((registry, cache_dir))
    }

    /// `autocomplete -f <absolute manifest> options`
    pub fn options_command(&self) -> Result<String> {
        let manifest = std::fs::canonicalize(&self.manifest)?;
        Ok(format!(
            "{} -f {} options",
            BIN_NAME,
            single_quote(&manifest.display().to_string())
        ))
    }

    /// Loader resolving command sources next to the manifest
    pub fn loader(&self) -> FileCommandLoader {
        FileCommandLoader::for_manifest(&self.manifest)
    }
}

/// Cache dir precedence: flag, environment, manifest, user cache dir
pub fn resolve_cache_dir(
    flag: Option<&Path>,
    env: Option<OsString>,
    registry: &Registry,
) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = &registry.cache_dir {
        return Ok(dir.clone());
    }
    dirs::cache_dir()
        .map(|dir| dir.join(&registry.bin))
        .ok_or_else(|| {
            AutocompleteError::Validation(
                "Cannot determine a cache directory; pass --cache-dir".to_string(),
            )
        })
}

/// Single-quote a word for POSIX shells
fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Parse a shell argument
pub fn parse_shell(name: &str) -> Result<Shell> {
    name.parse()
        .map_err(|_| AutocompleteError::UnsupportedShell(name.to_string()))
}

/// Manifest fixture written into `dir`, with the cache under `dir/cache`
#[cfg(test)]
pub(crate) fn test_context(dir: &Path) -> Context {
    let manifest = serde_json::json!({
        "name": "my-cli",
        "bin": "mycli",
        "binAliases": ["mc"],
        "commands": {
            "deploy": {
                "summary": "Deploy a project",
                "flags": {
                    "target": { "type": "option", "char": "t", "options": ["dev", "prod"] },
                    "branch": { "type": "option" },
                    "json": { "type": "boolean" }
                },
                "source": "deploy.json"
            },
            "deploy:functions": { "summary": "Deploy functions" }
        }
    });
    let full = serde_json::json!({
        "summary": "Deploy a project",
        "flags": {
            "target": { "type": "option", "char": "t", "options": ["dev", "prod"] },
            "branch": {
                "type": "option",
                "completion": { "type": "dynamic", "command": "printf 'main\\ndevelop\\n'" }
            },
            "json": { "type": "boolean" }
        }
    });

    let path = dir.join("cli.manifest.json");
    std::fs::write(&path, manifest.to_string()).unwrap();
    std::fs::write(dir.join("deploy.json"), full.to_string()).unwrap();

    Context {
        manifest: path,
        cache_dir: Some(dir.join("cache")),
    }
}
