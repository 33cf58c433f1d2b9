//! Writes generated scripts into the cache layout

use autocomplete_core::{CommandLoader, Registry, Result};
use autocomplete_types::Shell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::layout::CacheLayout;
use crate::{generate, generate_legacy};

/// Populates `<cache_dir>/autocomplete` for every shell
pub struct CacheWriter<'a> {
    registry: Registry,
    layout: CacheLayout,
    loader: &'a dyn CommandLoader,
    legacy: bool,
}

impl<'a> CacheWriter<'a> {
    pub fn new(registry: &Registry, cache_dir: impl AsRef<Path>, loader: &'a dyn CommandLoader) -> Self {
        let cache_dir = cache_dir.as_ref();
        let mut registry = registry.clone();
        registry.cache_dir = Some(cache_dir.to_path_buf());
        Self {
            layout: CacheLayout::new(cache_dir, &registry),
            registry,
            loader,
            legacy: false,
        }
    }

    /// Use the flat legacy scripts for bash and zsh
    pub fn with_legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Returns true if the function and setup files for `shell` exist
    pub fn is_populated(&self, shell: Shell) -> bool {
        self.layout.function_file(shell).is_file() && self.layout.setup_file(shell).is_file()
    }

    /// Write function files and setup scripts for all shells
    pub async fn write_all(&self) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(self.layout.flag_cache_dir())?;

        let mut written = Vec::new();
        for &shell in Shell::all() {
            written.extend(self.write_shell(shell).await?);
        }

        info!(
            "Completion cache written to {}",
            self.layout.root().display()
        );
        Ok(written)
    }

    /// Write the function file and setup script for one shell
    pub async fn write_shell(&self, shell: Shell) -> Result<Vec<PathBuf>> {
        let script = if self.legacy && shell.has_legacy_generator() {
            generate_legacy(shell, &self.registry)?
        } else {
            generate(shell, &self.registry, self.loader).await?
        };

        fs::create_dir_all(self.layout.functions_dir(shell))?;

        let function_file = self.layout.function_file(shell);
        fs::write(&function_file, script)?;
        debug!(shell = %shell, path = %function_file.display(), "function file written");

        let setup_file = self.layout.setup_file(shell);
        fs::write(&setup_file, self.layout.setup_script(shell))?;
        debug!(shell = %shell, path = %setup_file.display(), "setup file written");

        Ok(vec![function_file, setup_file])
    }
}
