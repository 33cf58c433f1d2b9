//! Loads full command definitions from the files their manifest entry points at

use async_trait::async_trait;
use autocomplete_core::{AutocompleteError, Command, CommandLoader, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::manifest::normalize_command;

/// Reads each command's `source` file (JSON or YAML), relative to a base directory
#[derive(Debug, Clone)]
pub struct FileCommandLoader {
    base_dir: PathBuf,
}

impl FileCommandLoader {
    /// Resolve sources relative to `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve sources relative to the directory holding `manifest`
    pub fn for_manifest(manifest: &Path) -> Self {
        let base_dir = manifest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait]
impl CommandLoader for FileCommandLoader {
    async fn load(&self, command: &Command) -> Result<Command> {
        let source = command.source.as_deref().ok_or_else(|| {
            AutocompleteError::CommandLoad(command.id.clone(), "no source declared".to_string())
        })?;

        let path = self.base_dir.join(source);
        debug!(command = %command.id, path = %path.display(), "loading command");

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AutocompleteError::CommandLoad(command.id.clone(), format!("{}: {}", path.display(), e))
        })?;

        let mut loaded: Command = serde_yaml::from_str(&content)
            .map_err(|e| AutocompleteError::CommandLoad(command.id.clone(), e.to_string()))?;

        // Identity always comes from the manifest
        loaded.id = command.id.clone();
        loaded.hidden = command.hidden;
        loaded.aliases = command.aliases.clone();
        loaded.deprecate_aliases = command.deprecate_aliases;
        if loaded.summary_text().is_none() {
            loaded.summary = command.summary.clone();
            loaded.description = command.description.clone();
        }

        Ok(normalize_command(loaded))
    }
}
