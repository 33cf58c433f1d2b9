//! Command loading seam

use async_trait::async_trait;

use crate::domain::Command;
use crate::error::Result;

/// Loads the full definition of a command.
///
/// Manifests cache a reduced view of each command; completion metadata may
/// only be available once the command itself is loaded.
#[async_trait]
pub trait CommandLoader: Send + Sync {
    /// Load the complete definition of `command`
    async fn load(&self, command: &Command) -> Result<Command>;
}

/// Loader that returns the manifest-cached definition unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedLoader;

#[async_trait]
impl CommandLoader for CachedLoader {
    async fn load(&self, command: &Command) -> Result<Command> {
        Ok(command.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cached_loader_returns_clone() {
        let command = Command::new("deploy").with_summary("Deploy");
        let loaded = CachedLoader.load(&command).await.unwrap();
        assert_eq!(loaded, command);
    }
}
