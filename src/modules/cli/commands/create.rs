//! Create command: write every completion script and setup file

use autocomplete_core::Result;
use autocomplete_generator::CacheWriter;
use clap::Args;
use tracing::info;

use super::Context;

/// Write completion scripts and setup files for every shell
#[derive(Args, Debug)]
pub struct CreateCommand {
    /// Use the flat legacy scripts for bash and zsh
    #[arg(long)]
    pub legacy: bool,
}

impl CreateCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        info!("Creating completions from: {}", ctx.manifest.display());

        let (registry, cache_dir) = ctx.load()?;
        let loader = ctx.loader();

        let written = CacheWriter::new(&registry, &cache_dir, &loader)
            .with_legacy(self.legacy)
            .write_all()
            .await?;

        for path in &written {
            info!("  {}", path.display());
        }
        Ok(())
    }
}
