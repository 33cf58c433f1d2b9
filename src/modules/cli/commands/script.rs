//! Script command: print the shell profile line

use autocomplete_core::Result;
use autocomplete_generator::CacheLayout;
use clap::Args;

use super::{parse_shell, Context};

/// Print the line to add to a shell profile
#[derive(Args, Debug)]
pub struct ScriptCommand {
    /// Shell (bash, zsh, powershell)
    pub shell: String,
}

impl ScriptCommand {
    pub fn execute(&self, ctx: &Context) -> Result<()> {
        println!("{}", self.render(ctx)?);
        Ok(())
    }

    fn render(&self, ctx: &Context) -> Result<String> {
        let shell = parse_shell(&self.shell)?;
        let (registry, cache_dir) = ctx.load()?;
        let layout = CacheLayout::new(&cache_dir, &registry);

        Ok(format!(
            "\n# {} autocomplete setup\n{}",
            registry.bin,
            layout.profile_line(shell)
        ))
    }
}
