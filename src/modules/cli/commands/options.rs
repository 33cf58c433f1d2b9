//! Options command: values for a flag's completion, one per line

use autocomplete_generator::{resolve_flag_options, OptionsRequest, ShellOptions};
use clap::Args;
use tracing::debug;

use super::Context;

/// List values for a flag's dynamic completion
///
/// Called by generated scripts at completion time. Prints nothing on any
/// failure so the shell simply offers no values.
#[derive(Args, Debug)]
pub struct OptionsCommand {
    /// Command id (or alias)
    #[arg(long)]
    pub command: String,

    /// Flag name
    #[arg(long)]
    pub flag: String,

    /// Words typed so far
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub current_line: String,
}

impl OptionsCommand {
    pub async fn execute(&self, ctx: &Context) {
        for value in self.values(ctx).await {
            println!("{}", value);
        }
    }

    async fn values(&self, ctx: &Context) -> Vec<String> {
        let registry = match ctx.load() {
            Ok((registry, _)) => registry,
            Err(e) => {
                debug!(error = %e, "no manifest for flag options");
                return Vec::new();
            }
        };

        let request = OptionsRequest::new(&self.command, &self.flag)
            .with_current_line(&self.current_line);
        resolve_flag_options(&registry, &ctx.loader(), &ShellOptions::new(), &request).await
    }
}
