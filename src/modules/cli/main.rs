//! Autocomplete CLI
//!
//! Command-line interface for generating shell completions from a CLI manifest.

use autocomplete_cli::{Cli, Commands};
use autocomplete_core::AutocompleteError;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<(), AutocompleteError> {
    let cli = Cli::parse();
    let ctx = cli.context();

    // Scripts go to stdout, so logs stay on stderr
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Install(cmd) => {
            cmd.execute(&ctx).await?;
        }
        Commands::Create(cmd) => {
            cmd.execute(&ctx).await?;
        }
        Commands::Script(cmd) => {
            cmd.execute(&ctx)?;
        }
        Commands::Generate(cmd) => {
            cmd.execute(&ctx).await?;
        }
        Commands::Options(cmd) => {
            cmd.execute(&ctx).await;
        }
    }

    Ok(())
}
