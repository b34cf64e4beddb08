use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use carousel_vault::app::AppContext;
use carousel_vault::cli::{commands, Cli, Commands};
use carousel_vault::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Extract { url, json } => {
            commands::extract(&ctx, &url, json).await?;
        }
        Commands::Archive { url, owner, post } => {
            commands::archive(&ctx, &url, &owner, post.as_deref()).await?;
        }
    }

    Ok(())
}
