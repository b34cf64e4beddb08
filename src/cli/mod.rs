pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "carousel-vault")]
#[command(about = "Extract Instagram carousels and archive their media", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/carousel-vault/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the slides of a post without storing anything
    Extract {
        /// Post, reel or tv URL
        url: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Extract a post and copy its media into durable storage
    Archive {
        /// Post, reel or tv URL
        url: String,

        /// Owner segment of the storage keys
        #[arg(long)]
        owner: String,

        /// Post segment of the storage keys (default: the shortcode)
        #[arg(long)]
        post: Option<String>,
    },
}
