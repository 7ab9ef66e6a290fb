pub mod commands;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use crate::error::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rss-keeper")]
#[command(about = "Keep a single RSS feed on disk and append items to it")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RSS_KEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the storage folder and load or bootstrap the feed file
    Init,

    /// Append an item to the feed
    Add {
        /// Path of the item relative to the configured host
        path: String,

        /// Item author
        #[arg(short, long)]
        author: String,

        /// Item title
        #[arg(short, long)]
        title: String,

        /// Item description
        #[arg(long, default_value = "")]
        description: String,

        /// Publication time (RFC 3339), defaults to now
        #[arg(long)]
        date: Option<DateTime<Utc>>,
    },

    /// Print the feed to stdout
    Show,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        if let Commands::Completions { shell } = self.command {
            commands::generate_completions(shell);
            return Ok(());
        }

        let config = commands::load_config(self.config.as_deref())?;
        commands::init_logging(self.debug, self.verbose, &config.logging.level)?;

        match self.command {
            Commands::Init => commands::init(&config),
            Commands::Add { path, author, title, description, date } => {
                commands::add(&config, &path, &author, &title, &description, date.unwrap_or_else(Utc::now))
            }
            Commands::Show => commands::show(&config),
            Commands::Completions { .. } => Ok(()),
        }
    }
}
