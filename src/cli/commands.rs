use std::io::{self, Write};
use std::path::Path;
use chrono::{DateTime, Utc};
use clap_complete::{generate, Shell};
use clap::CommandFactory;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::Config;
use crate::storage::{self, FeedStore};
use crate::error::Result;

/// Prepare the folder and open the feed, bootstrapping it on first run.
fn open_store(config: &Config) -> Result<FeedStore> {
    storage::prepare_folder(&config.storage)?;
    let store = FeedStore::from_config(config);
    store.init()?;
    Ok(store)
}

pub fn init(config: &Config) -> Result<()> {
    info!("Initializing feed at {}", config.feed_path().display());
    let store = open_store(config)?;

    println!("✅ Feed ready: {}", store.path().display());
    println!("   Items: {}", store.len()?);
    println!("   Host:  {}", config.host);

    Ok(())
}

pub fn add(
    config: &Config,
    path: &str,
    author: &str,
    title: &str,
    description: &str,
    created_at: DateTime<Utc>,
) -> Result<()> {
    let store = open_store(config)?;
    store.add(author, title, description, path, created_at)?;

    info!("Added '{}' by {}", title, author);
    println!("✅ Added '{}' ({}/{})", title, config.host, path);
    println!("   Items: {}", store.len()?);

    Ok(())
}

pub fn show(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    store.write(&mut handle)?;
    writeln!(handle)?;
    Ok(())
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "rss-keeper", &mut io::stdout());
}

/// Explicit path, then the default config file if present, then env only.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_path {
        return Config::load_with_env(path);
    }

    let default_file = Config::config_dir()?.join("config.toml");
    if default_file.exists() {
        Config::load_with_env(&default_file)
    } else {
        Config::from_env()
    }
}

pub fn init_logging(debug: bool, verbose: bool, level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug)
        .with_writer(io::stderr)
        .init();

    debug!("Logging initialized");
    Ok(())
}
