use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Error, Result};
use crate::feed::{Feed, DEFAULT_DESCRIPTION, DEFAULT_LINK, DEFAULT_TITLE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL that item links are built from.
    pub host: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_folder")]
    pub folder: PathBuf,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

/// Metadata used only when a fresh feed file is bootstrapped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_link")]
    pub link: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default)]
    pub indent: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but `.env` and `RSS_KEEPER_*` variables override the file
    /// before validation.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::read(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| Error::NotFound(path.as_ref().display().to_string()))?;

        Ok(toml::from_str(&content)?)
    }

    /// Defaults plus environment overrides, for running without a config file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let host = url::Url::parse(&self.host)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.host, e)))?;

        match host.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::InvalidUrl(format!(
                    "Unsupported host scheme: {}",
                    scheme
                )))
            }
        }

        if self.storage.file_name.is_empty() {
            return Err(Error::Config("Feed file name cannot be empty".to_string()));
        }

        if self.storage.file_name.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "Feed file name must not contain a path separator: {}",
                self.storage.file_name
            )));
        }

        Ok(())
    }

    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("RSS_KEEPER_HOST") {
            self.host = host;
        }

        if let Ok(folder) = std::env::var("RSS_KEEPER_FOLDER") {
            self.storage.folder = PathBuf::from(folder);
        }

        if let Ok(file_name) = std::env::var("RSS_KEEPER_FILE") {
            self.storage.file_name = file_name;
        }

        if let Ok(level) = std::env::var("RSS_KEEPER_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn feed_path(&self) -> PathBuf {
        self.storage.feed_path()
    }

    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("rss-keeper"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            storage: StorageConfig::default(),
            feed: FeedConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StorageConfig {
    pub fn feed_path(&self) -> PathBuf {
        self.folder.join(&self.file_name)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            file_name: default_file_name(),
        }
    }
}

impl FeedConfig {
    pub fn bootstrap_feed(&self) -> Feed {
        Feed::new(&self.title, &self.link, &self.description)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            link: default_link(),
            description: default_description(),
            indent: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String { "http://localhost:8080".to_string() }
fn default_folder() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("rss-keeper"))
        .unwrap_or_else(|| PathBuf::from("rss"))
}
fn default_file_name() -> String { "feed.xml".to_string() }
fn default_title() -> String { DEFAULT_TITLE.to_string() }
fn default_link() -> String { DEFAULT_LINK.to_string() }
fn default_description() -> String { DEFAULT_DESCRIPTION.to_string() }
fn default_log_level() -> String { "info".to_string() }

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
host = "https://files.example.com"

[storage]
folder = "/var/lib/rss-keeper"
file_name = "bot.xml"

[feed]
title = "My bot"
"#;

    #[test]
    fn test_parse_with_partial_sections() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.host, "https://files.example.com");
        assert_eq!(config.feed_path(), PathBuf::from("/var/lib/rss-keeper/bot.xml"));
        assert_eq!(config.feed.title, "My bot");
        assert_eq!(config.feed.link, DEFAULT_LINK);
        assert_eq!(config.feed.indent, 0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_bootstrap_feed_uses_metadata() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let feed = config.feed.bootstrap_feed();
        assert_eq!(feed.title, "My bot");
        assert_eq!(feed.description, DEFAULT_DESCRIPTION);
        assert!(feed.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_host() {
        let mut config = Config::default();
        config.host = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        config.host = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_validate_rejects_bad_file_name() {
        let mut config = Config::default();
        config.storage.file_name = String::new();
        assert!(config.validate().is_err());

        config.storage.file_name = "nested/feed.xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.host = "https://example.org".to_string();
        config.storage.folder = temp_dir.path().join("rss");
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.host, "https://example.org");
        assert_eq!(loaded.storage.folder, temp_dir.path().join("rss"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/rss-keeper.toml");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("RSS_KEEPER_FOLDER", "/tmp/rss-keeper-env-test");
        std::env::set_var("RSS_KEEPER_FILE", "env.xml");

        let mut config = Config::default();
        config.apply_env_overrides();

        std::env::remove_var("RSS_KEEPER_FOLDER");
        std::env::remove_var("RSS_KEEPER_FILE");

        assert_eq!(config.feed_path(), PathBuf::from("/tmp/rss-keeper-env-test/env.xml"));
    }
}
