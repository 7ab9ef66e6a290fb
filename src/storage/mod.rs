pub mod store;

pub use store::FeedStore;

use std::fs;
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Create the configured storage folder. Called once by the entry point
/// before any store is constructed.
pub fn prepare_folder(config: &StorageConfig) -> Result<()> {
    if config.folder.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(&config.folder).map_err(|e| Error::FolderCreate {
        path: config.folder.clone(),
        source: e,
    })?;

    debug!("Created storage folder: {}", config.folder.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_folder_creates_nested_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig {
            folder: temp_dir.path().join("a").join("b"),
            ..Default::default()
        };

        prepare_folder(&config).unwrap();
        assert!(config.folder.is_dir());

        // Existing folder is fine.
        prepare_folder(&config).unwrap();
    }

    #[test]
    fn test_prepare_folder_fails_on_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let config = StorageConfig {
            folder: blocker.join("rss"),
            ..Default::default()
        };

        let err = prepare_folder(&config).unwrap_err();
        assert_eq!(err.error_code(), "FOLDER_CREATE");
    }
}
