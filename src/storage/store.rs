use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, PersistStep, Result};
use crate::feed::codec::{FeedCodec, RssCodec};
use crate::feed::{Feed, Item};

/// Owner of the single feed and its backing file.
///
/// All access goes through `add` and `write`; both take the same
/// reader/writer lock, so a reader never sees a feed whose file rewrite is
/// still in progress.
pub struct FeedStore<C: FeedCodec = RssCodec> {
    path: PathBuf,
    host: String,
    bootstrap: Feed,
    codec: C,
    feed: RwLock<Option<Feed>>,
}

impl FeedStore<RssCodec> {
    pub fn new(path: impl Into<PathBuf>, host: impl Into<String>) -> Self {
        Self::with_codec(path, host, RssCodec::new())
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_codec(
            config.feed_path(),
            config.host.clone(),
            RssCodec::with_indent(config.feed.indent),
        )
        .with_bootstrap(config.feed.bootstrap_feed())
    }
}

impl<C: FeedCodec> FeedStore<C> {
    pub fn with_codec(path: impl Into<PathBuf>, host: impl Into<String>, codec: C) -> Self {
        Self {
            path: path.into(),
            host: host.into(),
            bootstrap: Feed::default(),
            codec,
            feed: RwLock::new(None),
        }
    }

    /// Metadata written when `init` finds no file. Items are ignored.
    pub fn with_bootstrap(mut self, mut feed: Feed) -> Self {
        feed.items.clear();
        self.bootstrap = feed;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_initialized(&self) -> bool {
        self.feed.read().is_some()
    }

    /// Load the persisted feed, or write the default one if the file is missing.
    pub fn init(&self) -> Result<()> {
        let mut guard = self.feed.write();

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let feed = self.bootstrap_file()?;
                *guard = Some(feed);
                return Ok(());
            }
            Err(e) => {
                return Err(Error::FileOpen {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let feed = self
            .codec
            .decode(&mut BufReader::new(file))
            .map_err(|e| Error::Decode {
                path: self.path.clone(),
                source: e,
            })?;

        info!(
            "Loaded {} feed from {}: {} items",
            self.codec.name(),
            self.path.display(),
            feed.len()
        );
        *guard = Some(feed);
        Ok(())
    }

    fn bootstrap_file(&self) -> Result<Feed> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::FolderCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file = File::create(&self.path).map_err(|e| Error::FileCreate {
            path: self.path.clone(),
            source: e,
        })?;

        let feed = self.bootstrap.clone();
        let encoded = {
            let mut writer = BufWriter::new(file);
            self.codec.encode(&feed, &mut writer)
        };

        // A half-written file would fail to decode on every later init.
        if let Err(e) = encoded {
            warn!("Removing unfinished feed file {}: {}", self.path.display(), e);
            let _ = fs::remove_file(&self.path);
            return Err(Error::Encode(e));
        }

        info!("Created new feed file: {}", self.path.display());
        Ok(feed)
    }

    /// Append an item and rewrite the whole file.
    ///
    /// The item stays in memory even when the rewrite fails; the next
    /// successful call writes it out together with its own item.
    pub fn add(
        &self,
        author: &str,
        title: &str,
        description: &str,
        relative_path: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut guard = self.feed.write();
        let feed = guard.as_mut().ok_or_else(not_initialized)?;

        let item = Item::new(&self.host, author, title, description, relative_path, created_at);
        debug!("Appending item '{}' -> {}", item.title, item.link);
        feed.push(item);

        if let Err(e) = self.persist(feed) {
            warn!(
                "Feed file {} is behind memory ({} items): {}",
                self.path.display(),
                feed.len(),
                e
            );
            return Err(e);
        }

        debug!("Persisted {} items to {}", feed.len(), self.path.display());
        Ok(())
    }

    fn persist(&self, feed: &Feed) -> Result<()> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| Error::Persist {
                path: self.path.clone(),
                step: PersistStep::Open,
                source: Box::new(Error::FileOpen {
                    path: self.path.clone(),
                    source: e,
                }),
            })?;

        self.codec
            .encode(feed, &mut BufWriter::new(file))
            .map_err(|e| Error::Persist {
                path: self.path.clone(),
                step: PersistStep::Encode,
                source: Box::new(Error::Encode(e)),
            })
    }

    /// Serialize the current feed into `writer`.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let guard = self.feed.read();
        let feed = guard.as_ref().ok_or_else(not_initialized)?;
        self.codec.encode(feed, &mut writer).map_err(Error::Encode)
    }

    /// Number of items currently held in memory.
    pub fn len(&self) -> Result<usize> {
        let guard = self.feed.read();
        guard.as_ref().map(Feed::len).ok_or_else(not_initialized)
    }

    /// Owned copy of the current feed.
    pub fn snapshot(&self) -> Result<Feed> {
        let guard = self.feed.read();
        guard.as_ref().cloned().ok_or_else(not_initialized)
    }
}

fn not_initialized() -> Error {
    Error::InvalidState("feed store is not initialized".to_string())
}
