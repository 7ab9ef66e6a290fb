pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod storage;

pub use config::Config;
pub use error::{Error, PersistStep, Result};
pub use feed::codec::{FeedCodec, RssCodec};
pub use feed::{Feed, Item};
pub use storage::FeedStore;
