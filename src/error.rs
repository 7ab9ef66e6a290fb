use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::feed::codec::CodecError;

pub type Result<T> = std::result::Result<T, Error>;

/// Step of the rewrite performed by `FeedStore::add` that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStep {
    Open,
    Encode,
}

impl fmt::Display for PersistStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistStep::Open => f.write_str("opening"),
            PersistStep::Encode => f.write_str("encoding"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Can't create folder '{}': {source}", path.display())]
    FolderCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't create a new file '{}': {source}", path.display())]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't open file '{}': {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't decode RSS feed from '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("Can't write RSS feed: {0}")]
    Encode(#[source] CodecError),

    #[error("Can't persist feed to '{}' while {step} it: {source}", path.display())]
    Persist {
        path: PathBuf,
        step: PersistStep,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Which rewrite step failed, for errors returned by `FeedStore::add`.
    pub fn persist_step(&self) -> Option<PersistStep> {
        match self {
            Error::Persist { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_) | Error::Config(_) | Error::NotFound(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::FolderCreate { .. } => "FOLDER_CREATE",
            Error::FileCreate { .. } => "FILE_CREATE",
            Error::FileOpen { .. } => "FILE_OPEN",
            Error::Decode { .. } => "DECODE",
            Error::Encode(_) => "ENCODE",
            Error::Persist { .. } => "PERSIST",
            Error::Io(_) => "IO_ERROR",
            Error::Config(_) => "CONFIG",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::NotFound(_) => "NOT_FOUND",
            Error::InvalidState(_) => "INVALID_STATE",
        }
    }
}
