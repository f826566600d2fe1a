use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::messages::{self, Lang, Msg};

/// Option that failed its range check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invalid {
    MinFrequency,
    MaxScore,
    MaxTermLength,
    FuzzySimilarity,
    MinCoOccurrence,
    MaxPairs,
    CoOccurrenceRatio,
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(messages::text(Lang::En, Msg::Invalid(*self)))
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    /// Rejected option value; rendered per message language by the binaries.
    #[error("invalid argument: {0}")]
    InvalidArgument(Invalid),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not a readable XLIFF 2.x document.
    #[error("format error: {0}")]
    Format(String),

    #[error("stopword resource error: {0}")]
    StopWords(String),

    #[error("config error: {0}")]
    Config(String),
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
