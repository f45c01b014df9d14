use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a checking run.
///
/// Individual probe failures never show up here; they are folded into
/// [`crate::ProbeResult`] inside the prober.
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("invalid number of workers: must be greater than zero")]
    InvalidWorkerCount,

    #[error("please provide a valid '.txt' file, got '{}'", path.display())]
    InvalidInputExtension { path: PathBuf },

    #[error("authenticity token not found in signup page markup")]
    TokenNotFound,

    #[error("invalid base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mark_done called more times than items were enqueued")]
    TooManyMarkDone,

    #[error("all workers stopped with {remaining} names still unfinished")]
    WorkersExited { remaining: usize },
}

impl CheckerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckerError>;
