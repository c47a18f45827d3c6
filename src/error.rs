use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Scrivener's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Scrivener's crate-wide error type.
///
/// Each variant is one failure kind of a transcription run. Callers (the CLI included) decide
/// how to present them; the library never retries or swallows any of them.
#[derive(Debug, Error)]
pub enum Error {
    /// The source media does not exist. Raised before the engine runs or any file is written.
    #[error("input not found: '{}'", path.display())]
    InputNotFound { path: PathBuf },

    /// The engine failed to start, or failed while its segment sequence was being drained.
    #[error("engine failure: {0}")]
    Engine(#[source] Box<dyn StdError + Send + Sync>),

    /// Writing one of the output artifacts failed.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The run configuration was rejected before the engine was invoked.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub(crate) fn engine(err: anyhow::Error) -> Self {
        Self::Engine(err.into())
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
