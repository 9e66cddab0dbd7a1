use std::time::Duration;

/// Result alias that carries the custom [`ModPlayerError`] type.
pub type Result<T> = std::result::Result<T, ModPlayerError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ModPlayerError {
    /// Free-form failure reported by a collaborator.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The playback engine was not available when the session started.
    #[error("Error: Libraries not loaded.")]
    EngineUnavailable,
    /// A module file failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl ModPlayerError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

/// Ways an engine load can end without producing a buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("{0}")]
    Rejected(String),
    /// The engine dropped the completion without fulfilling it.
    #[error("engine abandoned the load")]
    Abandoned,
    #[error("no response from engine after {0:?}")]
    TimedOut(Duration),
}
