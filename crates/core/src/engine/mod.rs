//! Interface to the external decode/playback engine.
//!
//! The engine is opaque: it takes a raw module file, produces something
//! playable and exposes transport primitives plus a metadata accessor. The
//! core never looks inside the bytes it hands over.

mod completion;

use std::{fmt, sync::Arc};

pub use completion::{load_channel, LoadCompletion, LoadPoll, LoadResolver};

use crate::TrackMetadata;

/// A user-selected file: its display name and raw contents.
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Playable buffer handed back by the engine once a load succeeds.
#[derive(Clone, PartialEq, Eq)]
pub struct ModuleBuffer(Arc<[u8]>);

impl ModuleBuffer {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ModuleBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModuleBuffer").field(&self.0.len()).finish()
    }
}

/// Transport and loading primitives consumed by the session.
pub trait PlaybackEngine {
    /// Starts an asynchronous load-and-decode. The returned completion is
    /// fulfilled at most once.
    fn load(&mut self, file: FileHandle) -> LoadCompletion;

    fn play(&mut self, buffer: &ModuleBuffer);

    /// Flips the engine's pause state. The engine does not report which way
    /// it went.
    fn toggle_pause(&mut self);

    fn unpause(&mut self);

    fn stop(&mut self);

    /// Metadata for the buffer most recently passed to [`PlaybackEngine::play`].
    fn metadata(&self) -> TrackMetadata;
}
