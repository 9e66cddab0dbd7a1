use std::time::{Duration, Instant};

use crate::{FileHandle, LoadCompletion, LoadError, LoadPoll, ModuleBuffer, PlaybackEngine};

/// Outcome of an in-flight load, reported once by [`FileIntake::poll`].
#[derive(Debug)]
pub enum IntakeEvent {
    Loaded {
        file_name: String,
        buffer: ModuleBuffer,
    },
    Failed {
        file_name: String,
        error: LoadError,
    },
}

#[derive(Debug)]
struct PendingLoad {
    file_name: String,
    completion: LoadCompletion,
    started: Instant,
}

/// Hands selected files to the engine and watches the single pending load.
///
/// Overlapping loads are not serialised here; the session keeps the file
/// input disabled while one is in flight.
#[derive(Debug, Default)]
pub struct FileIntake {
    pending: Option<PendingLoad>,
    timeout: Option<Duration>,
}

impl FileIntake {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            pending: None,
            timeout,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts loading `file`. Returns `false` without touching the engine when
    /// the picker was cancelled.
    pub fn select_file<E>(&mut self, engine: &mut E, file: Option<FileHandle>, now: Instant) -> bool
    where
        E: PlaybackEngine + ?Sized,
    {
        let Some(file) = file else {
            tracing::debug!("file picker closed without a selection");
            return false;
        };

        if let Some(previous) = &self.pending {
            tracing::warn!(previous = %previous.file_name, "replacing a load that never finished");
        }

        let file_name = file.name.clone();
        tracing::info!(file = %file_name, bytes = file.bytes.len(), "loading module");
        let completion = engine.load(file);
        self.pending = Some(PendingLoad {
            file_name,
            completion,
            started: now,
        });
        true
    }

    /// Checks the pending load without blocking.
    pub fn poll(&mut self, now: Instant) -> Option<IntakeEvent> {
        let pending = self.pending.take()?;
        let PendingLoad {
            file_name,
            completion,
            started,
        } = pending;

        match completion.poll() {
            LoadPoll::Ready(buffer) => Some(IntakeEvent::Loaded { file_name, buffer }),
            LoadPoll::Failed(error) => Some(IntakeEvent::Failed { file_name, error }),
            LoadPoll::Pending(completion) => match self.timeout {
                Some(limit) if now.saturating_duration_since(started) >= limit => {
                    Some(IntakeEvent::Failed {
                        file_name,
                        error: LoadError::TimedOut(limit),
                    })
                }
                _ => {
                    self.pending = Some(PendingLoad {
                        file_name,
                        completion,
                        started,
                    });
                    None
                }
            },
        }
    }
}
