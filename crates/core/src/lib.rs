//! Core library for the tracker module player.
//!
//! The crate holds the playback session logic only. Decoding and audio output
//! belong to a [`PlaybackEngine`] and all drawing and controls belong to a
//! [`HostSurface`] and [`Canvas`]; both are supplied by the embedding
//! application. Everything here is single-threaded and never blocks.

pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod host;
pub mod intake;
pub mod metadata;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{AppConfig, EngineConfig, FeedbackConfig, Rgba};
pub use engine::{
    load_channel, FileHandle, LoadCompletion, LoadPoll, LoadResolver, ModuleBuffer, PlaybackEngine,
};
pub use error::{LoadError, ModPlayerError, Result};
pub use feedback::{Bar, Canvas, FeedbackLoop};
pub use host::HostSurface;
pub use intake::{FileIntake, IntakeEvent};
pub use metadata::{present, DisplayText, TrackMetadata};
pub use session::{PlaybackSession, SessionController, UiEvent};
pub use transport::{ControlState, Transport, TransportState};
