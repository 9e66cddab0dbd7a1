//! Play/pause/stop state machine.
//!
//! The engine exposes pause only as a toggle and never reports which way it
//! went, so [`Transport`] predicts the resulting state itself. If the engine
//! ever disagrees (for example it reached the end of the module on its own)
//! the prediction is simply wrong until the next stop or load.

use serde::{Deserialize, Serialize};

use crate::{ModuleBuffer, PlaybackEngine};

/// Lifecycle of the single playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportState {
    /// Nothing loaded yet.
    Idle,
    Loading,
    Playing,
    Paused,
    Stopped,
}

impl TransportState {
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }

    /// Which host controls are usable in this state.
    pub fn controls(self) -> ControlState {
        ControlState::for_state(self)
    }
}

/// Enabled flags for each host control, derived from [`TransportState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlState {
    pub play: bool,
    /// The single pause/resume toggle.
    pub pause: bool,
    pub stop: bool,
    pub file_input: bool,
}

impl ControlState {
    pub const fn for_state(state: TransportState) -> Self {
        match state {
            TransportState::Idle => Self::new(false, false, false, true),
            TransportState::Loading => Self::new(false, false, false, false),
            TransportState::Playing => Self::new(false, true, true, false),
            TransportState::Paused => Self::new(true, true, true, true),
            TransportState::Stopped => Self::new(true, false, false, true),
        }
    }

    const fn new(play: bool, pause: bool, stop: bool, file_input: bool) -> Self {
        Self {
            play,
            pause,
            stop,
            file_input,
        }
    }
}

/// Issues transport commands to the engine and tracks the predicted state.
///
/// Commands that are invalid for the current state are ignored and return
/// `false`; the host disables the matching controls so this is a backstop,
/// not the main guard.
#[derive(Debug)]
pub struct Transport {
    state: TransportState,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    pub fn new() -> Self {
        Self {
            state: TransportState::Idle,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Resumes from pause, or replays the retained buffer after a stop.
    pub fn play<E>(&mut self, engine: &mut E, buffer: Option<&ModuleBuffer>) -> bool
    where
        E: PlaybackEngine + ?Sized,
    {
        match (self.state, buffer) {
            (TransportState::Paused, _) => engine.unpause(),
            (TransportState::Stopped, Some(buffer)) => engine.play(buffer),
            (state, _) => return self.ignore("play", state),
        }
        self.set(TransportState::Playing);
        true
    }

    pub fn toggle_pause<E>(&mut self, engine: &mut E) -> bool
    where
        E: PlaybackEngine + ?Sized,
    {
        let next = match self.state {
            TransportState::Playing => TransportState::Paused,
            TransportState::Paused => TransportState::Playing,
            state => return self.ignore("toggle pause", state),
        };
        engine.toggle_pause();
        self.set(next);
        true
    }

    /// Stops playback. Forbidden while idle and while a load is in flight,
    /// since there is no way to cancel a pending load. `Loading` is therefore
    /// the one non-idle state where stop leaves the "Loading..." text in place
    /// instead of resetting the display to its placeholders.
    pub fn stop<E>(&mut self, engine: &mut E) -> bool
    where
        E: PlaybackEngine + ?Sized,
    {
        match self.state {
            TransportState::Playing | TransportState::Paused | TransportState::Stopped => {
                engine.stop();
                self.set(TransportState::Stopped);
                true
            }
            state => self.ignore("stop", state),
        }
    }

    pub(crate) fn begin_loading(&mut self) {
        self.set(TransportState::Loading);
    }

    /// Plays a freshly loaded buffer.
    pub(crate) fn start<E>(&mut self, engine: &mut E, buffer: &ModuleBuffer)
    where
        E: PlaybackEngine + ?Sized,
    {
        engine.play(buffer);
        self.set(TransportState::Playing);
    }

    /// Leaves `Loading` after a failed load. An earlier buffer may still be
    /// paused inside the engine, so it is stopped to match `Stopped`.
    pub(crate) fn abort_loading<E>(&mut self, engine: &mut E, has_buffer: bool)
    where
        E: PlaybackEngine + ?Sized,
    {
        if has_buffer {
            engine.stop();
            self.set(TransportState::Stopped);
        } else {
            self.set(TransportState::Idle);
        }
    }

    fn set(&mut self, next: TransportState) {
        if self.state != next {
            tracing::info!(from = ?self.state, to = ?next, "transport transition");
        }
        self.state = next;
    }

    fn ignore(&self, command: &str, state: TransportState) -> bool {
        tracing::debug!(command, ?state, "ignoring transport command");
        false
    }
}
