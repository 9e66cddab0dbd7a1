//! Composition root wiring intake, transport and presentation together.

use std::time::Instant;

use crate::{
    host::{STATUS_LOADING, STATUS_WAITING},
    metadata, AppConfig, DisplayText, FileHandle, FileIntake, HostSurface, IntakeEvent,
    ModPlayerError, ModuleBuffer, PlaybackEngine, Result, TrackMetadata, Transport,
    TransportState,
};

/// Events raised by the host controls.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// The file picker closed; `None` when the user cancelled.
    FileChosen(Option<FileHandle>),
    Play,
    TogglePause,
    Stop,
}

/// What the session currently holds. Replaced as a whole once a load succeeds.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSession {
    pub current_buffer: Option<ModuleBuffer>,
    pub file_name: Option<String>,
    pub metadata: TrackMetadata,
}

/// Owns the one playback session and reacts to host events.
///
/// Everything runs on the caller's thread: [`SessionController::handle`] for
/// control events and [`SessionController::pump`] to pick up load results.
/// Control enable flags are pushed to the host before either call returns.
#[derive(Debug)]
pub struct SessionController<E, H> {
    engine: E,
    host: H,
    session: PlaybackSession,
    transport: Transport,
    intake: FileIntake,
}

impl<E: PlaybackEngine, H: HostSurface> SessionController<E, H> {
    /// Starts a session. Fails with [`ModPlayerError::EngineUnavailable`] when
    /// no engine could be created, after telling the host so.
    pub fn boot(engine: Option<E>, mut host: H, config: &AppConfig) -> Result<Self> {
        let Some(engine) = engine else {
            let err = ModPlayerError::EngineUnavailable;
            tracing::error!("{err}");
            host.set_status(Some(&err.to_string()));
            return Err(err);
        };

        let mut controller = Self {
            engine,
            host,
            session: PlaybackSession::default(),
            transport: Transport::new(),
            intake: FileIntake::new(config.load_timeout()),
        };
        controller.host.set_status(Some(STATUS_WAITING));
        controller.host.set_track_text(&DisplayText::no_song());
        controller.sync_controls();
        Ok(controller)
    }

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn handle(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::FileChosen(file) => self.select_file(file, now),
            UiEvent::Play => {
                if self
                    .transport
                    .play(&mut self.engine, self.session.current_buffer.as_ref())
                {
                    self.show_now_playing();
                }
            }
            UiEvent::TogglePause => {
                self.transport.toggle_pause(&mut self.engine);
            }
            UiEvent::Stop => {
                if self.transport.stop(&mut self.engine) {
                    self.session.metadata = TrackMetadata::new();
                    self.show_waiting(STATUS_WAITING);
                }
            }
        }
        self.sync_controls();
    }

    /// Applies the result of the pending load, if it has arrived. Returns
    /// whether anything changed.
    pub fn pump(&mut self, now: Instant) -> bool {
        let Some(event) = self.intake.poll(now) else {
            return false;
        };

        match event {
            IntakeEvent::Loaded { file_name, buffer } => {
                self.transport.start(&mut self.engine, &buffer);
                self.session = PlaybackSession {
                    current_buffer: Some(buffer),
                    file_name: Some(file_name),
                    metadata: TrackMetadata::new(),
                };
                self.show_now_playing();
            }
            IntakeEvent::Failed { file_name, error } => {
                tracing::warn!(file = %file_name, %error, "module failed to load");
                let has_buffer = self.session.current_buffer.is_some();
                self.transport.abort_loading(&mut self.engine, has_buffer);
                self.show_waiting(&format!("Error: could not load {file_name}: {error}"));
            }
        }
        self.sync_controls();
        true
    }

    fn select_file(&mut self, file: Option<FileHandle>, now: Instant) {
        if file.is_some() && !self.state().controls().file_input {
            tracing::debug!(state = ?self.state(), "ignoring file selection");
            return;
        }
        if self.intake.select_file(&mut self.engine, file, now) {
            self.transport.begin_loading();
            self.host.set_status(Some(STATUS_LOADING));
            self.host.set_track_text(&DisplayText::loading());
        }
    }

    /// Re-reads metadata from the engine and hides the status overlay.
    fn show_now_playing(&mut self) {
        self.session.metadata = self.engine.metadata();
        let file_name = self.session.file_name.as_deref().unwrap_or_default();
        let text = metadata::present(&self.session.metadata, file_name);
        tracing::info!(title = %text.title, info = %text.info, "now playing");
        self.host.set_track_text(&text);
        self.host.set_status(None);
    }

    fn show_waiting(&mut self, status: &str) {
        self.host.set_track_text(&DisplayText::no_song());
        self.host.set_status(Some(status));
        self.host.clear_file_selection();
    }

    fn sync_controls(&mut self) {
        self.host.set_controls(self.transport.state().controls());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        testing::{EngineCall, RecordingEngine, RecordingHost},
        ControlState, LoadError,
    };

    type Controller = SessionController<RecordingEngine, RecordingHost>;

    fn boot() -> Controller {
        SessionController::boot(
            Some(RecordingEngine::default()),
            RecordingHost::default(),
            &AppConfig::default(),
        )
        .unwrap()
    }

    fn file(name: &str) -> FileHandle {
        FileHandle::new(name, name.as_bytes().to_vec())
    }

    fn load(controller: &mut Controller, name: &str, metadata: TrackMetadata) {
        let now = Instant::now();
        controller.handle(UiEvent::FileChosen(Some(file(name))), now);
        controller.engine.metadata = metadata;
        controller.engine.resolve_next();
        assert!(controller.pump(now));
    }

    #[test]
    fn missing_engine_reports_and_fails() {
        let mut host = RecordingHost::default();
        let err = SessionController::<RecordingEngine, _>::boot(None, &mut host, &AppConfig::default())
            .unwrap_err();

        assert!(matches!(err, ModPlayerError::EngineUnavailable));
        assert_eq!(host.status.as_deref(), Some("Error: Libraries not loaded."));
        assert!(host.controls.is_none());
    }

    #[test]
    fn boots_idle_with_placeholders() {
        let controller = boot();

        assert_eq!(controller.state(), TransportState::Idle);
        assert_eq!(controller.host.text, Some(DisplayText::no_song()));
        assert_eq!(controller.host.status.as_deref(), Some(STATUS_WAITING));
        assert_eq!(
            controller.host.controls,
            Some(ControlState::for_state(TransportState::Idle))
        );
    }

    #[test]
    fn cancelled_selection_changes_nothing() {
        let mut controller = boot();
        controller.handle(UiEvent::FileChosen(None), Instant::now());

        assert_eq!(controller.state(), TransportState::Idle);
        assert!(controller.session.current_buffer.is_none());
        assert!(controller.engine.calls.is_empty());
        assert_eq!(controller.host.text, Some(DisplayText::no_song()));
    }

    fn assert_cancel_is_inert(controller: &mut Controller, expected: TransportState) {
        let buffer = controller.session.current_buffer.clone();
        let metadata = controller.session.metadata.clone();
        let text = controller.host.text.clone();
        controller.engine.calls.clear();

        controller.handle(UiEvent::FileChosen(None), Instant::now());

        assert_eq!(controller.state(), expected);
        assert_eq!(controller.session.current_buffer, buffer);
        assert_eq!(controller.session.metadata, metadata);
        assert_eq!(controller.host.text, text);
        assert!(controller.engine.calls.is_empty());
        assert!(!controller.pump(Instant::now()));
    }

    #[test]
    fn cancelled_selection_while_playing_changes_nothing() {
        let mut controller = boot();
        load(&mut controller, "a.mod", TrackMetadata::new().with("title", "A"));

        assert_cancel_is_inert(&mut controller, TransportState::Playing);
    }

    #[test]
    fn cancelled_selection_while_paused_changes_nothing() {
        let mut controller = boot();
        load(&mut controller, "a.mod", TrackMetadata::new().with("title", "A"));
        controller.handle(UiEvent::TogglePause, Instant::now());

        assert_cancel_is_inert(&mut controller, TransportState::Paused);
    }

    #[test]
    fn selection_enters_loading_synchronously() {
        let mut controller = boot();
        controller.handle(UiEvent::FileChosen(Some(file("song.mod"))), Instant::now());

        assert_eq!(controller.state(), TransportState::Loading);
        assert_eq!(controller.host.text, Some(DisplayText::loading()));
        assert_eq!(controller.host.status.as_deref(), Some(STATUS_LOADING));
        let controls = controller.host.controls.unwrap();
        assert!(!controls.play && !controls.pause && !controls.stop && !controls.file_input);
        assert!(!controller.pump(Instant::now()));
    }

    #[test]
    fn completed_load_plays_and_presents_metadata() {
        let mut controller = boot();
        load(
            &mut controller,
            "song.mod",
            TrackMetadata::new().with("tracker", "ProTracker"),
        );

        assert_eq!(controller.state(), TransportState::Playing);
        assert!(controller.is_playing());
        assert_eq!(
            controller.engine.calls,
            vec![EngineCall::Load("song.mod".into()), EngineCall::Play(8)]
        );
        let text = controller.host.text.clone().unwrap();
        assert_eq!(text.title, "song.mod");
        assert_eq!(text.info, "Tracker: ProTracker");
        assert_eq!(controller.host.status, None);
        assert_eq!(controller.session.file_name.as_deref(), Some("song.mod"));
    }

    #[test]
    fn empty_metadata_falls_back() {
        let mut controller = boot();
        load(&mut controller, "x.xm", TrackMetadata::new());

        let text = controller.host.text.clone().unwrap();
        assert_eq!(text.title, "x.xm");
        assert_eq!(text.info, "Tracker: Unknown");
    }

    #[test]
    fn play_while_idle_never_reaches_engine() {
        let mut controller = boot();
        controller.handle(UiEvent::Play, Instant::now());

        assert_eq!(controller.state(), TransportState::Idle);
        assert!(controller.engine.calls.is_empty());
    }

    #[test]
    fn stop_resets_display_from_any_state() {
        let mut controller = boot();
        load(&mut controller, "a.mod", TrackMetadata::new().with("title", "A"));
        controller.handle(UiEvent::TogglePause, Instant::now());
        assert_eq!(controller.state(), TransportState::Paused);

        controller.handle(UiEvent::Stop, Instant::now());

        assert_eq!(controller.state(), TransportState::Stopped);
        assert_eq!(controller.host.text, Some(DisplayText::no_song()));
        assert_eq!(controller.host.status.as_deref(), Some(STATUS_WAITING));
        assert_eq!(controller.host.cleared_selections, 1);
        assert!(controller.session.metadata.is_empty());
        assert!(controller.session.current_buffer.is_some());
        assert!(controller.host.controls.unwrap().file_input);
    }

    #[test]
    fn reload_after_stop_rederives_metadata() {
        let mut controller = boot();
        load(&mut controller, "f.mod", TrackMetadata::new().with("title", "First pass"));
        controller.handle(UiEvent::Stop, Instant::now());

        load(&mut controller, "f.mod", TrackMetadata::new().with("tracker", "NoiseTracker"));

        assert_eq!(controller.state(), TransportState::Playing);
        let text = controller.host.text.clone().unwrap();
        assert_eq!(text.title, "f.mod");
        assert_eq!(text.info, "Tracker: NoiseTracker");
    }

    #[test]
    fn play_after_stop_replays_and_restores_display() {
        let mut controller = boot();
        load(&mut controller, "loop.s3m", TrackMetadata::new().with("title", "Loop"));
        controller.handle(UiEvent::Stop, Instant::now());
        controller.engine.calls.clear();

        controller.handle(UiEvent::Play, Instant::now());

        assert_eq!(controller.state(), TransportState::Playing);
        assert_eq!(controller.engine.calls, vec![EngineCall::Play(8)]);
        assert_eq!(controller.host.text.clone().unwrap().title, "Loop");
        assert_eq!(controller.host.status, None);
    }

    #[test]
    fn selection_while_playing_is_ignored() {
        let mut controller = boot();
        load(&mut controller, "a.mod", TrackMetadata::new());
        controller.engine.calls.clear();

        controller.handle(UiEvent::FileChosen(Some(file("b.mod"))), Instant::now());

        assert_eq!(controller.state(), TransportState::Playing);
        assert!(controller.engine.calls.is_empty());
    }

    #[test]
    fn stop_during_loading_is_ignored() {
        let mut controller = boot();
        controller.handle(UiEvent::FileChosen(Some(file("a.mod"))), Instant::now());
        controller.handle(UiEvent::Stop, Instant::now());

        assert_eq!(controller.state(), TransportState::Loading);
        assert_eq!(controller.engine.calls, vec![EngineCall::Load("a.mod".into())]);
        assert_eq!(controller.host.text, Some(DisplayText::loading()));
        assert_eq!(controller.host.cleared_selections, 0);
    }

    #[test]
    fn failed_first_load_returns_to_idle() {
        let mut controller = boot();
        controller.handle(UiEvent::FileChosen(Some(file("bad.it"))), Instant::now());
        controller.engine.reject_next("unsupported format");

        assert!(controller.pump(Instant::now()));
        assert_eq!(controller.state(), TransportState::Idle);
        assert!(controller.session.current_buffer.is_none());
        assert_eq!(
            controller.host.status.as_deref(),
            Some("Error: could not load bad.it: unsupported format")
        );
        assert!(controller.host.controls.unwrap().file_input);
    }

    #[test]
    fn failed_reload_keeps_previous_session() {
        let mut controller = boot();
        load(&mut controller, "good.xm", TrackMetadata::new().with("title", "Good"));
        controller.handle(UiEvent::Stop, Instant::now());
        let before = controller.session.current_buffer.clone();

        controller.handle(UiEvent::FileChosen(Some(file("bad.xm"))), Instant::now());
        controller.engine.abandon_next();
        controller.pump(Instant::now());

        assert_eq!(controller.state(), TransportState::Stopped);
        assert_eq!(controller.session.current_buffer, before);
        assert_eq!(controller.session.file_name.as_deref(), Some("good.xm"));
        assert!(controller
            .host
            .status
            .as_deref()
            .unwrap()
            .ends_with(&LoadError::Abandoned.to_string()));
    }

    #[test]
    fn load_timeout_unblocks_the_session() {
        let config = AppConfig {
            load_timeout_ms: Some(100),
            ..Default::default()
        };
        let mut controller = SessionController::boot(
            Some(RecordingEngine::default()),
            RecordingHost::default(),
            &config,
        )
        .unwrap();
        let start = Instant::now();
        controller.handle(UiEvent::FileChosen(Some(file("hang.mod"))), start);

        assert!(!controller.pump(start + Duration::from_millis(50)));
        assert!(controller.pump(start + Duration::from_millis(100)));
        assert_eq!(controller.state(), TransportState::Idle);

        // A late completion after the timeout is discarded.
        controller.engine.resolve_next();
        assert!(!controller.pump(start + Duration::from_millis(200)));
        assert_eq!(controller.state(), TransportState::Idle);
    }

    #[test]
    fn controls_track_every_transition() {
        let mut controller = boot();
        load(&mut controller, "a.mod", TrackMetadata::new());
        controller.handle(UiEvent::TogglePause, Instant::now());
        controller.handle(UiEvent::TogglePause, Instant::now());
        controller.handle(UiEvent::Stop, Instant::now());

        let expected: Vec<ControlState> = [
            TransportState::Idle,
            TransportState::Loading,
            TransportState::Playing,
            TransportState::Paused,
            TransportState::Playing,
            TransportState::Stopped,
        ]
        .into_iter()
        .map(ControlState::for_state)
        .collect();
        assert_eq!(controller.host.control_history, expected);
    }
}
