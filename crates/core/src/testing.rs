//! Recording fakes shared by the unit tests.

use std::collections::VecDeque;

use crate::{
    feedback::{Bar, Canvas},
    load_channel, ControlState, DisplayText, FileHandle, HostSurface, LoadCompletion,
    LoadResolver, ModuleBuffer, PlaybackEngine, Rgba, TrackMetadata,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Load(String),
    /// Carries the buffer length.
    Play(usize),
    TogglePause,
    Unpause,
    Stop,
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<EngineCall>,
    pub metadata: TrackMetadata,
    pending: VecDeque<(FileHandle, LoadResolver)>,
}

impl RecordingEngine {
    /// Fulfils the oldest pending load with the file's own bytes.
    pub fn resolve_next(&mut self) {
        let (file, resolver) = self.pending.pop_front().expect("no pending load");
        resolver.resolve(ModuleBuffer::new(file.bytes));
    }

    pub fn reject_next(&mut self, reason: &str) {
        let (_, resolver) = self.pending.pop_front().expect("no pending load");
        resolver.reject(reason);
    }

    pub fn abandon_next(&mut self) {
        self.pending.pop_front().expect("no pending load");
    }
}

impl PlaybackEngine for RecordingEngine {
    fn load(&mut self, file: FileHandle) -> LoadCompletion {
        self.calls.push(EngineCall::Load(file.name.clone()));
        let (resolver, completion) = load_channel();
        self.pending.push_back((file, resolver));
        completion
    }

    fn play(&mut self, buffer: &ModuleBuffer) {
        self.calls.push(EngineCall::Play(buffer.len()));
    }

    fn toggle_pause(&mut self) {
        self.calls.push(EngineCall::TogglePause);
    }

    fn unpause(&mut self) {
        self.calls.push(EngineCall::Unpause);
    }

    fn stop(&mut self) {
        self.calls.push(EngineCall::Stop);
    }

    fn metadata(&self) -> TrackMetadata {
        self.metadata.clone()
    }
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub controls: Option<ControlState>,
    pub control_history: Vec<ControlState>,
    pub status: Option<String>,
    pub text: Option<DisplayText>,
    pub cleared_selections: usize,
}

impl HostSurface for RecordingHost {
    fn set_controls(&mut self, controls: ControlState) {
        self.controls = Some(controls);
        self.control_history.push(controls);
    }

    fn set_status(&mut self, text: Option<&str>) {
        self.status = text.map(str::to_string);
    }

    fn set_track_text(&mut self, text: &DisplayText) {
        self.text = Some(text.clone());
    }

    fn clear_file_selection(&mut self) {
        self.cleared_selections += 1;
    }
}

#[derive(Debug)]
pub struct RecordingCanvas {
    pub width: f32,
    pub height: f32,
    pub clears: usize,
    pub bars: Vec<Bar>,
    pub color: Option<Rgba>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            clears: 0,
            bars: Vec::new(),
            color: None,
        }
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.bars.clear();
    }

    fn fill_bars(&mut self, bars: &[Bar], color: Rgba) {
        self.bars.extend_from_slice(bars);
        self.color = Some(color);
    }
}
