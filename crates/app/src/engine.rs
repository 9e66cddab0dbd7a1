//! Stand-in for the external decode engine.
//!
//! Loads happen on a worker thread like a real decoder would, and metadata is
//! read from the module header. No audio is produced; transport calls are
//! logged and tracked so the session can be driven end to end from a
//! terminal.

use std::thread;

use modplayer_core::{
    load_channel, metadata, EngineConfig, FileHandle, LoadCompletion, ModuleBuffer,
    PlaybackEngine, TrackMetadata,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Silent,
    Running,
    Paused,
}

#[derive(Debug)]
pub struct ProbeEngine {
    config: EngineConfig,
    output: Output,
    current: TrackMetadata,
}

impl ProbeEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            output: Output::Silent,
            current: TrackMetadata::new(),
        }
    }
}

impl PlaybackEngine for ProbeEngine {
    fn load(&mut self, file: FileHandle) -> LoadCompletion {
        if file.bytes.is_empty() {
            return LoadCompletion::rejected("file is empty");
        }

        let (resolver, completion) = load_channel();
        thread::spawn(move || {
            if detect_format(&file.bytes).is_none() {
                resolver.reject("not a recognised module format");
            } else {
                resolver.resolve(ModuleBuffer::new(file.bytes));
            }
        });
        completion
    }

    fn play(&mut self, buffer: &ModuleBuffer) {
        self.current = read_header(buffer.as_bytes());
        self.output = Output::Running;
        tracing::info!(
            bytes = buffer.len(),
            repeat = self.config.repeat_count,
            "engine play"
        );
    }

    fn toggle_pause(&mut self) {
        self.output = match self.output {
            Output::Running => Output::Paused,
            Output::Paused => Output::Running,
            Output::Silent => Output::Silent,
        };
        tracing::info!(output = ?self.output, "engine toggle pause");
    }

    fn unpause(&mut self) {
        if self.output == Output::Paused {
            self.output = Output::Running;
        }
        tracing::info!(output = ?self.output, "engine unpause");
    }

    fn stop(&mut self) {
        self.output = Output::Silent;
        tracing::info!("engine stop");
    }

    fn metadata(&self) -> TrackMetadata {
        self.current.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// Amiga-style module with its four byte signature at offset 1080.
    Mod(&'static str),
    Xm,
    S3m,
    It,
}

const XM_MAGIC: &[u8] = b"Extended Module: ";

fn detect_format(bytes: &[u8]) -> Option<Format> {
    if bytes.starts_with(XM_MAGIC) {
        return Some(Format::Xm);
    }
    if bytes.starts_with(b"IMPM") {
        return Some(Format::It);
    }
    if bytes.get(44..48) == Some(b"SCRM".as_slice()) {
        return Some(Format::S3m);
    }
    let signature = bytes.get(1080..1084)?;
    let tracker = match signature {
        b"M.K." | b"M!K!" => "ProTracker",
        b"FLT4" | b"FLT8" => "StarTrekker",
        [b'1'..=b'9', b'C', b'H', b'N'] | [b'1'..=b'9', b'0'..=b'9', b'C', b'H'] => "Generic MOD",
        _ => return None,
    };
    Some(Format::Mod(tracker))
}

/// Extracts title and tracker name from a module header. Unknown formats
/// yield empty metadata so the presenter falls back to the file name.
pub fn read_header(bytes: &[u8]) -> TrackMetadata {
    let Some(format) = detect_format(bytes) else {
        return TrackMetadata::new();
    };

    let (title, tracker) = match format {
        Format::Mod(tracker) => (text_field(bytes, 0, 20), tracker.to_string()),
        Format::Xm => {
            let tracker = text_field(bytes, 38, 20);
            let tracker = if tracker.is_empty() {
                "FastTracker 2".to_string()
            } else {
                tracker
            };
            (text_field(bytes, XM_MAGIC.len(), 20), tracker)
        }
        Format::S3m => (text_field(bytes, 0, 28), s3m_tracker(bytes).to_string()),
        Format::It => (text_field(bytes, 4, 26), "Impulse Tracker".to_string()),
    };

    let mut metadata = TrackMetadata::new().with(metadata::TRACKER_KEY, tracker);
    if !title.is_empty() {
        metadata.insert(metadata::TITLE_KEY, title);
    }
    metadata
}

/// The created-with-tracker word at 0x28 names the program in its top nibble.
fn s3m_tracker(bytes: &[u8]) -> &'static str {
    let version = bytes
        .get(0x28..0x2a)
        .map(|raw| u16::from_le_bytes([raw[0], raw[1]]))
        .unwrap_or_default();
    match version >> 12 {
        2 => "Imago Orpheus",
        3 => "Impulse Tracker",
        4 => "Schism Tracker",
        5 => "OpenMPT",
        _ => "Scream Tracker 3",
    }
}

/// Latin-1 text up to the first NUL, trimmed.
fn text_field(bytes: &[u8], offset: usize, len: usize) -> String {
    let end = (offset + len).min(bytes.len());
    let raw = bytes.get(offset..end).unwrap_or_default();
    let text: String = raw
        .iter()
        .take_while(|&&byte| byte != 0)
        .map(|&byte| byte as char)
        .collect();
    text.trim().to_string()
}
