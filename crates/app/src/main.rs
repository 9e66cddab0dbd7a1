mod engine;
mod terminal;

use std::{
    collections::VecDeque,
    io::BufRead,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use modplayer_core::{
    metadata, AppConfig, FeedbackLoop, FileHandle, ModPlayerError, PlaybackEngine,
    SessionController, TransportState, UiEvent,
};
use tracing_subscriber::EnvFilter;

use crate::{
    engine::ProbeEngine,
    terminal::{MeterCanvas, TerminalHost},
};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> modplayer_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            meter,
            meter_columns,
            files,
        } => {
            let config = load_config(config.as_deref())?;
            run_session(&config, meter.then_some(meter_columns), files)
        }
        Commands::Probe { input } => run_probe(&input),
    }
}

fn load_config(path: Option<&Path>) -> modplayer_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::from_path(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn run_session(
    config: &AppConfig,
    meter_columns: Option<usize>,
    files: Vec<PathBuf>,
) -> modplayer_core::Result<()> {
    let engine = ProbeEngine::new(config.engine.clone());
    let mut session = SessionController::boot(Some(engine), TerminalHost::default(), config)?;
    let mut feedback = FeedbackLoop::new(config.feedback.clone());
    let mut canvas = meter_columns.map(|columns| {
        MeterCanvas::new(
            columns,
            config.feedback.bar_stride,
            config.feedback.height_ratio,
        )
    });
    let frame_interval = config.feedback.frame_interval();

    let mut queued: VecDeque<Command> = files.into_iter().map(Command::Open).collect();
    let commands = spawn_stdin_reader();
    tracing::info!("commands: open <path> | play | pause | stop | quit");

    loop {
        let next = if !queued.is_empty() && ready_for_next_file(session.state()) {
            queued.pop_front()
        } else {
            match commands.recv_timeout(frame_interval) {
                Ok(line) => match Command::parse(&line) {
                    Ok(command) => Some(command),
                    Err(message) => {
                        tracing::warn!("{message}");
                        None
                    }
                },
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => Some(Command::Quit),
            }
        };

        let now = Instant::now();
        match next {
            Some(Command::Quit) => break,
            Some(command) => {
                if let Some(event) = command.into_event() {
                    session.handle(event, now);
                }
            }
            None => {}
        }

        session.pump(now);
        if let Some(canvas) = canvas.as_mut() {
            feedback.frame(session.is_playing(), canvas);
            canvas.present();
        }
    }

    eprintln!();
    tracing::info!(state = ?session.state(), "session closed");
    Ok(())
}

/// Queued files open one at a time, only once nothing is loaded, playing or
/// paused. The file input is also enabled while paused, but a paused song is
/// left alone.
fn ready_for_next_file(state: TransportState) -> bool {
    matches!(state, TransportState::Idle | TransportState::Stopped)
}

fn run_probe(input: &Path) -> modplayer_core::Result<()> {
    tracing::info!(?input, "probing module");
    let file = read_file(input)?;
    let name = file.name.clone();

    let mut engine = ProbeEngine::new(Default::default());
    let buffer = engine.load(file).wait(PROBE_TIMEOUT)?;
    engine.play(&buffer);
    let text = metadata::present(&engine.metadata(), &name);
    engine.stop();

    let json =
        serde_json::to_string_pretty(&text).map_err(|err| ModPlayerError::msg(err.to_string()))?;
    println!("{json}");
    Ok(())
}

fn read_file(path: &Path) -> modplayer_core::Result<FileHandle> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FileHandle::new(name, bytes))
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// One line of user input, mirroring the host controls.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// `open` with no path behaves like a cancelled file picker.
    Open(PathBuf),
    Cancel,
    Play,
    Pause,
    Stop,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match word {
            "open" if rest.is_empty() => Ok(Self::Cancel),
            "open" => Ok(Self::Open(PathBuf::from(rest))),
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "stop" => Ok(Self::Stop),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command `{other}`")),
        }
    }

    fn into_event(self) -> Option<UiEvent> {
        match self {
            Self::Open(path) => match read_file(&path) {
                Ok(file) => Some(UiEvent::FileChosen(Some(file))),
                Err(err) => {
                    tracing::error!(?path, %err, "could not read file");
                    None
                }
            },
            Self::Cancel => Some(UiEvent::FileChosen(None)),
            Self::Play => Some(UiEvent::Play),
            Self::Pause => Some(UiEvent::TogglePause),
            Self::Stop => Some(UiEvent::Stop),
            Self::Quit => None,
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Tracker module player", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive session driven by commands on stdin.
    Run {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Draw the activity meter on stderr.
        #[arg(long)]
        meter: bool,
        /// Width of the activity meter in bars.
        #[arg(long, default_value_t = 48)]
        meter_columns: usize,
        /// Module files to open in order; each waits until the previous one
        /// is stopped or fails to load.
        files: Vec<PathBuf>,
    },
    /// Print the title and info a module would be shown with.
    Probe {
        /// Path to the module file.
        input: PathBuf,
    },
}
