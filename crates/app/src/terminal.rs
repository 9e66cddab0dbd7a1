use std::io::Write;

use modplayer_core::{Bar, Canvas, ControlState, DisplayText, HostSurface, Rgba};

/// Host surface that prints region updates to stdout.
#[derive(Debug, Default)]
pub struct TerminalHost {
    controls: Option<ControlState>,
}

impl HostSurface for TerminalHost {
    fn set_controls(&mut self, controls: ControlState) {
        if self.controls == Some(controls) {
            return;
        }
        self.controls = Some(controls);
        println!(
            "[controls] play:{} pause:{} stop:{} open:{}",
            flag(controls.play),
            flag(controls.pause),
            flag(controls.stop),
            flag(controls.file_input),
        );
    }

    fn set_status(&mut self, text: Option<&str>) {
        if let Some(text) = text {
            println!("[status] {text}");
        }
    }

    fn set_track_text(&mut self, text: &DisplayText) {
        println!("[title] {}", text.title);
        println!("[info] {}", text.info);
    }

    fn clear_file_selection(&mut self) {
        tracing::debug!("file selection cleared");
    }
}

fn flag(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One-line meter on stderr; each bar becomes one block character.
#[derive(Debug)]
pub struct MeterCanvas {
    columns: usize,
    height_ratio: f32,
    width: f32,
    height: f32,
    line: String,
}

impl MeterCanvas {
    pub fn new(columns: usize, stride: f32, height_ratio: f32) -> Self {
        Self {
            columns,
            height_ratio,
            width: columns as f32 * stride,
            height: 100.0,
            line: String::new(),
        }
    }

    pub fn present(&self) {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{:<width$}", self.line, width = self.columns);
        let _ = err.flush();
    }
}

impl Canvas for MeterCanvas {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.line.clear();
    }

    fn fill_bars(&mut self, bars: &[Bar], _color: Rgba) {
        // Bars never exceed `height_ratio` of the surface height.
        let top = self.height * self.height_ratio;
        self.line.extend(bars.iter().map(|bar| {
            let level = if top > 0.0 {
                (bar.height / top * (LEVELS.len() - 1) as f32).round() as usize
            } else {
                0
            };
            LEVELS[level.min(LEVELS.len() - 1)]
        }));
    }
}
