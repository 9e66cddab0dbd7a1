use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{ModPlayerError, Result};

/// Top-level configuration structure for the player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub feedback: FeedbackConfig,
    /// Upper bound on how long a load may stay pending. `None` waits forever.
    pub load_timeout_ms: Option<u64>,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields fall back to defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.feedback.validate()?;
        Ok(config)
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }
}

/// Options handed to the playback engine when it is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 0 plays once, -1 loops forever, any other value repeats that many times.
    pub repeat_count: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { repeat_count: 0 }
    }
}

/// Geometry and cadence of the pseudo-visualisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub bar_width: f32,
    pub bar_stride: f32,
    /// Maximum bar height as a fraction of the surface height.
    pub height_ratio: f32,
    pub fill: Rgba,
    pub frame_interval_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            bar_width: 8.0,
            bar_stride: 10.0,
            height_ratio: 0.5,
            fill: Rgba::new(100, 255, 218, 0.1),
            frame_interval_ms: 16,
        }
    }
}

/// Smallest accepted bar stride, in surface units.
pub const MIN_BAR_STRIDE: f32 = 1.0;

impl FeedbackConfig {
    /// Rejects geometry that would draw an unbounded number of bars or bars
    /// of non-finite size.
    pub fn validate(&self) -> Result<()> {
        if !self.bar_stride.is_finite() || self.bar_stride < MIN_BAR_STRIDE {
            return Err(invalid(format!(
                "feedback.bar_stride must be at least {MIN_BAR_STRIDE}, got {}",
                self.bar_stride
            )));
        }
        if !self.bar_width.is_finite() || self.bar_width < 0.0 {
            return Err(invalid(format!(
                "feedback.bar_width must be a non-negative number, got {}",
                self.bar_width
            )));
        }
        if !(0.0..=1.0).contains(&self.height_ratio) {
            return Err(invalid(format!(
                "feedback.height_ratio must be within [0, 1], got {}",
                self.height_ratio
            )));
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

fn invalid(message: String) -> ModPlayerError {
    ModPlayerError::msg(format!("invalid configuration: {message}"))
}

/// Straight-alpha colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}
