//! Decorative activity bars.
//!
//! The engine gives no access to the samples it plays, so this is noise gated
//! by the "is playing" flag rather than a real spectrum. Each frame is drawn
//! from scratch; nothing carries over between frames.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{FeedbackConfig, Rgba};

/// Axis-aligned rectangle in surface units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// 2-D drawing surface provided by the host.
pub trait Canvas {
    /// Width and height in surface units.
    fn size(&self) -> (f32, f32);

    fn clear(&mut self);

    fn fill_bars(&mut self, bars: &[Bar], color: Rgba);
}

/// Paints one frame per host animation tick.
#[derive(Debug)]
pub struct FeedbackLoop<R = StdRng> {
    config: FeedbackConfig,
    rng: R,
    bars: Vec<Bar>,
}

impl FeedbackLoop<StdRng> {
    pub fn new(config: FeedbackConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> FeedbackLoop<R> {
    pub fn with_rng(config: FeedbackConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            bars: Vec::new(),
        }
    }

    /// Clears the surface and, while playing, fills it with random bars.
    /// Returns the number of bar slots drawn.
    pub fn frame<C>(&mut self, is_playing: bool, canvas: &mut C) -> usize
    where
        C: Canvas + ?Sized,
    {
        canvas.clear();
        if !is_playing {
            return 0;
        }

        let (width, height) = canvas.size();
        let slots = slot_count(width, self.config.bar_stride);
        let ratio = if self.config.height_ratio.is_finite() {
            self.config.height_ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let max_height = height.max(0.0) * ratio;

        self.bars.clear();
        for slot in 0..slots {
            let bar_height = self.rng.gen::<f32>() * max_height;
            self.bars.push(Bar {
                x: slot as f32 * self.config.bar_stride,
                y: height / 2.0 - bar_height / 2.0,
                width: self.config.bar_width,
                height: bar_height,
            });
        }

        canvas.fill_bars(&self.bars, self.config.fill);
        slots
    }
}

/// Upper bound on bars per frame, whatever the surface size and stride.
pub const MAX_SLOTS: usize = 4096;

/// Number of bars starting at 0 and stepping by `stride` while inside `width`,
/// capped at [`MAX_SLOTS`].
pub fn slot_count(width: f32, stride: f32) -> usize {
    if width <= 0.0 || stride <= 0.0 || !width.is_finite() || !stride.is_finite() {
        return 0;
    }
    ((width / stride).ceil() as usize).min(MAX_SLOTS)
}
