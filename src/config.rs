//! Configuration - all tunable parameters in one place.
//!
//! Every behavioral knob of the presenter and the demo player lives here,
//! with defaults; the command line only overrides individual fields.

use crate::geometry::FitMode;
use crate::raster::DrawStyle;
use std::time::Duration;

/// Master configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// How frames are laid out and the background painted
    pub present: PresentConfig,
    /// Window defaults
    pub window: WindowConfig,
    /// Frame source pacing
    pub feed: FeedConfig,
}

/// Presentation configuration
#[derive(Debug, Clone)]
pub struct PresentConfig {
    /// Initial fit mode
    pub fit_mode: FitMode,
    /// Fill color used when the background is repainted (RGBA)
    pub background: [u8; 4],
    /// Outline color of the repainted background (RGBA)
    pub outline: [u8; 4],
}

impl PresentConfig {
    /// Drawing style handed to the raster target
    pub fn style(&self) -> DrawStyle {
        DrawStyle {
            pen: self.outline,
            brush: self.background,
        }
    }
}

impl Default for PresentConfig {
    fn default() -> Self {
        Self {
            fit_mode: FitMode::Autofit,
            background: [0, 0, 0, 255], // Black
            outline: [0, 0, 0, 255],
        }
    }
}

/// Window configuration
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Default client width
    pub default_width: u32,
    /// Default client height
    pub default_height: u32,
    /// Title prefix
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_width: 1280,
            default_height: 720,
            title: "fitblit".to_string(),
        }
    }
}

/// Feed configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Time each frame stays on screen
    pub frame_interval: Duration,
    /// Decoded frames buffered ahead of the display
    pub queue_depth: usize,
    /// Frames decoded in parallel per batch
    pub decode_batch: usize,
    /// Start over after the last frame
    pub loop_playback: bool,
    /// Decode every frame as 8-bit grey
    pub force_grey: bool,
}

/// Slowest and fastest accepted playback rates
const MIN_FPS: f64 = 0.1;
const MAX_FPS: f64 = 240.0;

impl FeedConfig {
    /// Set the interval from a frames-per-second rate, clamped to a sane range
    pub fn set_fps(&mut self, fps: f64) {
        let fps = if fps.is_finite() {
            fps.clamp(MIN_FPS, MAX_FPS)
        } else {
            MAX_FPS
        };
        self.frame_interval = Duration::from_secs_f64(1.0 / fps);
    }

    pub fn fps(&self) -> f64 {
        1.0 / self.frame_interval.as_secs_f64()
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            // 25 fps
            frame_interval: Duration::from_millis(40),
            queue_depth: 4,
            decode_batch: 8,
            loop_playback: true,
            force_grey: false,
        }
    }
}
