//! Game configuration
//!
//! Defaults mirror the engine's built-in constants: an 800x600 window,
//! 60 rendered frames per second and a 0.02 second fixed tick.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::Color;

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;
/// Default render frame rate cap
pub const DEFAULT_FRAME_RATE: f64 = 60.0;
/// Default fixed simulation tick in seconds
pub const DEFAULT_FIXED_TIME_STEP: f64 = 0.02;

/// Top-level configuration for a [`Game`](crate::Game)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Window configuration
    pub window: WindowConfig,

    /// Color the frame is cleared to before rendering
    pub clear_color: Color,

    /// Render frame rate cap; `None` renders every loop iteration
    pub target_frame_rate: Option<f64>,

    /// Duration of one fixed update tick in seconds
    pub fixed_time_step: f64,

    /// Asset system configuration
    pub assets: AssetConfig,

    /// Audio device parameters
    pub audio: AudioConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            clear_color: Color::BLACK,
            target_frame_rate: Some(DEFAULT_FRAME_RATE),
            fixed_time_step: DEFAULT_FIXED_TIME_STEP,
            assets: AssetConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl Config for GameConfig {}

impl GameConfig {
    /// Set the window title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    /// Set the requested window size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the render frame rate cap
    pub fn with_frame_rate(mut self, frame_rate: Option<f64>) -> Self {
        self.target_frame_rate = frame_rate;
        self
    }

    /// Set the fixed update tick
    pub fn with_fixed_time_step(mut self, step: f64) -> Self {
        self.fixed_time_step = step;
        self
    }

    /// Reject values the game loop cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !(self.fixed_time_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_time_step must be positive, got {}",
                self.fixed_time_step
            )));
        }
        if let Some(rate) = self.target_frame_rate {
            if !(rate > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "target_frame_rate must be positive, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,

    /// Requested window width
    pub width: u32,

    /// Requested window height
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

/// Asset system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directories relative asset paths are resolved against, in order
    pub search_paths: Vec<PathBuf>,
}

/// Audio device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate (e.g., 44100, 48000)
    pub frequency: u32,
    /// Number of output channels (1=mono, 2=stereo)
    pub channels: u16,
    /// Buffer size in sample frames
    pub chunk_size: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            frequency: 44100,
            channels: 2,
            chunk_size: 1024,
        }
    }
}
