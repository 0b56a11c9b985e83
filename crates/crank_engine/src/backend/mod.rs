//! Backend abstraction for windowing, drawing, input and asset decoding
//!
//! This module defines the trait that platform backends must implement.
//! The engine never talks to a graphics or audio library directly: every
//! window, renderer, texture, font and sound is an opaque handle minted by
//! the backend.
//!
//! # Design Philosophy
//! - **Opaque handles**: the engine stores `u64` newtypes, never backend objects
//! - **Object safe**: nodes receive the backend as `&mut dyn Backend`
//! - **Single threaded**: all calls happen on the loop thread

mod headless;

pub use headless::{DrawCall, HeadlessBackend};

use bitflags::bitflags;
use thiserror::Error;

use crate::config::AudioConfig;
use crate::foundation::math::{Color, IRect, Rect};
use crate::input::{KeyCode, MouseButton};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a native window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// Handle to a renderer bound to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererHandle(pub u64);

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a loaded font at a fixed point size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u64);

/// Handle to a decoded sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u64);

/// A texture handle together with its pixel size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    /// Backend handle
    pub handle: TextureHandle,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// How a decoded sound is played back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    /// Streamed background music, loops until replaced
    Music,
    /// Short effect played once on a free channel
    Effect,
}

bitflags! {
    /// Mirroring applied when drawing a texture
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flip: u8 {
        /// Mirror left-to-right
        const HORIZONTAL = 1 << 0;
        /// Mirror top-to-bottom
        const VERTICAL = 1 << 1;
    }
}

/// Parameters of a textured rectangle draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureDraw {
    /// Region of the texture to sample; `None` uses the whole texture
    pub src: Option<IRect>,
    /// Destination rectangle in screen space
    pub dst: Rect,
    /// Color modulation (alpha channel ignored, see `alpha`)
    pub tint: Color,
    /// Alpha modulation
    pub alpha: u8,
    /// Mirroring
    pub flip: Flip,
}

impl TextureDraw {
    /// Untinted, opaque draw of the whole texture into `dst`
    pub fn new(dst: Rect) -> Self {
        Self {
            src: None,
            dst,
            tint: Color::WHITE,
            alpha: u8::MAX,
            flip: Flip::empty(),
        }
    }
}

/// Discrete input and window events drained once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendEvent {
    /// The user asked to close the application
    Quit,
    /// Window size changed (resized, maximized, restored or minimized)
    WindowResized {
        /// New window width
        width: u32,
        /// New window height
        height: u32,
    },
    /// Window gained keyboard focus
    FocusGained,
    /// Window lost keyboard focus
    FocusLost,
    /// Key went down (repeats while held)
    KeyDown(KeyCode),
    /// Key went up
    KeyUp(KeyCode),
    /// Mouse moved, in window coordinates before DPI scaling
    MouseMotion {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
    },
    /// Mouse button went down
    MouseButtonDown(MouseButton),
    /// Mouse button went up
    MouseButtonUp(MouseButton),
}

/// Backend failures
#[derive(Debug, Error)]
pub enum BackendError {
    /// Window could not be created
    #[error("Window creation failed: {0}")]
    WindowCreation(String),

    /// Renderer could not be created
    #[error("Renderer creation failed: {0}")]
    RendererCreation(String),

    /// Asset bytes could not be decoded
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Text could not be rasterized
    #[error("Text rendering failed: {0}")]
    TextRendering(String),

    /// Audio device or playback failure
    #[error("Audio error: {0}")]
    Audio(String),

    /// A handle that the backend does not know
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),
}

/// Platform backend trait
///
/// Implementations wrap a concrete windowing, rendering, font and audio
/// stack. [`HeadlessBackend`] is the in-tree implementation used by tests
/// and the demo.
pub trait Backend {
    /// Create a window with the requested client size
    fn create_window(&mut self, title: &str, width: u32, height: u32) -> BackendResult<WindowHandle>;

    /// Destroy a window
    fn destroy_window(&mut self, window: WindowHandle);

    /// Resize the window's client area and return the drawable size in
    /// pixels, which differs from the requested size on high-DPI displays
    fn resize_window(&mut self, window: WindowHandle, width: u32, height: u32) -> (u32, u32);

    /// Current drawable size in pixels
    fn drawable_size(&self, window: WindowHandle) -> (u32, u32);

    /// Set the window title text
    fn set_window_title(&mut self, window: WindowHandle, title: &str);

    /// Create a renderer bound to a window
    fn create_renderer(&mut self, window: WindowHandle) -> BackendResult<RendererHandle>;

    /// Destroy a renderer
    fn destroy_renderer(&mut self, renderer: RendererHandle);

    /// Clear the whole target to a color
    fn clear(&mut self, renderer: RendererHandle, color: Color);

    /// Present the finished frame
    fn present(&mut self, renderer: RendererHandle);

    /// Restrict drawing to a viewport rectangle
    fn set_viewport(&mut self, renderer: RendererHandle, viewport: Rect);

    /// Draw a filled rectangle
    fn fill_rect(&mut self, renderer: RendererHandle, rect: Rect, color: Color);

    /// Draw a textured rectangle
    fn draw_texture(&mut self, renderer: RendererHandle, texture: TextureHandle, draw: &TextureDraw);

    /// Pop the next pending event, if any
    fn poll_event(&mut self) -> Option<BackendEvent>;

    /// Decode image bytes and upload them as a texture
    fn decode_image(&mut self, renderer: RendererHandle, bytes: &[u8]) -> BackendResult<TextureInfo>;

    /// Release a texture
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Decode font bytes at a point size
    fn decode_font(&mut self, bytes: &[u8], point_size: u32) -> BackendResult<FontHandle>;

    /// Release a font
    fn destroy_font(&mut self, font: FontHandle);

    /// Rasterize text into a texture; `wrap_width` wraps lines at that many
    /// pixels
    fn render_text(
        &mut self,
        renderer: RendererHandle,
        font: FontHandle,
        text: &str,
        color: Color,
        wrap_width: Option<u32>,
    ) -> BackendResult<TextureInfo>;

    /// Open the audio output device
    fn open_audio(&mut self, config: &AudioConfig) -> BackendResult<()>;

    /// Close the audio output device
    fn close_audio(&mut self);

    /// Decode audio bytes
    fn decode_sound(&mut self, bytes: &[u8], kind: SoundKind) -> BackendResult<SoundHandle>;

    /// Release a sound
    fn destroy_sound(&mut self, sound: SoundHandle);

    /// Start playback; music loops, effects play once
    fn play_sound(&mut self, sound: SoundHandle, kind: SoundKind) -> BackendResult<()>;
}
