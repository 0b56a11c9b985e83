//! Headless backend
//!
//! Records every draw call instead of rasterizing, decodes images with the
//! `image` crate to learn their real size, fakes fixed-advance font metrics,
//! and serves input from a scripted event queue. Used by the test suite and
//! by demos running without a display.

use std::collections::{HashMap, VecDeque};

use super::{
    Backend, BackendError, BackendEvent, BackendResult, FontHandle, RendererHandle, SoundHandle,
    SoundKind, TextureDraw, TextureHandle, TextureInfo, WindowHandle,
};
use crate::config::AudioConfig;
use crate::foundation::math::{Color, Rect};

/// A recorded renderer command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// Target cleared
    Clear(Color),
    /// Viewport changed
    SetViewport(Rect),
    /// Filled rectangle drawn
    FillRect {
        /// Destination rectangle
        rect: Rect,
        /// Fill color
        color: Color,
    },
    /// Textured rectangle drawn
    Texture {
        /// Texture sampled
        texture: TextureHandle,
        /// Draw parameters
        draw: TextureDraw,
    },
    /// Frame presented
    Present,
}

#[derive(Debug)]
struct WindowState {
    title: String,
    width: u32,
    height: u32,
}

/// Backend that keeps everything in memory
#[derive(Debug)]
pub struct HeadlessBackend {
    next_handle: u64,
    dpi_scale: f32,
    fail_window_creation: bool,
    windows: HashMap<WindowHandle, WindowState>,
    renderers: Vec<RendererHandle>,
    events: VecDeque<BackendEvent>,
    draw_calls: Vec<DrawCall>,
    textures: HashMap<TextureHandle, (u32, u32)>,
    fonts: HashMap<FontHandle, u32>,
    sounds: HashMap<SoundHandle, SoundKind>,
    played: Vec<(SoundHandle, SoundKind)>,
    audio: Option<AudioConfig>,
    image_decodes: usize,
    font_decodes: usize,
    sound_decodes: usize,
    frames_presented: u64,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    /// Create a backend with a DPI scale of 1
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            dpi_scale: 1.0,
            fail_window_creation: false,
            windows: HashMap::new(),
            renderers: Vec::new(),
            events: VecDeque::new(),
            draw_calls: Vec::new(),
            textures: HashMap::new(),
            fonts: HashMap::new(),
            sounds: HashMap::new(),
            played: Vec::new(),
            audio: None,
            image_decodes: 0,
            font_decodes: 0,
            sound_decodes: 0,
            frames_presented: 0,
        }
    }

    /// Report drawable sizes `scale` times the requested window size
    pub fn with_dpi_scale(mut self, scale: f32) -> Self {
        self.dpi_scale = scale;
        self
    }

    /// Make window creation fail, to exercise setup error paths
    pub fn with_failing_window(mut self) -> Self {
        self.fail_window_creation = true;
        self
    }

    /// Queue an event for the next poll
    pub fn push_event(&mut self, event: BackendEvent) {
        self.events.push_back(event);
    }

    /// All draw calls recorded so far
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Take and clear the recorded draw calls
    pub fn take_draw_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draw_calls)
    }

    /// Number of image decodes performed
    pub fn image_decodes(&self) -> usize {
        self.image_decodes
    }

    /// Number of font decodes performed
    pub fn font_decodes(&self) -> usize {
        self.font_decodes
    }

    /// Number of sound decodes performed
    pub fn sound_decodes(&self) -> usize {
        self.sound_decodes
    }

    /// Textures currently alive
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Fonts currently alive
    pub fn live_fonts(&self) -> usize {
        self.fonts.len()
    }

    /// Sounds currently alive
    pub fn live_sounds(&self) -> usize {
        self.sounds.len()
    }

    /// Windows currently alive
    pub fn live_windows(&self) -> usize {
        self.windows.len()
    }

    /// Renderers currently alive
    pub fn live_renderers(&self) -> usize {
        self.renderers.len()
    }

    /// Sounds started so far, in order
    pub fn played_sounds(&self) -> &[(SoundHandle, SoundKind)] {
        &self.played
    }

    /// Whether the audio device is open
    pub fn audio_open(&self) -> bool {
        self.audio.is_some()
    }

    /// Number of frames presented
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Title of a window
    pub fn window_title(&self, window: WindowHandle) -> Option<&str> {
        self.windows.get(&window).map(|state| state.title.as_str())
    }

    fn allocate(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn scaled(&self, value: u32) -> u32 {
        (value as f32 * self.dpi_scale).round() as u32
    }

    fn text_size(point_size: u32, text: &str, wrap_width: Option<u32>) -> (u32, u32) {
        let advance = (point_size / 2).max(1);
        let glyphs = text.chars().count() as u32;

        match wrap_width {
            Some(wrap) => {
                let per_line = (wrap / advance).max(1);
                let lines = glyphs.div_ceil(per_line);
                (glyphs.min(per_line) * advance, lines * point_size)
            }
            None => (glyphs * advance, point_size),
        }
    }
}

impl Backend for HeadlessBackend {
    fn create_window(&mut self, title: &str, width: u32, height: u32) -> BackendResult<WindowHandle> {
        if self.fail_window_creation {
            return Err(BackendError::WindowCreation("no display available".to_string()));
        }

        let window = WindowHandle(self.allocate());
        self.windows.insert(
            window,
            WindowState {
                title: title.to_string(),
                width,
                height,
            },
        );
        // A freshly shown window receives focus
        self.events.push_back(BackendEvent::FocusGained);
        Ok(window)
    }

    fn destroy_window(&mut self, window: WindowHandle) {
        self.windows.remove(&window);
    }

    fn resize_window(&mut self, window: WindowHandle, width: u32, height: u32) -> (u32, u32) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.width = width;
            state.height = height;
        }
        self.drawable_size(window)
    }

    fn drawable_size(&self, window: WindowHandle) -> (u32, u32) {
        self.windows
            .get(&window)
            .map_or((0, 0), |state| (self.scaled(state.width), self.scaled(state.height)))
    }

    fn set_window_title(&mut self, window: WindowHandle, title: &str) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.title = title.to_string();
        }
    }

    fn create_renderer(&mut self, window: WindowHandle) -> BackendResult<RendererHandle> {
        if !self.windows.contains_key(&window) {
            return Err(BackendError::RendererCreation(format!("unknown window {window:?}")));
        }
        let renderer = RendererHandle(self.allocate());
        self.renderers.push(renderer);
        Ok(renderer)
    }

    fn destroy_renderer(&mut self, renderer: RendererHandle) {
        self.renderers.retain(|r| *r != renderer);
    }

    fn clear(&mut self, _renderer: RendererHandle, color: Color) {
        self.draw_calls.push(DrawCall::Clear(color));
    }

    fn present(&mut self, _renderer: RendererHandle) {
        self.frames_presented += 1;
        self.draw_calls.push(DrawCall::Present);
    }

    fn set_viewport(&mut self, _renderer: RendererHandle, viewport: Rect) {
        self.draw_calls.push(DrawCall::SetViewport(viewport));
    }

    fn fill_rect(&mut self, _renderer: RendererHandle, rect: Rect, color: Color) {
        self.draw_calls.push(DrawCall::FillRect { rect, color });
    }

    fn draw_texture(&mut self, _renderer: RendererHandle, texture: TextureHandle, draw: &TextureDraw) {
        self.draw_calls.push(DrawCall::Texture { texture, draw: *draw });
    }

    fn poll_event(&mut self) -> Option<BackendEvent> {
        self.events.pop_front()
    }

    fn decode_image(&mut self, _renderer: RendererHandle, bytes: &[u8]) -> BackendResult<TextureInfo> {
        let image = image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))?;
        self.image_decodes += 1;

        let handle = TextureHandle(self.allocate());
        let (width, height) = (image.width(), image.height());
        self.textures.insert(handle, (width, height));
        Ok(TextureInfo { handle, width, height })
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    fn decode_font(&mut self, bytes: &[u8], point_size: u32) -> BackendResult<FontHandle> {
        if bytes.is_empty() {
            return Err(BackendError::Decode("empty font buffer".to_string()));
        }
        if point_size == 0 {
            return Err(BackendError::Decode("font point size must be positive".to_string()));
        }
        self.font_decodes += 1;

        let font = FontHandle(self.allocate());
        self.fonts.insert(font, point_size);
        Ok(font)
    }

    fn destroy_font(&mut self, font: FontHandle) {
        self.fonts.remove(&font);
    }

    fn render_text(
        &mut self,
        _renderer: RendererHandle,
        font: FontHandle,
        text: &str,
        _color: Color,
        wrap_width: Option<u32>,
    ) -> BackendResult<TextureInfo> {
        let point_size = *self
            .fonts
            .get(&font)
            .ok_or_else(|| BackendError::InvalidHandle(format!("{font:?}")))?;
        if text.is_empty() {
            return Err(BackendError::TextRendering("text has zero width".to_string()));
        }

        let (width, height) = Self::text_size(point_size, text, wrap_width);
        let handle = TextureHandle(self.allocate());
        self.textures.insert(handle, (width, height));
        Ok(TextureInfo { handle, width, height })
    }

    fn open_audio(&mut self, config: &AudioConfig) -> BackendResult<()> {
        if config.frequency == 0 || config.channels == 0 {
            return Err(BackendError::Audio(format!("unsupported audio spec {config:?}")));
        }
        self.audio = Some(config.clone());
        Ok(())
    }

    fn close_audio(&mut self) {
        self.audio = None;
    }

    fn decode_sound(&mut self, bytes: &[u8], kind: SoundKind) -> BackendResult<SoundHandle> {
        if bytes.is_empty() {
            return Err(BackendError::Decode("empty audio buffer".to_string()));
        }
        self.sound_decodes += 1;

        let sound = SoundHandle(self.allocate());
        self.sounds.insert(sound, kind);
        Ok(sound)
    }

    fn destroy_sound(&mut self, sound: SoundHandle) {
        self.sounds.remove(&sound);
    }

    fn play_sound(&mut self, sound: SoundHandle, kind: SoundKind) -> BackendResult<()> {
        if self.audio.is_none() {
            return Err(BackendError::Audio("audio device is not open".to_string()));
        }
        if !self.sounds.contains_key(&sound) {
            return Err(BackendError::InvalidHandle(format!("{sound:?}")));
        }
        self.played.push((sound, kind));
        Ok(())
    }
}
