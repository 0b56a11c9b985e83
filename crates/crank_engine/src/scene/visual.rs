//! Node visuals
//!
//! The closed set of things a node can draw. Each variant knows how to issue
//! its own draw call for a destination rect in screen space.

use std::rc::Rc;

use super::SceneError;
use crate::assets::{Font, Texture};
use crate::backend::{Backend, Flip, RendererHandle, TextureDraw, TextureInfo};
use crate::foundation::math::{Color, IRect, Rect, Vec2};

/// Seconds each sprite frame is shown by default
pub const DEFAULT_FRAME_SPEED: f64 = 0.1;

/// What a node draws
#[derive(Debug, Default)]
pub enum Visual {
    /// Nothing; the node only groups children or runs logic
    #[default]
    None,
    /// Solid filled rectangle
    Rect {
        /// Fill color
        fill: Color,
    },
    /// Texture, or a region of one
    Image(ImageVisual),
    /// Frame-based animation over a texture
    Sprite(SpriteVisual),
    /// Rasterized text
    Text(TextVisual),
}

impl Visual {
    /// Short name of the variant
    pub fn kind_name(&self) -> &'static str {
        match self {
            Visual::None => "Node",
            Visual::Rect { .. } => "Rect",
            Visual::Image(_) => "Image",
            Visual::Sprite(_) => "Sprite",
            Visual::Text(_) => "Text",
        }
    }

    /// Size the visual wants its node to have
    pub(crate) fn natural_size(&self) -> Option<Vec2> {
        match self {
            Visual::None | Visual::Rect { .. } => None,
            Visual::Image(image) => image.texture_size(),
            Visual::Sprite(sprite) => sprite
                .current_frame()
                .map(|frame| Vec2::new(frame.w as f32, frame.h as f32)),
            Visual::Text(text) => text
                .texture
                .map(|info| Vec2::new(info.width as f32, info.height as f32)),
        }
    }

    /// Issue the draw call for `dst`
    pub fn draw(&self, backend: &mut dyn Backend, renderer: RendererHandle, dst: Rect) {
        match self {
            Visual::None => {}
            Visual::Rect { fill } => backend.fill_rect(renderer, dst, *fill),
            Visual::Image(image) => image.draw(backend, renderer, dst, image.src),
            Visual::Sprite(sprite) => sprite.draw(backend, renderer, dst),
            Visual::Text(text) => text.draw(backend, renderer, dst),
        }
    }

    /// Release textures the visual owns (cached textures are left alone)
    pub(crate) fn release(&mut self, backend: &mut dyn Backend) {
        if let Visual::Text(text) = self {
            text.release(backend);
        }
    }
}

/// A texture drawn into the node rect
#[derive(Debug, Clone)]
pub struct ImageVisual {
    texture: Option<Rc<Texture>>,
    /// Region of the texture to draw; `None` draws all of it
    pub src: Option<IRect>,
    /// Color modulation
    pub tint: Color,
    /// Alpha modulation
    pub alpha: u8,
    /// Mirroring
    pub flip: Flip,
}

impl Default for ImageVisual {
    fn default() -> Self {
        Self {
            texture: None,
            src: None,
            tint: Color::WHITE,
            alpha: u8::MAX,
            flip: Flip::empty(),
        }
    }
}

impl ImageVisual {
    /// Image showing `texture`
    pub fn new(texture: Rc<Texture>) -> Self {
        Self {
            texture: Some(texture),
            ..Self::default()
        }
    }

    /// Texture, if assigned
    pub fn texture(&self) -> Option<&Rc<Texture>> {
        self.texture.as_ref()
    }

    pub(crate) fn set_texture(&mut self, texture: Rc<Texture>) {
        self.texture = Some(texture);
    }

    fn texture_size(&self) -> Option<Vec2> {
        self.texture
            .as_ref()
            .map(|texture| Vec2::new(texture.width() as f32, texture.height() as f32))
    }

    fn draw(&self, backend: &mut dyn Backend, renderer: RendererHandle, dst: Rect, src: Option<IRect>) {
        let Some(texture) = &self.texture else {
            return;
        };
        let draw = TextureDraw {
            src,
            dst,
            tint: self.tint,
            alpha: self.alpha,
            flip: self.flip,
        };
        backend.draw_texture(renderer, texture.handle(), &draw);
    }
}

/// Frame animation over a sprite sheet
#[derive(Debug, Clone)]
pub struct SpriteVisual {
    /// Underlying image; the current frame is drawn instead of its `src`
    pub image: ImageVisual,
    frames: Vec<IRect>,
    frame: usize,
    frame_speed: f64,
    elapsed: f64,
    playing: bool,
}

impl Default for SpriteVisual {
    fn default() -> Self {
        Self {
            image: ImageVisual::default(),
            frames: Vec::new(),
            frame: 0,
            frame_speed: DEFAULT_FRAME_SPEED,
            elapsed: 0.0,
            playing: false,
        }
    }
}

impl SpriteVisual {
    /// Stopped sprite over `texture` with no frames
    pub fn new(texture: Rc<Texture>) -> Self {
        Self {
            image: ImageVisual::new(texture),
            ..Self::default()
        }
    }

    /// Use `frames` as the animation
    pub fn with_frames(mut self, frames: Vec<IRect>) -> Self {
        self.set_frames(frames);
        self
    }

    /// Replace the frame list and rewind
    pub fn set_frames(&mut self, frames: Vec<IRect>) {
        self.frames = frames;
        self.frame = 0;
        self.elapsed = 0.0;
    }

    /// Fill the frame list from a `columns` by `rows` grid covering a
    /// `width` by `height` region, with `padding` pixels between cells and
    /// the grid shifted by `offset` cells. Frames run down each column
    /// first.
    pub fn calculate_frames(
        &mut self,
        width: f32,
        height: f32,
        columns: u32,
        rows: u32,
        padding: Vec2,
        offset: Vec2,
    ) {
        let mut frames = Vec::with_capacity((columns * rows) as usize);
        if columns > 0 && rows > 0 {
            let cell_width = (width - padding.x * (columns - 1) as f32) / columns as f32;
            let cell_height = (height - padding.y * (rows - 1) as f32) / rows as f32;

            for column in 0..columns {
                for row in 0..rows {
                    frames.push(IRect::new(
                        ((offset.x + column as f32) * (cell_width + padding.x)) as i32,
                        ((offset.y + row as f32) * (cell_height + padding.y)) as i32,
                        cell_width as i32,
                        cell_height as i32,
                    ));
                }
            }
        }
        self.set_frames(frames);
    }

    /// Frames in playback order
    pub fn frames(&self) -> &[IRect] {
        &self.frames
    }

    /// Index of the frame being shown
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Region of the frame being shown
    pub fn current_frame(&self) -> Option<IRect> {
        self.frames.get(self.frame).copied()
    }

    /// Seconds per frame
    pub fn frame_speed(&self) -> f64 {
        self.frame_speed
    }

    /// Change the seconds per frame
    pub fn set_frame_speed(&mut self, frame_speed: f64) {
        self.frame_speed = frame_speed;
    }

    /// Resume playback
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Pause on the current frame
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Stop and rewind to the first frame
    pub fn stop(&mut self) {
        self.playing = false;
        self.frame = 0;
    }

    /// Whether the animation is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub(crate) fn advance(&mut self, delta_time: f64) {
        if !self.playing || self.frames.is_empty() {
            return;
        }

        self.elapsed += delta_time;
        if self.elapsed < self.frame_speed {
            return;
        }

        self.frame = (self.frame + 1) % self.frames.len();
        self.elapsed = 0.0;
    }

    fn draw(&self, backend: &mut dyn Backend, renderer: RendererHandle, dst: Rect) {
        if let Some(frame) = self.current_frame() {
            self.image.draw(backend, renderer, dst, Some(frame));
        }
    }
}

/// Text rasterized with a font into a node-owned texture
#[derive(Debug, Default)]
pub struct TextVisual {
    font: Option<Rc<Font>>,
    /// Color used the next time the text is rasterized
    pub color: Color,
    text: String,
    texture: Option<TextureInfo>,
}

impl TextVisual {
    /// Text visual using `font`, white
    pub fn new(font: Rc<Font>) -> Self {
        Self {
            font: Some(font),
            color: Color::WHITE,
            ..Self::default()
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Font, if assigned
    pub fn font(&self) -> Option<&Rc<Font>> {
        self.font.as_ref()
    }

    /// Change the font; takes effect at the next `set_text`
    pub fn set_font(&mut self, font: Rc<Font>) {
        self.font = Some(font);
    }

    /// Last text rasterized
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Texture holding the rasterized text
    pub fn texture(&self) -> Option<TextureInfo> {
        self.texture
    }

    /// Rasterize `text`, replacing the previous texture
    pub(crate) fn rasterize(
        &mut self,
        backend: &mut dyn Backend,
        renderer: RendererHandle,
        text: &str,
        wrap_width: Option<u32>,
    ) -> Result<TextureInfo, SceneError> {
        let font = self.font.as_ref().ok_or(SceneError::MissingFont)?.handle();

        self.release(backend);
        let info = backend.render_text(renderer, font, text, self.color, wrap_width)?;
        self.text = text.to_string();
        self.texture = Some(info);
        Ok(info)
    }

    fn draw(&self, backend: &mut dyn Backend, renderer: RendererHandle, dst: Rect) {
        if let Some(info) = self.texture {
            backend.draw_texture(renderer, info.handle, &TextureDraw::new(dst));
        }
    }

    fn release(&mut self, backend: &mut dyn Backend) {
        if let Some(info) = self.texture.take() {
            backend.destroy_texture(info.handle);
        }
    }
}
