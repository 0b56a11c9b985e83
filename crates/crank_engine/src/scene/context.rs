//! Access handed to node hooks

use std::rc::Rc;

use super::{Node, NodeId, Scene, SceneError};
use crate::assets::{AssetCaches, AssetError, AssetSource, Font, Sound, Texture};
use crate::backend::{Backend, BackendError, RendererHandle};
use crate::foundation::math::{Rect, Vec2};
use crate::input::InputState;

/// Window and loop state visible to gameplay code
#[derive(Debug, Clone)]
pub struct Screen {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) viewport: Rect,
    pub(crate) dpi_scale: Vec2,
    pub(crate) has_focus: bool,
    pub(crate) quit_requested: bool,
}

impl Screen {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            viewport: Rect::new(0.0, 0.0, width as f32, height as f32),
            dpi_scale: Vec2::new(1.0, 1.0),
            has_focus: false,
            quit_requested: false,
        }
    }

    /// Drawable width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Drawable height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Region nodes are culled against
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Drawable size divided by requested window size
    pub fn dpi_scale(&self) -> Vec2 {
        self.dpi_scale
    }

    /// Whether the window has keyboard focus
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Whether the loop will stop at the top of the next frame
    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Stop the loop at the top of the next frame
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }
}

/// Everything a hook can reach, pointed at the node being called
pub struct NodeContext<'a> {
    pub(crate) node: NodeId,
    /// The scene tree
    pub scene: &'a mut Scene,
    /// Input state for this frame
    pub input: &'a InputState,
    /// Window and loop state
    pub screen: &'a mut Screen,
    /// Resource caches
    pub assets: &'a mut AssetCaches,
    /// Platform backend
    pub backend: &'a mut dyn Backend,
    pub(crate) renderer: RendererHandle,
}

impl<'a> NodeContext<'a> {
    pub(crate) fn new(
        scene: &'a mut Scene,
        input: &'a InputState,
        screen: &'a mut Screen,
        assets: &'a mut AssetCaches,
        backend: &'a mut dyn Backend,
        renderer: RendererHandle,
    ) -> Self {
        Self {
            node: NodeId::default(),
            scene,
            input,
            screen,
            assets,
            backend,
            renderer,
        }
    }

    /// Id of the node the hook belongs to
    pub fn id(&self) -> NodeId {
        self.node
    }

    /// Renderer the game draws with
    pub fn renderer(&self) -> RendererHandle {
        self.renderer
    }

    /// The node the hook belongs to
    pub fn node(&self) -> Result<&Node, SceneError> {
        self.scene.node(self.node)
    }

    /// The node the hook belongs to, mutably
    pub fn node_mut(&mut self) -> Result<&mut Node, SceneError> {
        self.scene.node_mut(self.node)
    }

    /// Local rect of the node
    pub fn rect(&self) -> Result<Rect, SceneError> {
        Ok(self.node()?.rect())
    }

    /// Move the node
    pub fn set_position(&mut self, x: f32, y: f32) -> Result<(), SceneError> {
        self.node_mut()?.set_position(x, y);
        Ok(())
    }

    /// Attach a new child under the node
    pub fn add_child(&mut self, child: Node) -> Result<NodeId, SceneError> {
        self.scene.add_child(self.node, child)
    }

    /// Mark the node and its subtree for removal at the end of the frame
    pub fn destroy(&mut self) -> Result<(), SceneError> {
        self.scene.destroy(self.node)
    }

    /// Stop the game loop at the top of the next frame
    pub fn quit(&mut self) {
        self.screen.request_quit();
    }

    /// Whether the window has keyboard focus
    pub fn has_focus(&self) -> bool {
        self.screen.has_focus()
    }

    /// Load a texture through the cache
    pub fn load_texture<'s>(&mut self, source: impl Into<AssetSource<'s>>) -> Result<Rc<Texture>, AssetError> {
        self.assets.load_texture(self.backend, self.renderer, source.into())
    }

    /// Load a font through the cache
    pub fn load_font<'s>(
        &mut self,
        source: impl Into<AssetSource<'s>>,
        point_size: u32,
    ) -> Result<Rc<Font>, AssetError> {
        self.assets.load_font(self.backend, source.into(), point_size)
    }

    /// Load a sound effect through the cache
    pub fn load_sfx<'s>(&mut self, source: impl Into<AssetSource<'s>>) -> Result<Rc<Sound>, AssetError> {
        self.assets.load_sfx(self.backend, source.into())
    }

    /// Play a loaded sound once (or looping, for music)
    pub fn play(&mut self, sound: &Sound) -> Result<(), BackendError> {
        self.assets.audio.play(self.backend, sound)
    }

    /// Rasterize `text` on the node's text visual
    pub fn set_text(&mut self, text: &str) -> Result<(), SceneError> {
        self.set_text_of(self.node, text)
    }

    /// Rasterize `text` on another node's text visual
    pub fn set_text_of(&mut self, id: NodeId, text: &str) -> Result<(), SceneError> {
        let renderer = self.renderer;
        self.scene.node_mut(id)?.set_text(self.backend, renderer, text)
    }
}
