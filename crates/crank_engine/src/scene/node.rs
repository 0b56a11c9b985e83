//! Scene nodes
//!
//! A [`Node`] is a positioned rectangle with an optional [`Visual`], an
//! optional [`Behavior`] and optional closure hooks. Nodes are built by value
//! and handed to a [`Scene`](super::Scene), which assigns their id, creation
//! index and parent link.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use super::behavior::{Behavior, HookResult};
use super::context::NodeContext;
use super::visual::{ImageVisual, SpriteVisual, TextVisual, Visual};
use super::SceneError;
use crate::assets::Texture;
use crate::backend::{Backend, RendererHandle};
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Color, Rect, Vec2};
use crate::input::PointerState;

bitflags! {
    /// Which point of the rect its position refers to
    ///
    /// At most one flag per axis may be set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Anchor: u8 {
        /// Position is the top edge
        const TOP = 1 << 0;
        /// Position is the left edge
        const LEFT = 1 << 1;
        /// Position is the bottom edge
        const BOTTOM = 1 << 2;
        /// Position is the right edge
        const RIGHT = 1 << 3;
        /// Position is the horizontal center
        const HCENTER = 1 << 4;
        /// Position is the vertical center
        const VCENTER = 1 << 5;
    }
}

impl Anchor {
    /// Horizontal flags
    pub const HORIZONTAL: Anchor = Anchor::LEFT.union(Anchor::RIGHT).union(Anchor::HCENTER);
    /// Vertical flags
    pub const VERTICAL: Anchor = Anchor::TOP.union(Anchor::BOTTOM).union(Anchor::VCENTER);
    /// Centered on both axes
    pub const CENTER: Anchor = Anchor::HCENTER.union(Anchor::VCENTER);

    /// Whether at most one flag is set on each axis
    pub fn is_valid(self) -> bool {
        self.intersection(Self::HORIZONTAL).bits().count_ones() <= 1
            && self.intersection(Self::VERTICAL).bits().count_ones() <= 1
    }

    /// Offset from the anchored position to the top-left corner of a
    /// `w` by `h` rect
    pub fn offset(self, w: f32, h: f32) -> Vec2 {
        let x = if self.contains(Self::HCENTER) {
            -w * 0.5
        } else if self.contains(Self::RIGHT) {
            -w
        } else {
            0.0
        };
        let y = if self.contains(Self::VCENTER) {
            -h * 0.5
        } else if self.contains(Self::BOTTOM) {
            -h
        } else {
            0.0
        };
        Vec2::new(x, y)
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::TOP | Anchor::LEFT
    }
}

/// Label used to find nodes of a kind without downcasting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub &'static str);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Closure run once before the node's first update
pub type StartHook = Box<dyn FnMut(&mut NodeContext<'_>) -> HookResult>;

/// Closure run every update or fixed update with the elapsed seconds
pub type TickHook = Box<dyn FnMut(&mut NodeContext<'_>, f64) -> HookResult>;

#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) start: Option<StartHook>,
    pub(crate) update: Option<TickHook>,
    pub(crate) fixed_update: Option<TickHook>,
}

/// Default local rect of a new node
pub const DEFAULT_NODE_RECT: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

/// A node in the scene tree
pub struct Node {
    rect: Rect,
    anchor: Anchor,
    scale: f32,
    z: i32,
    enabled: bool,
    tag: Option<Tag>,
    name: Option<String>,

    pub(crate) visual: Visual,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) hooks: Hooks,

    pub(crate) index: u64,
    pub(crate) started: bool,
    pub(crate) marked_for_destroy: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) pointer: PointerState,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Create an invisible node with the default rect
    pub fn new() -> Self {
        Self::with_visual(Visual::None)
    }

    /// Create a node drawn by `visual`
    pub fn with_visual(visual: Visual) -> Self {
        let mut node = Self {
            rect: DEFAULT_NODE_RECT,
            anchor: Anchor::default(),
            scale: 1.0,
            z: 0,
            enabled: true,
            tag: None,
            name: None,
            visual,
            behavior: None,
            hooks: Hooks::default(),
            index: 0,
            started: false,
            marked_for_destroy: false,
            parent: None,
            children: Vec::new(),
            pointer: PointerState::default(),
        };
        node.fit_visual();
        node
    }

    /// Create a node filled with a solid color
    pub fn filled(color: Color) -> Self {
        Self::with_visual(Visual::Rect { fill: color })
    }

    /// Create an image node
    pub fn image(image: ImageVisual) -> Self {
        Self::with_visual(Visual::Image(image))
    }

    /// Create a sprite node
    pub fn sprite(sprite: SpriteVisual) -> Self {
        Self::with_visual(Visual::Sprite(sprite))
    }

    /// Create a text node; call `set_text` once it is in a scene
    pub fn text(text: TextVisual) -> Self {
        Self::with_visual(Visual::Text(text))
    }

    /// Set the local rect
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Set the local position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.set_position(x, y);
        self
    }

    /// Set the local size
    pub fn with_dimension(mut self, w: f32, h: f32) -> Self {
        self.set_dimension(w, h);
        self
    }

    /// Set the anchor, failing on flags that conflict on one axis
    pub fn with_anchor(mut self, anchor: Anchor) -> Result<Self, SceneError> {
        self.set_anchor(anchor)?;
        Ok(self)
    }

    /// Set the scale
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the z order
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    /// Set the tag
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Set a debug name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a behavior
    pub fn with_behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.set_behavior(behavior);
        self
    }

    /// Start enabled or disabled
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Local rect, relative to the parent
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Replace the local rect
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Local position
    pub fn position(&self) -> Vec2 {
        self.rect.position()
    }

    /// Move the node
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.rect.x = x;
        self.rect.y = y;
    }

    /// Resize the node
    pub fn set_dimension(&mut self, w: f32, h: f32) {
        self.rect.w = w;
        self.rect.h = h;
    }

    /// Anchor flags
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Change the anchor. More than one flag on an axis is rejected and
    /// leaves the anchor unchanged.
    pub fn set_anchor(&mut self, anchor: Anchor) -> Result<(), SceneError> {
        if !anchor.is_valid() {
            log::warn!("{}: rejected conflicting anchor {:?}", self.debug_name(), anchor);
            return Err(SceneError::ConflictingAnchor(anchor));
        }
        self.anchor = anchor;
        Ok(())
    }

    /// Scale factor
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Change the scale factor
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Z order among siblings; higher draws later
    pub fn z(&self) -> i32 {
        self.z
    }

    /// Change the z order
    pub fn set_z(&mut self, z: i32) {
        self.z = z;
    }

    /// Whether the node and its subtree update and render
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the node and its subtree
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Tag, if any
    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }

    /// Whether the node carries `tag`
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tag == Some(tag)
    }

    /// Change the tag
    pub fn set_tag(&mut self, tag: Option<Tag>) {
        self.tag = tag;
    }

    /// Creation index, unique and increasing within a scene
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Name for log output: the explicit name, or the visual kind and index
    pub fn debug_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}#{}", self.visual.kind_name(), self.index),
        }
    }

    /// Whether `start` has run
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the node will be removed at the end of the frame
    pub fn is_marked_for_destroy(&self) -> bool {
        self.marked_for_destroy
    }

    /// Parent id; `None` for top-level nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the cursor is over the node
    pub fn is_hovered(&self) -> bool {
        self.pointer.is_hovered()
    }

    /// Whether a primary press that started on the node is still held
    pub fn is_input_active(&self) -> bool {
        self.pointer.is_active()
    }

    /// Visual
    pub fn visual(&self) -> &Visual {
        &self.visual
    }

    /// Mutable visual
    ///
    /// Replacing a text visual this way leaks its texture until teardown;
    /// prefer the text setters.
    pub fn visual_mut(&mut self) -> &mut Visual {
        &mut self.visual
    }

    /// Show `texture` on an image or sprite node. Images are resized to the
    /// texture, sprites to their current frame when they have one.
    pub fn set_texture(&mut self, texture: Rc<Texture>) -> Result<(), SceneError> {
        match &mut self.visual {
            Visual::Image(image) => image.set_texture(texture),
            Visual::Sprite(sprite) => sprite.image.set_texture(texture),
            _ => return Err(self.wrong_visual("Image or Sprite")),
        }
        self.fit_visual();
        Ok(())
    }

    /// Rasterize `text` on a text node and resize the rect to it
    pub fn set_text(
        &mut self,
        backend: &mut dyn Backend,
        renderer: RendererHandle,
        text: &str,
    ) -> Result<(), SceneError> {
        self.rasterize_text(backend, renderer, text, None)
    }

    /// Like [`set_text`](Self::set_text), wrapping lines at the current rect
    /// width
    pub fn set_wrapped_text(
        &mut self,
        backend: &mut dyn Backend,
        renderer: RendererHandle,
        text: &str,
    ) -> Result<(), SceneError> {
        let wrap_width = self.rect.w.max(0.0) as u32;
        self.rasterize_text(backend, renderer, text, Some(wrap_width))
    }

    fn rasterize_text(
        &mut self,
        backend: &mut dyn Backend,
        renderer: RendererHandle,
        text: &str,
        wrap_width: Option<u32>,
    ) -> Result<(), SceneError> {
        let Visual::Text(visual) = &mut self.visual else {
            return Err(self.wrong_visual("Text"));
        };
        let info = visual.rasterize(backend, renderer, text, wrap_width)?;
        self.set_dimension(info.width as f32, info.height as f32);
        Ok(())
    }

    /// Text last rasterized on a text node
    pub fn text_content(&self) -> Option<&str> {
        match &self.visual {
            Visual::Text(visual) => Some(visual.text()),
            _ => None,
        }
    }

    /// Sprite state, for play/pause/stop
    pub fn sprite_mut(&mut self) -> Option<&mut SpriteVisual> {
        match &mut self.visual {
            Visual::Sprite(sprite) => Some(sprite),
            _ => None,
        }
    }

    fn wrong_visual(&self, expected: &'static str) -> SceneError {
        SceneError::WrongVisual {
            node: self.debug_name(),
            expected,
        }
    }

    /// Replace the behavior
    pub fn set_behavior(&mut self, behavior: impl Behavior + 'static) {
        self.behavior = Some(Box::new(behavior));
    }

    /// Whether a behavior is attached
    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    /// Run `hook` once before the first update
    pub fn on_start(&mut self, hook: impl FnMut(&mut NodeContext<'_>) -> HookResult + 'static) {
        if self.hooks.start.is_some() {
            log::warn!("{}: replacing existing start hook", self.debug_name());
        }
        self.hooks.start = Some(Box::new(hook));
    }

    /// Run `hook` every update pass
    pub fn on_update(
        &mut self,
        hook: impl FnMut(&mut NodeContext<'_>, f64) -> HookResult + 'static,
    ) {
        if self.hooks.update.is_some() {
            log::warn!("{}: replacing existing update hook", self.debug_name());
        }
        self.hooks.update = Some(Box::new(hook));
    }

    /// Run `hook` every fixed tick
    pub fn on_fixed_update(
        &mut self,
        hook: impl FnMut(&mut NodeContext<'_>, f64) -> HookResult + 'static,
    ) {
        if self.hooks.fixed_update.is_some() {
            log::warn!("{}: replacing existing fixed update hook", self.debug_name());
        }
        self.hooks.fixed_update = Some(Box::new(hook));
    }

    /// Advance sprite animation; the rect follows the current frame size
    pub(crate) fn advance_visual(&mut self, delta_time: f64) {
        if let Visual::Sprite(sprite) = &mut self.visual {
            sprite.advance(delta_time);
            self.fit_visual();
        }
    }

    /// Size the rect to the visual's natural size, if it has one
    pub(crate) fn fit_visual(&mut self) {
        if let Some(size) = self.visual.natural_size() {
            self.set_dimension(size.x, size.y);
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.debug_name())
            .field("rect", &self.rect)
            .field("anchor", &self.anchor)
            .field("scale", &self.scale)
            .field("z", &self.z)
            .field("enabled", &self.enabled)
            .field("tag", &self.tag)
            .field("started", &self.started)
            .field("marked_for_destroy", &self.marked_for_destroy)
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_node_defaults() {
        let node = Node::new();

        assert_eq!(node.rect(), DEFAULT_NODE_RECT);
        assert_eq!(node.anchor(), Anchor::TOP | Anchor::LEFT);
        assert_relative_eq!(node.scale(), 1.0);
        assert_eq!(node.z(), 0);
        assert!(node.is_enabled());
        assert!(!node.is_started());
        assert!(!node.is_marked_for_destroy());
    }

    #[test]
    fn test_anchor_validation() {
        assert!(Anchor::CENTER.is_valid());
        assert!((Anchor::BOTTOM | Anchor::RIGHT).is_valid());
        assert!(Anchor::empty().is_valid());
        assert!(!(Anchor::LEFT | Anchor::RIGHT).is_valid());
        assert!(!(Anchor::TOP | Anchor::VCENTER).is_valid());
    }

    #[test]
    fn test_conflicting_anchor_leaves_node_unchanged() {
        let mut node = Node::new();
        node.set_anchor(Anchor::CENTER).unwrap();

        let result = node.set_anchor(Anchor::LEFT | Anchor::HCENTER);
        assert!(matches!(result, Err(SceneError::ConflictingAnchor(_))));
        assert_eq!(node.anchor(), Anchor::CENTER);
    }

    #[test]
    fn test_builder_rejects_conflicting_anchor() {
        let result = Node::new().with_anchor(Anchor::TOP | Anchor::BOTTOM);
        assert!(matches!(result, Err(SceneError::ConflictingAnchor(_))));

        let node = Node::new().with_anchor(Anchor::BOTTOM | Anchor::HCENTER).unwrap();
        assert_eq!(node.anchor(), Anchor::BOTTOM | Anchor::HCENTER);
    }

    #[test]
    fn test_anchor_offsets() {
        let offset = Anchor::CENTER.offset(50.0, 20.0);
        assert_relative_eq!(offset.x, -25.0);
        assert_relative_eq!(offset.y, -10.0);

        let offset = (Anchor::BOTTOM | Anchor::RIGHT).offset(50.0, 20.0);
        assert_relative_eq!(offset.x, -50.0);
        assert_relative_eq!(offset.y, -20.0);

        let offset = Anchor::default().offset(50.0, 20.0);
        assert_relative_eq!(offset.x, 0.0);
        assert_relative_eq!(offset.y, 0.0);
    }

    #[test]
    fn test_setters_do_not_validate() {
        let mut node = Node::new();
        node.set_dimension(-5.0, 0.0);
        node.set_position(f32::MAX, -1.0);

        assert_eq!(node.rect(), Rect::new(f32::MAX, -1.0, -5.0, 0.0));
    }

    #[test]
    fn test_debug_name_uses_visual_kind() {
        let mut node = Node::filled(Color::WHITE);
        node.index = 3;
        assert_eq!(node.debug_name(), "Rect#3");

        let named = Node::new().with_name("ball");
        assert_eq!(named.debug_name(), "ball");
    }

    #[test]
    fn test_replacing_hook_keeps_latest() {
        let mut node = Node::new();
        node.on_update(|_, _| Ok(()));
        node.on_update(|_, _| Ok(()));

        assert!(node.hooks.update.is_some());
        assert!(node.hooks.start.is_none());
    }
}
