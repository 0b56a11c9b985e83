//! Render pass

use super::{NodeId, Scene};
use crate::assets::Texture;
use crate::backend::{Backend, RendererHandle, TextureDraw};
use crate::foundation::math::{Color, Rect};

/// Drawing surface handed to [`Behavior::render`](super::Behavior::render)
pub struct Canvas<'a> {
    backend: &'a mut dyn Backend,
    renderer: RendererHandle,
    rect: Rect,
}

impl<'a> Canvas<'a> {
    /// Screen-space rect of the node being drawn
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Draw a filled rectangle
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.backend.fill_rect(self.renderer, rect, color);
    }

    /// Draw a textured rectangle
    pub fn draw_texture(&mut self, texture: &Texture, draw: &TextureDraw) {
        self.backend.draw_texture(self.renderer, texture.handle(), draw);
    }
}

/// Draw every enabled, visible node: top-level nodes and each child list in
/// ascending z
pub(crate) fn render_scene(
    scene: &mut Scene,
    backend: &mut dyn Backend,
    renderer: RendererHandle,
    viewport: Rect,
) {
    for id in scene.sorted_roots() {
        render_node(scene, backend, renderer, viewport, id);
    }
}

fn render_node(
    scene: &mut Scene,
    backend: &mut dyn Backend,
    renderer: RendererHandle,
    viewport: Rect,
    id: NodeId,
) {
    let Some(node) = scene.get(id) else {
        return;
    };
    if !node.is_enabled() || !scene.can_render(id, viewport) {
        return;
    }
    let Some(rect) = scene.transformed_rect(id) else {
        return;
    };

    node.visual.draw(backend, renderer, rect);

    if let Some(mut behavior) = scene.get_mut(id).and_then(|node| node.behavior.take()) {
        let mut canvas = Canvas {
            backend: &mut *backend,
            renderer,
            rect,
        };
        behavior.render(&mut canvas);

        if let Some(node) = scene.get_mut(id) {
            if node.behavior.is_none() {
                node.behavior = Some(behavior);
            }
        }
    }

    for child in scene.sorted_children(id) {
        render_node(scene, backend, renderer, viewport, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DrawCall, HeadlessBackend};
    use crate::scene::{Behavior, Node};

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);
    const RED: Color = Color::rgb(255, 0, 0);
    const GREEN: Color = Color::rgb(0, 255, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn fills(backend: &HeadlessBackend) -> Vec<Color> {
        backend
            .draw_calls()
            .iter()
            .filter_map(|call| match call {
                DrawCall::FillRect { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_higher_z_draws_later() {
        let mut scene = Scene::new();
        scene.add_root(Node::filled(RED).with_z(2));
        scene.add_root(Node::filled(GREEN).with_z(1));
        scene.add_root(Node::filled(BLUE).with_z(2));

        let mut backend = HeadlessBackend::new();
        render_scene(&mut scene, &mut backend, RendererHandle(1), VIEWPORT);

        assert_eq!(fills(&backend), vec![GREEN, RED, BLUE]);
    }

    #[test]
    fn test_parent_draws_before_children() {
        let mut scene = Scene::new();
        let parent = scene.add_root(Node::filled(RED));
        scene.add_child(parent, Node::filled(BLUE).with_z(-1)).unwrap();
        scene.add_root(Node::filled(GREEN).with_z(1));

        let mut backend = HeadlessBackend::new();
        render_scene(&mut scene, &mut backend, RendererHandle(1), VIEWPORT);

        assert_eq!(fills(&backend), vec![RED, BLUE, GREEN]);
    }

    #[test]
    fn test_disabled_and_culled_nodes_are_skipped() {
        let mut scene = Scene::new();
        let disabled = scene.add_root(Node::filled(RED).with_enabled(false));
        scene.add_child(disabled, Node::filled(BLUE)).unwrap();
        scene.add_root(Node::filled(GREEN).with_position(1000.0, 0.0));
        scene.add_root(Node::filled(GREEN).with_dimension(0.0, 10.0));

        let mut backend = HeadlessBackend::new();
        render_scene(&mut scene, &mut backend, RendererHandle(1), VIEWPORT);

        assert!(fills(&backend).is_empty());
    }

    #[test]
    fn test_behavior_render_draws_after_visual() {
        struct Outline;

        impl Behavior for Outline {
            fn render(&mut self, canvas: &mut Canvas<'_>) {
                let rect = canvas.rect();
                canvas.fill_rect(Rect::new(rect.x, rect.y, rect.w, 1.0), BLUE);
            }
        }

        let mut scene = Scene::new();
        let id = scene.add_root(Node::filled(RED).with_behavior(Outline));

        let mut backend = HeadlessBackend::new();
        render_scene(&mut scene, &mut backend, RendererHandle(1), VIEWPORT);

        assert_eq!(fills(&backend), vec![RED, BLUE]);
        assert!(scene.get(id).unwrap().has_behavior());
    }
}
