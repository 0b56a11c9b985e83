//! Tree traversals run by the game loop
//!
//! Behaviors and hooks are moved out of their node for the duration of a
//! call so they can borrow the whole scene through the context, then put
//! back. A hook that installs a replacement for itself keeps the
//! replacement.

use super::behavior::{Behavior, HookResult};
use super::context::NodeContext;
use super::node::{Hooks, TickHook};
use super::{NodeId, Scene};
use crate::backend::Backend;
use crate::input::{MouseButton, MouseEvent};

/// Update pass: depth-first, parents before children, enabled subtrees only
pub(crate) fn update_scene(ctx: &mut NodeContext<'_>, delta_time: f64) -> HookResult {
    for id in ctx.scene.roots().to_vec() {
        update_node(ctx, id, delta_time)?;
    }
    Ok(())
}

fn update_node(ctx: &mut NodeContext<'_>, id: NodeId, delta_time: f64) -> HookResult {
    let Some(node) = ctx.scene.get_mut(id) else {
        return Ok(());
    };
    if !node.is_enabled() {
        return Ok(());
    }

    if !node.started {
        node.started = true;
        call_behavior(ctx, id, |behavior, ctx| behavior.start(ctx))?;
        call_start_hook(ctx, id)?;
    }

    dispatch_pointer(ctx, id)?;

    call_behavior(ctx, id, |behavior, ctx| behavior.update(ctx, delta_time))?;
    call_tick_hook(ctx, id, |hooks| &mut hooks.update, delta_time)?;

    if let Some(node) = ctx.scene.get_mut(id) {
        node.advance_visual(delta_time);
    }

    // Children added by the hooks above are visited this pass
    for child in ctx.scene.children(id).to_vec() {
        update_node(ctx, child, delta_time)?;
    }
    Ok(())
}

/// One fixed tick over the tree; nodes that have not started yet are skipped
pub(crate) fn fixed_update_scene(ctx: &mut NodeContext<'_>, fixed_delta_time: f64) -> HookResult {
    for id in ctx.scene.roots().to_vec() {
        fixed_update_node(ctx, id, fixed_delta_time)?;
    }
    Ok(())
}

fn fixed_update_node(ctx: &mut NodeContext<'_>, id: NodeId, fixed_delta_time: f64) -> HookResult {
    let Some(node) = ctx.scene.get(id) else {
        return Ok(());
    };
    if !node.is_enabled() {
        return Ok(());
    }

    if node.started {
        call_behavior(ctx, id, |behavior, ctx| behavior.fixed_update(ctx, fixed_delta_time))?;
        call_tick_hook(ctx, id, |hooks| &mut hooks.fixed_update, fixed_delta_time)?;
    }

    for child in ctx.scene.children(id).to_vec() {
        fixed_update_node(ctx, child, fixed_delta_time)?;
    }
    Ok(())
}

fn dispatch_pointer(ctx: &mut NodeContext<'_>, id: NodeId) -> HookResult {
    let inside = match (ctx.input.mouse_position(), ctx.scene.transformed_rect(id)) {
        (Some(mouse), Some(rect)) => rect.contains_point(mouse),
        _ => false,
    };
    let pressed = ctx.input.is_mouse_pressed(MouseButton::PRIMARY);
    let released = ctx.input.is_mouse_released(MouseButton::PRIMARY);

    let Some(node) = ctx.scene.get_mut(id) else {
        return Ok(());
    };
    for event in node.pointer.dispatch(inside, pressed, released) {
        call_behavior(ctx, id, |behavior, ctx| match event {
            MouseEvent::Down => behavior.on_mouse_down(ctx),
            MouseEvent::Over => behavior.on_mouse_over(ctx),
            MouseEvent::Out => behavior.on_mouse_out(ctx),
            MouseEvent::Up => behavior.on_mouse_up(ctx),
        })?;
    }
    Ok(())
}

fn call_behavior(
    ctx: &mut NodeContext<'_>,
    id: NodeId,
    call: impl FnOnce(&mut dyn Behavior, &mut NodeContext<'_>) -> HookResult,
) -> HookResult {
    let Some(mut behavior) = ctx.scene.get_mut(id).and_then(|node| node.behavior.take()) else {
        return Ok(());
    };

    ctx.node = id;
    let result = call(behavior.as_mut(), ctx);

    if let Some(node) = ctx.scene.get_mut(id) {
        if node.behavior.is_none() {
            node.behavior = Some(behavior);
        }
    }
    result
}

fn call_start_hook(ctx: &mut NodeContext<'_>, id: NodeId) -> HookResult {
    let Some(mut hook) = ctx.scene.get_mut(id).and_then(|node| node.hooks.start.take()) else {
        return Ok(());
    };

    ctx.node = id;
    let result = hook(ctx);

    if let Some(node) = ctx.scene.get_mut(id) {
        if node.hooks.start.is_none() {
            node.hooks.start = Some(hook);
        }
    }
    result
}

fn call_tick_hook(
    ctx: &mut NodeContext<'_>,
    id: NodeId,
    slot: fn(&mut Hooks) -> &mut Option<TickHook>,
    delta_time: f64,
) -> HookResult {
    let Some(mut hook) = ctx.scene.get_mut(id).and_then(|node| slot(&mut node.hooks).take()) else {
        return Ok(());
    };

    ctx.node = id;
    let result = hook(ctx, delta_time);

    if let Some(node) = ctx.scene.get_mut(id) {
        let slot = slot(&mut node.hooks);
        if slot.is_none() {
            *slot = Some(hook);
        }
    }
    result
}

/// Remove every node marked for destroy, children before parents.
/// Returns the number of nodes removed.
pub(crate) fn sweep(scene: &mut Scene, backend: &mut dyn Backend) -> usize {
    let mut removed = 0;
    for id in scene.roots().to_vec() {
        sweep_node(scene, backend, id, &mut removed);
    }
    if removed > 0 {
        log::debug!("Swept {removed} destroyed nodes");
    }
    removed
}

fn sweep_node(scene: &mut Scene, backend: &mut dyn Backend, id: NodeId, removed: &mut usize) {
    let Some(node) = scene.get(id) else {
        return;
    };
    if node.is_marked_for_destroy() {
        remove_subtree(scene, backend, id, removed);
        return;
    }
    for child in scene.children(id).to_vec() {
        sweep_node(scene, backend, child, removed);
    }
}

/// Remove every node regardless of marks, as at teardown
pub(crate) fn clear(scene: &mut Scene, backend: &mut dyn Backend) -> usize {
    let mut removed = 0;
    for id in scene.roots().to_vec() {
        remove_subtree(scene, backend, id, &mut removed);
    }
    removed
}

fn remove_subtree(scene: &mut Scene, backend: &mut dyn Backend, id: NodeId, removed: &mut usize) {
    for child in scene.children(id).to_vec() {
        remove_subtree(scene, backend, child, removed);
    }

    if let Some(mut node) = scene.remove(id) {
        log::trace!("Removing {}", node.debug_name());
        if let Some(behavior) = node.behavior.as_mut() {
            behavior.on_destroy();
        }
        node.visual.release(backend);
        *removed += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::assets::AssetCaches;
    use crate::backend::{HeadlessBackend, RendererHandle};
    use crate::config::GameConfig;
    use crate::input::InputState;
    use crate::scene::{Node, Screen};

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Recorder {
        fn push(&self, event: &str) {
            self.log.borrow_mut().push(format!("{}:{event}", self.name));
        }
    }

    impl Behavior for Recorder {
        fn start(&mut self, _ctx: &mut NodeContext<'_>) -> HookResult {
            self.push("start");
            Ok(())
        }

        fn update(&mut self, _ctx: &mut NodeContext<'_>, _delta_time: f64) -> HookResult {
            self.push("update");
            Ok(())
        }

        fn fixed_update(&mut self, _ctx: &mut NodeContext<'_>, _fixed_delta_time: f64) -> HookResult {
            self.push("fixed");
            Ok(())
        }

        fn on_mouse_over(&mut self, _ctx: &mut NodeContext<'_>) -> HookResult {
            self.push("over");
            Ok(())
        }

        fn on_destroy(&mut self) {
            self.push("destroy");
        }
    }

    struct Harness {
        scene: Scene,
        input: InputState,
        screen: Screen,
        assets: AssetCaches,
        backend: HeadlessBackend,
    }

    impl Harness {
        fn new() -> Self {
            let config = GameConfig::default();
            Self {
                scene: Scene::new(),
                input: InputState::new(),
                screen: Screen::new(800, 600),
                assets: AssetCaches::new(&config.assets, &config.audio),
                backend: HeadlessBackend::new(),
            }
        }

        fn recorder(&self, name: &'static str, log: &Log) -> Node {
            Node::new().with_behavior(Recorder {
                name,
                log: Rc::clone(log),
            })
        }

        fn update(&mut self, delta_time: f64) -> HookResult {
            let mut ctx = NodeContext::new(
                &mut self.scene,
                &self.input,
                &mut self.screen,
                &mut self.assets,
                &mut self.backend,
                RendererHandle(1),
            );
            update_scene(&mut ctx, delta_time)
        }

        fn fixed_update(&mut self, fixed_delta_time: f64) -> HookResult {
            let mut ctx = NodeContext::new(
                &mut self.scene,
                &self.input,
                &mut self.screen,
                &mut self.assets,
                &mut self.backend,
                RendererHandle(1),
            );
            fixed_update_scene(&mut ctx, fixed_delta_time)
        }
    }

    #[test]
    fn test_start_runs_once_before_update() {
        let log = Log::default();
        let mut harness = Harness::new();
        let node = harness.recorder("a", &log);
        harness.scene.add_root(node);

        harness.update(0.1).unwrap();
        harness.update(0.1).unwrap();

        assert_eq!(*log.borrow(), vec!["a:start", "a:update", "a:update"]);
    }

    #[test]
    fn test_start_precedes_pointer_callbacks() {
        let log = Log::default();
        let mut harness = Harness::new();
        let node = harness.recorder("a", &log);
        harness.scene.add_root(node);
        harness.input.handle_mouse_move(10.0, 10.0);

        harness.update(0.1).unwrap();

        assert_eq!(*log.borrow(), vec!["a:start", "a:over", "a:update"]);
    }

    #[test]
    fn test_node_at_origin_is_not_hovered_before_cursor_moves() {
        let log = Log::default();
        let mut harness = Harness::new();
        let node = harness.recorder("a", &log);
        harness.scene.add_root(node);

        harness.update(0.1).unwrap();
        assert_eq!(*log.borrow(), vec!["a:start", "a:update"]);

        harness.input.handle_mouse_move(0.0, 0.0);
        harness.update(0.1).unwrap();
        assert_eq!(*log.borrow(), vec!["a:start", "a:update", "a:over", "a:update"]);
    }

    #[test]
    fn test_disabled_subtree_is_skipped() {
        let log = Log::default();
        let mut harness = Harness::new();
        let parent = harness.recorder("parent", &log).with_enabled(false);
        let parent = harness.scene.add_root(parent);
        let child = harness.recorder("child", &log);
        harness.scene.add_child(parent, child).unwrap();

        harness.update(0.1).unwrap();
        harness.fixed_update(0.02).unwrap();

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_fixed_update_skips_unstarted_nodes() {
        let log = Log::default();
        let mut harness = Harness::new();
        let node = harness.recorder("a", &log);
        harness.scene.add_root(node);

        harness.fixed_update(0.02).unwrap();
        assert!(log.borrow().is_empty());

        harness.update(0.1).unwrap();
        harness.fixed_update(0.02).unwrap();
        assert_eq!(*log.borrow(), vec!["a:start", "a:update", "a:fixed"]);
    }

    #[test]
    fn test_child_added_during_update_starts_same_pass() {
        let log = Log::default();
        let mut harness = Harness::new();
        let child = harness.recorder("child", &log);
        let mut spawner = Node::new();
        let mut pending = Some(child);
        spawner.on_update(move |ctx, _| {
            if let Some(child) = pending.take() {
                ctx.add_child(child)?;
            }
            Ok(())
        });
        harness.scene.add_root(spawner);

        harness.update(0.1).unwrap();

        assert_eq!(*log.borrow(), vec!["child:start", "child:update"]);
    }

    #[test]
    fn test_sweep_removes_children_before_parent() {
        let log = Log::default();
        let mut harness = Harness::new();
        let root = harness.recorder("root", &log);
        let root = harness.scene.add_root(root);
        let child = harness.recorder("child", &log);
        let child = harness.scene.add_child(root, child).unwrap();
        let grandchild = harness.recorder("grandchild", &log);
        harness.scene.add_child(child, grandchild).unwrap();
        let sibling = harness.recorder("sibling", &log);
        let sibling = harness.scene.add_child(root, sibling).unwrap();

        harness.scene.destroy(child).unwrap();
        assert_eq!(harness.scene.len(), 4);

        let removed = sweep(&mut harness.scene, &mut harness.backend);

        assert_eq!(removed, 2);
        assert_eq!(*log.borrow(), vec!["grandchild:destroy", "child:destroy"]);
        assert_eq!(harness.scene.children(root), &[sibling]);
        assert!(!harness.scene.contains(child));
    }

    #[test]
    fn test_sweep_removes_unmarked_descendants_of_marked_node() {
        let mut harness = Harness::new();
        let root = harness.scene.add_root(Node::new());
        let late = harness.scene.add_root(Node::new());

        harness.scene.destroy(root).unwrap();
        // Added after the mark, so not marked itself
        let orphan = harness.scene.add_child(root, Node::new()).unwrap();

        sweep(&mut harness.scene, &mut harness.backend);

        assert!(!harness.scene.contains(orphan));
        assert_eq!(harness.scene.roots(), &[late]);
    }

    #[test]
    fn test_hook_error_stops_pass() {
        let log = Log::default();
        let mut harness = Harness::new();
        let mut failing = Node::new();
        failing.on_update(|ctx, _| {
            ctx.set_text("no font here")?;
            Ok(())
        });
        harness.scene.add_root(failing);
        let after = harness.recorder("after", &log);
        harness.scene.add_root(after);

        assert!(harness.update(0.1).is_err());
        assert!(log.borrow().is_empty());
    }
}
