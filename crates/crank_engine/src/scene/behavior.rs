//! User logic attached to nodes

use super::context::NodeContext;
use super::render::Canvas;
use crate::game::GameError;

/// Result of a behavior hook; an error stops the game loop
pub type HookResult = Result<(), GameError>;

/// Per-node game logic
///
/// Every method has a no-op default. Hooks receive a [`NodeContext`] that
/// points at the node they are attached to and gives access to the rest of
/// the scene, input, assets and the backend.
///
/// Call order for a node within one update pass: `start` (first pass only),
/// pointer callbacks, `update`. `fixed_update` runs in the fixed pass that
/// follows, once per elapsed tick, and only after `start` has run.
pub trait Behavior {
    /// Called once, before the first update and before any pointer callback
    fn start(&mut self, _ctx: &mut NodeContext<'_>) -> HookResult {
        Ok(())
    }

    /// Called every frame with the seconds since the previous frame
    fn update(&mut self, _ctx: &mut NodeContext<'_>, _delta_time: f64) -> HookResult {
        Ok(())
    }

    /// Called once per fixed tick with the tick length
    fn fixed_update(&mut self, _ctx: &mut NodeContext<'_>, _fixed_delta_time: f64) -> HookResult {
        Ok(())
    }

    /// Cursor entered the node
    fn on_mouse_over(&mut self, _ctx: &mut NodeContext<'_>) -> HookResult {
        Ok(())
    }

    /// Cursor left the node
    fn on_mouse_out(&mut self, _ctx: &mut NodeContext<'_>) -> HookResult {
        Ok(())
    }

    /// Primary button pressed over the node
    fn on_mouse_down(&mut self, _ctx: &mut NodeContext<'_>) -> HookResult {
        Ok(())
    }

    /// Primary button released after a press on the node
    fn on_mouse_up(&mut self, _ctx: &mut NodeContext<'_>) -> HookResult {
        Ok(())
    }

    /// Extra drawing after the node's visual, before its children
    fn render(&mut self, _canvas: &mut Canvas<'_>) {}

    /// Called once when the node is removed from the scene
    fn on_destroy(&mut self) {}
}
