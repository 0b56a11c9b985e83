//! # Crank Engine
//!
//! A retained-mode 2D scene-graph engine.
//!
//! ## Features
//!
//! - **Node tree**: nodes with lazy start, per-frame and fixed-step hooks
//! - **Transforms**: anchors and scale composed with the parent
//! - **Collision**: AABB checks, bounding boxes and viewport culling
//! - **Input**: edge-triggered keys and mouse buttons, pointer callbacks
//! - **Game loop**: variable update, fixed-timestep accumulator, capped rendering
//! - **Asset caches**: deduplicated textures, fonts, music and sound effects
//! - **Pluggable backend**: a headless backend ships for tests and tooling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crank_engine::prelude::*;
//!
//! struct Spin;
//!
//! impl Behavior for Spin {
//!     fn update(&mut self, ctx: &mut NodeContext<'_>, delta_time: f64) -> HookResult {
//!         let rect = ctx.rect()?;
//!         ctx.set_position(rect.x + 100.0 * delta_time as f32, rect.y)?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), GameError> {
//!     let mut game = Game::new(HeadlessBackend::new(), GameConfig::default())?;
//!     game.add_child(Node::filled(Color::WHITE).with_behavior(Spin));
//!     game.run()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod backend;
pub mod config;
pub mod foundation;
pub mod input;
pub mod scene;

mod game;

pub use game::{Game, GameError, LoopState};

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetSource, Font, Sound, Texture},
        backend::{Backend, BackendEvent, HeadlessBackend},
        config::{Config, GameConfig},
        foundation::math::{Color, Rect, Vec2},
        input::{InputState, KeyCode, MouseButton},
        scene::{
            check_collision_aabb, Anchor, Behavior, Canvas, HookResult, Node, NodeContext, NodeId,
            Scene, Screen, Tag, TextVisual,
        },
        Game, GameError, LoopState,
    };
}
