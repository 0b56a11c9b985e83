//! Scene graph
//!
//! Nodes live in a [`Scene`] arena keyed by [`NodeId`]. Each frame the game
//! walks the tree three times: an update pass (lazy start, pointer callbacks,
//! update hooks), zero or more fixed-step passes, and a render pass sorted by
//! z. Nodes marked with [`Scene::destroy`] stay in the tree until the sweep
//! at the end of the frame.

mod behavior;
mod context;
mod graph;
mod node;
mod render;
mod visual;

pub(crate) mod dispatch;

pub(crate) use render::render_scene;

pub use behavior::{Behavior, HookResult};
pub use context::{NodeContext, Screen};
pub use graph::{check_collision_aabb, Scene};
pub use node::{Anchor, Node, StartHook, Tag, TickHook, DEFAULT_NODE_RECT};
pub use render::Canvas;
pub use visual::{ImageVisual, SpriteVisual, TextVisual, Visual, DEFAULT_FRAME_SPEED};

pub use crate::foundation::collections::NodeId;

use thiserror::Error;

use crate::backend::BackendError;

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// No live node has this id
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Reparenting would create a cycle or attach a node to itself
    #[error("Cannot attach {child:?} under {parent:?}")]
    InvalidParent {
        /// Node being moved
        child: NodeId,
        /// Requested parent
        parent: NodeId,
    },

    /// Text was set on a node without a font
    #[error("Text node has no font")]
    MissingFont,

    /// More than one anchor flag on an axis
    #[error("Conflicting anchor flags: {0:?}")]
    ConflictingAnchor(Anchor),

    /// The operation needs a different kind of visual
    #[error("{node} is not {expected}")]
    WrongVisual {
        /// Debug name of the node
        node: String,
        /// Visual kind the operation needs
        expected: &'static str,
    },

    /// The backend failed to rasterize text
    #[error("Text rendering failed: {0}")]
    TextRendering(#[from] BackendError),
}
