//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a node in a [`Scene`](crate::scene::Scene).
    ///
    /// Handles are non-owning: a handle to a node that has been swept is
    /// simply no longer found.
    pub struct NodeId;
}

/// Handle-based map keyed by [`NodeId`]
pub type NodeMap<T> = SlotMap<NodeId, T>;
