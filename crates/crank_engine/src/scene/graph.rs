//! Scene arena and tree queries

use super::{Node, NodeId, SceneError, Tag};
use crate::foundation::collections::NodeMap;
use crate::foundation::math::Rect;

/// Overlap test between two rects. Edges are exclusive and empty rects never
/// collide.
pub fn check_collision_aabb(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

/// Arena owning every node of a game
///
/// Parents hold their children's ids in insertion order; children point back
/// at their parent by id. Top-level nodes are kept in a separate root list.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: NodeMap<Node>,
    roots: Vec<NodeId>,
    next_index: u64,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level node
    pub fn add_root(&mut self, node: Node) -> NodeId {
        let id = self.insert(node, None);
        self.roots.push(id);
        id
    }

    /// Add a node under `parent`. It starts on the next update pass.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let id = self.insert(node, Some(parent));
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.push(id);
        }
        Ok(id)
    }

    fn insert(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        node.index = self.next_index;
        node.parent = parent;
        node.children.clear();
        self.next_index += 1;

        let id = self.nodes.insert(node);
        log::trace!("Added {}", self.nodes[id].debug_name());
        id
    }

    /// Move an existing node under `parent`, or to the top level with
    /// `None`. The node is appended after its new siblings.
    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        if !self.nodes.contains_key(id) {
            return Err(SceneError::NodeNotFound(id));
        }
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(SceneError::NodeNotFound(parent));
            }
            if parent == id || self.is_ancestor(id, parent) {
                return Err(SceneError::InvalidParent { child: id, parent });
            }
        }

        self.unlink(id);
        match parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = parent;
        }
        Ok(())
    }

    /// Whether `ancestor` is a proper ancestor of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    fn unlink(&mut self, id: NodeId) {
        match self.parent(id) {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
    }

    /// Unlink and drop a node. Its children are left orphaned in the arena,
    /// so callers remove them first.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        self.unlink(id);
        self.nodes.remove(id)
    }

    /// Node by id
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable node by id
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Node by id, or `NodeNotFound`
    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Mutable node by id, or `NodeNotFound`
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Whether `id` is a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, including ones marked for destroy
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level nodes in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `id` in insertion order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Parent of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Top-level nodes sorted by z, ties in insertion order
    pub fn sorted_roots(&self) -> Vec<NodeId> {
        self.sorted_by_z(&self.roots)
    }

    /// Children of `id` sorted by z, ties in insertion order
    pub fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        self.sorted_by_z(self.children(id))
    }

    fn sorted_by_z(&self, ids: &[NodeId]) -> Vec<NodeId> {
        let mut sorted = ids.to_vec();
        // Stable sort keeps insertion order among equal z
        sorted.sort_by_key(|id| self.nodes.get(*id).map_or(0, Node::z));
        sorted
    }

    /// Mark `id` and its whole subtree for removal at the end of the frame
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(id) {
            return Err(SceneError::NodeNotFound(id));
        }

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(current) {
                node.marked_for_destroy = true;
                pending.extend_from_slice(&node.children);
            }
        }
        Ok(())
    }

    /// Screen-space rect of a node.
    ///
    /// The local rect is scaled by the node's scale, shifted by its anchor,
    /// then offset by the parent's local position and scaled by the parent's
    /// scale. Only the immediate parent contributes: grandparent offsets are
    /// not accumulated. Recomputed on every call.
    pub fn transformed_rect(&self, id: NodeId) -> Option<Rect> {
        let node = self.nodes.get(id)?;

        let mut rect = node.rect();
        rect.w *= node.scale();
        rect.h *= node.scale();

        let offset = node.anchor().offset(rect.w, rect.h);
        rect.x += offset.x;
        rect.y += offset.y;

        if let Some(parent) = node.parent.and_then(|parent| self.nodes.get(parent)) {
            let parent_rect = parent.rect();
            rect.x += parent_rect.x;
            rect.y += parent_rect.y;
            rect.w *= parent.scale();
            rect.h *= parent.scale();
        }

        Some(rect)
    }

    /// Union of the node's transformed rect with the bounding boxes of its
    /// enabled children that are themselves visible in `viewport`
    pub fn bounding_box(&self, id: NodeId, viewport: Rect) -> Option<Rect> {
        let node = self.nodes.get(id)?;
        let mut bounds = self.transformed_rect(id)?;

        for &child in &node.children {
            if !self.nodes.get(child).is_some_and(Node::is_enabled) {
                continue;
            }
            if let Some(child_bounds) = self.bounding_box(child, viewport) {
                if child_bounds.intersects(&viewport) {
                    bounds = bounds.union(&child_bounds);
                }
            }
        }

        Some(bounds)
    }

    /// Whether any part of the node or its visible subtree lies in `viewport`
    pub fn can_render(&self, id: NodeId, viewport: Rect) -> bool {
        self.bounding_box(id, viewport)
            .is_some_and(|bounds| bounds.intersects(&viewport))
    }

    /// Overlap test between the local rects of two nodes
    pub fn check_collision(&self, a: NodeId, b: NodeId) -> bool {
        match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(a), Some(b)) => check_collision_aabb(&a.rect(), &b.rect()),
            _ => false,
        }
    }

    /// Children of `parent` (top-level nodes for `None`) carrying `tag`,
    /// depth-first when `nested`
    pub fn children_tagged(&self, parent: Option<NodeId>, tag: Tag, nested: bool) -> Vec<NodeId> {
        let mut found = Vec::new();
        let start = match parent {
            Some(parent) => self.children(parent),
            None => self.roots.as_slice(),
        };
        self.collect_tagged(start, tag, nested, &mut found);
        found
    }

    fn collect_tagged(&self, ids: &[NodeId], tag: Tag, nested: bool, found: &mut Vec<NodeId>) {
        for &id in ids {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if node.has_tag(tag) {
                found.push(id);
            }
            if nested {
                self.collect_tagged(&node.children, tag, nested, found);
            }
        }
    }

    /// First node found by [`children_tagged`](Self::children_tagged)
    pub fn first_tagged(&self, parent: Option<NodeId>, tag: Tag, nested: bool) -> Option<NodeId> {
        self.children_tagged(parent, tag, nested).into_iter().next()
    }

    /// Every node in the scene carrying `tag`
    pub fn find_tagged(&self, tag: Tag) -> Vec<NodeId> {
        self.children_tagged(None, tag, true)
    }

    /// Nodes carrying `tag` whose local rect overlaps that of `id`
    pub fn colliding_tagged(&self, id: NodeId, tag: Tag) -> Vec<NodeId> {
        self.find_tagged(tag)
            .into_iter()
            .filter(|other| *other != id && self.check_collision(id, *other))
            .collect()
    }
}
