// ABOUTME: Binary tree structure for terminal pane layout, stored in an arena.
// ABOUTME: Supports splitting, closing, weights, canonical ordering, and geometry.

use std::collections::HashMap;
use std::fmt;

/// Opaque pane identifier. Unique for the lifetime of a container, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(pub u64);

impl PaneId {
    /// Name a pane gets when it is first displayed
    pub fn default_name(&self) -> String {
        format!("Pane {}", self.0)
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane-{}", self.0)
    }
}

/// Orientation of the line that divides a split node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Children stacked top/bottom (new pane below)
    Horizontal,
    /// Children side by side (new pane to the right)
    Vertical,
}

/// Index of a node inside a [`PaneTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIdx(usize);

pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf(PaneId),
    Split { axis: Axis, children: [NodeIdx; 2] },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeIdx>,
    weight: f64,
}

impl Node {
    fn leaf(id: PaneId, parent: Option<NodeIdx>) -> Self {
        Self {
            kind: NodeKind::Leaf(id),
            parent,
            weight: DEFAULT_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("{0} is not in the layout")]
    UnknownPane(PaneId),

    #[error("{0} is already in the layout")]
    DuplicatePane(PaneId),

    #[error("the last pane cannot be closed")]
    LastPane,

    #[error("{0} has no sibling to resize against")]
    NoSibling(PaneId),

    #[error("resize would take a pane below the minimum weight")]
    ResizeLimit,

    #[error("parent and child links disagree")]
    BrokenLink,
}

/// Split layout of one tab. Nodes live in an arena and refer to their
/// parent by index, so the whole tree is a plain value that can be cloned.
#[derive(Debug, Clone)]
pub struct PaneTree {
    nodes: Vec<Node>,
    free: Vec<NodeIdx>,
    root: NodeIdx,
}

/// Rectangle in normalized coordinates (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn full() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

impl PaneTree {
    /// A tree holding a single leaf
    pub fn new(root: PaneId) -> Self {
        Self {
            nodes: vec![Node::leaf(root, None)],
            free: Vec::new(),
            root: NodeIdx(0),
        }
    }

    pub fn root(&self) -> NodeIdx {
        self.root
    }

    fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.0]
    }

    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node {
        &mut self.nodes[idx.0]
    }

    fn alloc(&mut self, node: Node) -> NodeIdx {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx.0] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                NodeIdx(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, idx: NodeIdx) {
        debug_assert!(!self.free.contains(&idx), "node released twice");
        self.free.push(idx);
    }

    pub fn is_leaf(&self, idx: NodeIdx) -> bool {
        matches!(self.node(idx).kind, NodeKind::Leaf(_))
    }

    /// Pane held by a leaf, `None` for split nodes
    pub fn identifier(&self, idx: NodeIdx) -> Option<PaneId> {
        match self.node(idx).kind {
            NodeKind::Leaf(id) => Some(id),
            NodeKind::Split { .. } => None,
        }
    }

    pub fn axis(&self, idx: NodeIdx) -> Option<Axis> {
        match self.node(idx).kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Split { axis, .. } => Some(axis),
        }
    }

    pub fn children(&self, idx: NodeIdx) -> Option<[NodeIdx; 2]> {
        match self.node(idx).kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Split { children, .. } => Some(children),
        }
    }

    pub fn parent(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.node(idx).parent
    }

    /// The other child of this node's parent
    pub fn sibling(&self, idx: NodeIdx) -> Option<NodeIdx> {
        let [first, second] = self.children(self.parent(idx)?)?;
        if first == idx {
            Some(second)
        } else {
            debug_assert_eq!(second, idx, "parent does not list its child");
            Some(first)
        }
    }

    pub fn weight(&self, idx: NodeIdx) -> f64 {
        self.node(idx).weight
    }

    pub fn set_weight(&mut self, idx: NodeIdx, weight: f64) {
        debug_assert!(weight > 0.0, "weights must stay positive");
        self.node_mut(idx).weight = weight;
    }

    /// Depth-first search for the leaf holding `id`
    pub fn find_leaf(&self, id: PaneId) -> Option<NodeIdx> {
        self.find_leaf_from(self.root, id)
    }

    fn find_leaf_from(&self, idx: NodeIdx, id: PaneId) -> Option<NodeIdx> {
        match self.node(idx).kind {
            NodeKind::Leaf(leaf) if leaf == id => Some(idx),
            NodeKind::Leaf(_) => None,
            NodeKind::Split {
                children: [first, second],
                ..
            } => self
                .find_leaf_from(first, id)
                .or_else(|| self.find_leaf_from(second, id)),
        }
    }

    pub fn contains(&self, id: PaneId) -> bool {
        self.find_leaf(id).is_some()
    }

    /// Leaf identifiers in canonical (left-to-right) order
    pub fn all_identifiers(&self) -> Vec<PaneId> {
        let mut result = Vec::new();
        self.collect_panes(self.root, &mut result);
        result
    }

    fn collect_panes(&self, idx: NodeIdx, out: &mut Vec<PaneId>) {
        match self.node(idx).kind {
            NodeKind::Leaf(id) => out.push(id),
            NodeKind::Split {
                children: [first, second],
                ..
            } => {
                self.collect_panes(first, out);
                self.collect_panes(second, out);
            }
        }
    }

    pub fn first_identifier(&self) -> PaneId {
        let mut idx = self.root;
        loop {
            match self.node(idx).kind {
                NodeKind::Leaf(id) => return id,
                NodeKind::Split {
                    children: [first, _],
                    ..
                } => idx = first,
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.all_identifiers().len()
    }

    /// 0 for a single leaf, otherwise 1 + the deepest child
    pub fn depth(&self) -> usize {
        self.depth_of(self.root)
    }

    fn depth_of(&self, idx: NodeIdx) -> usize {
        match self.node(idx).kind {
            NodeKind::Leaf(_) => 0,
            NodeKind::Split {
                children: [first, second],
                ..
            } => 1 + self.depth_of(first).max(self.depth_of(second)),
        }
    }

    /// Turn the leaf holding `target` into a split on `axis`. The first child
    /// keeps `target`, the second holds `new_id`. Returns the new leaf's node.
    pub fn split_leaf(
        &mut self,
        target: PaneId,
        axis: Axis,
        new_id: PaneId,
    ) -> Result<NodeIdx, LayoutError> {
        let idx = self
            .find_leaf(target)
            .ok_or(LayoutError::UnknownPane(target))?;
        if self.contains(new_id) {
            return Err(LayoutError::DuplicatePane(new_id));
        }

        let first = self.alloc(Node::leaf(target, Some(idx)));
        let second = self.alloc(Node::leaf(new_id, Some(idx)));
        self.node_mut(idx).kind = NodeKind::Split {
            axis,
            children: [first, second],
        };
        Ok(second)
    }

    /// Remove the leaf holding `target`. Its sibling subtree takes the
    /// parent's place (and the parent's weight).
    pub fn remove_leaf(&mut self, target: PaneId) -> Result<(), LayoutError> {
        let idx = self
            .find_leaf(target)
            .ok_or(LayoutError::UnknownPane(target))?;
        let parent = self.parent(idx).ok_or(LayoutError::LastPane)?;
        let sibling = self.sibling(idx).ok_or(LayoutError::NoSibling(target))?;

        let grandparent = self.parent(parent);
        let slot = match grandparent {
            Some(gp) => {
                let children = self.children(gp);
                debug_assert!(children.is_some(), "parent link points at a leaf");
                let position =
                    children.and_then(|pair| pair.iter().position(|&child| child == parent));
                debug_assert!(position.is_some(), "grandparent does not list its child");
                Some((gp, position.ok_or(LayoutError::BrokenLink)?))
            }
            None => None,
        };

        let parent_weight = self.weight(parent);
        let promoted = self.node_mut(sibling);
        promoted.parent = grandparent;
        promoted.weight = parent_weight;

        match slot {
            Some((gp, position)) => {
                if let NodeKind::Split { children, .. } = &mut self.node_mut(gp).kind {
                    children[position] = sibling;
                }
            }
            None => self.root = sibling,
        }

        self.release(idx);
        self.release(parent);
        Ok(())
    }

    /// Get all panes with their layout rectangles
    pub fn pane_rects(&self) -> HashMap<PaneId, Rect> {
        let mut result = HashMap::new();
        self.collect_rects(self.root, Rect::full(), &mut result);
        result
    }

    /// Pane under a normalized point
    pub fn hit_test(&self, x: f32, y: f32) -> Option<PaneId> {
        self.pane_rects()
            .into_iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(id, _)| id)
    }

    fn collect_rects(&self, idx: NodeIdx, rect: Rect, out: &mut HashMap<PaneId, Rect>) {
        match self.node(idx).kind {
            NodeKind::Leaf(id) => {
                out.insert(id, rect);
            }
            NodeKind::Split {
                axis,
                children: [first, second],
            } => {
                let total = self.weight(first) + self.weight(second);
                let ratio = (self.weight(first) / total) as f32;
                let (first_rect, second_rect) = match axis {
                    Axis::Horizontal => (
                        Rect {
                            height: rect.height * ratio,
                            ..rect
                        },
                        Rect {
                            y: rect.y + rect.height * ratio,
                            height: rect.height * (1.0 - ratio),
                            ..rect
                        },
                    ),
                    Axis::Vertical => (
                        Rect {
                            width: rect.width * ratio,
                            ..rect
                        },
                        Rect {
                            x: rect.x + rect.width * ratio,
                            width: rect.width * (1.0 - ratio),
                            ..rect
                        },
                    ),
                };
                self.collect_rects(first, first_rect, out);
                self.collect_rects(second, second_rect, out);
            }
        }
    }

    fn subtree_eq(&self, idx: NodeIdx, other: &PaneTree, other_idx: NodeIdx) -> bool {
        let (a, b) = (self.node(idx), other.node(other_idx));
        if a.weight != b.weight {
            return false;
        }
        match (&a.kind, &b.kind) {
            (NodeKind::Leaf(x), NodeKind::Leaf(y)) => x == y,
            (
                NodeKind::Split {
                    axis: ax,
                    children: [a0, a1],
                },
                NodeKind::Split {
                    axis: bx,
                    children: [b0, b1],
                },
            ) => ax == bx && self.subtree_eq(*a0, other, *b0) && self.subtree_eq(*a1, other, *b1),
            _ => false,
        }
    }
}

/// Structural equality: same shape, axes, identifiers and weights,
/// regardless of how nodes are laid out in the arena.
impl PartialEq for PaneTree {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}
