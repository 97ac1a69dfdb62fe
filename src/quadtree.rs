//! Adaptive quadtree broadphase.
//!
//! Every node the tree can ever need is allocated up front in one flat
//! array (`Σ 4^i` for `i in 0..=max_depth`). Children are addressed by index
//! into that array, and the array is never resized after construction, so
//! child indices stay valid for the whole step. `set_up_root` resets the
//! nodes in place instead of reallocating them.

use crate::error::{PhysicsError, Result};
use crate::geometry::{Intersect, Rectangle};
use crate::types::{ColliderRef, QuadTreeConfig};

/// Index of the root node.
pub const ROOT: usize = 0;

/// Deepest tree this crate will preallocate (87 381 nodes).
pub const MAX_SUPPORTED_DEPTH: usize = 8;

/// World-space AABB of a collider, as stored in a leaf.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuadEntry {
    pub aabb: Rectangle,
    pub collider: ColliderRef,
}

#[derive(Clone, Debug)]
pub struct QuadNode {
    pub bounds: Rectangle,
    pub depth: usize,
    children: Option<[usize; 4]>,
    entries: Vec<QuadEntry>,
}

impl QuadNode {
    fn empty() -> Self {
        Self {
            bounds: Rectangle::inverted(),
            depth: 0,
            children: None,
            entries: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Child indices, `None` for a leaf.
    pub fn children(&self) -> Option<[usize; 4]> {
        self.children
    }

    /// Entries buffered in this node. Always empty for internal nodes.
    pub fn entries(&self) -> &[QuadEntry] {
        &self.entries
    }
}

#[derive(Clone, Debug, Default)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
    next_free: usize,
    max_depth: usize,
    max_per_leaf: usize,
}

impl QuadTree {
    /// Nodes needed for a complete tree of the given depth.
    pub fn node_capacity(max_depth: usize) -> usize {
        (0..=max_depth).map(|i| 4usize.pow(i as u32)).sum()
    }

    pub fn new(cfg: &QuadTreeConfig) -> Result<Self> {
        if cfg.max_per_leaf == 0 {
            return Err(PhysicsError::InvalidConfig("quadtree max_per_leaf must be at least 1".into()));
        }
        if cfg.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(PhysicsError::InvalidConfig(format!(
                "quadtree max_depth {} exceeds {}",
                cfg.max_depth, MAX_SUPPORTED_DEPTH
            )));
        }
        let nodes = vec![QuadNode::empty(); Self::node_capacity(cfg.max_depth)];
        Ok(Self {
            nodes,
            next_free: 1,
            max_depth: cfg.max_depth,
            max_per_leaf: cfg.max_per_leaf,
        })
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_per_leaf(&self) -> usize {
        self.max_per_leaf
    }

    /// Clear every node and give the root its bounds for this step.
    pub fn set_up_root(&mut self, bounds: Rectangle) {
        for node in &mut self.nodes {
            node.entries.clear();
            node.children = None;
            node.depth = 0;
        }
        if let Some(root) = self.nodes.get_mut(ROOT) {
            root.bounds = bounds;
        }
        self.next_free = 1;
    }

    pub fn node(&self, index: usize) -> &QuadNode {
        &self.nodes[index]
    }

    pub fn root_bounds(&self) -> Option<Rectangle> {
        self.nodes.get(ROOT).map(|n| n.bounds)
    }

    /// Nodes claimed since the last `set_up_root`, root included.
    pub fn nodes_in_use(&self) -> usize {
        self.next_free
    }

    /// Insert below `node`. An entry crossing a split line lands in every
    /// child it touches.
    pub fn insert(&mut self, node: usize, entry: QuadEntry) {
        if let Some(children) = self.nodes[node].children {
            for child in children {
                if entry.aabb.intersects(&self.nodes[child].bounds) {
                    self.insert(child, entry);
                }
            }
            return;
        }

        let leaf = &self.nodes[node];
        if leaf.entries.len() >= self.max_per_leaf && leaf.depth < self.max_depth {
            let children = self.subdivide(node);
            let mut buffered = std::mem::take(&mut self.nodes[node].entries);
            buffered.push(entry);
            for child in children {
                for e in &buffered {
                    if e.aabb.intersects(&self.nodes[child].bounds) {
                        self.insert(child, *e);
                    }
                }
            }
            // Hand the emptied buffer back so its allocation is reused.
            buffered.clear();
            self.nodes[node].entries = buffered;
        } else {
            self.nodes[node].entries.push(entry);
        }
    }

    fn subdivide(&mut self, node: usize) -> [usize; 4] {
        let first = self.next_free;
        debug_assert!(first + 4 <= self.nodes.len(), "quadtree arena exhausted");
        self.next_free += 4;

        let parent = &self.nodes[node];
        let (min, max) = (parent.bounds.min_bound(), parent.bounds.max_bound());
        let depth = parent.depth + 1;
        let half = (max - min) / 2.0;
        let mid = min + half;

        let quadrants = [
            Rectangle::new(min, mid),
            Rectangle::new(glam::Vec2::new(min.x, mid.y), glam::Vec2::new(mid.x, max.y)),
            Rectangle::new(glam::Vec2::new(mid.x, min.y), glam::Vec2::new(max.x, mid.y)),
            Rectangle::new(mid, max),
        ];
        let children = [first, first + 1, first + 2, first + 3];
        for (child, bounds) in children.into_iter().zip(quadrants) {
            let n = &mut self.nodes[child];
            n.bounds = bounds;
            n.depth = depth;
            n.children = None;
            n.entries.clear();
        }
        self.nodes[node].children = Some(children);
        children
    }

    /// Depth-first visit of every leaf reachable from the root.
    pub fn for_each_leaf(&self, mut f: impl FnMut(&QuadNode)) {
        if !self.nodes.is_empty() {
            self.visit_leaves(ROOT, &mut f);
        }
    }

    fn visit_leaves(&self, index: usize, f: &mut impl FnMut(&QuadNode)) {
        let node = &self.nodes[index];
        match node.children {
            Some(children) => {
                for child in children {
                    self.visit_leaves(child, f);
                }
            }
            None => f(node),
        }
    }

    /// Bounds of every leaf, for debug drawing.
    pub fn leaf_bounds(&self) -> Vec<Rectangle> {
        let mut out = Vec::new();
        self.for_each_leaf(|leaf| out.push(leaf.bounds));
        out
    }
}
