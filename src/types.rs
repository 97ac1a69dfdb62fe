use std::hash::{Hash, Hasher};

/// Generational handle to a body slot.
///
/// Only the world hands these out. A handle stays valid until its slot is
/// destroyed and then claimed again by a later `create_body`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyRef {
    index: usize,
    generation: u32,
}

/// Generational handle to a collider slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColliderRef {
    index: usize,
    generation: u32,
}

macro_rules! impl_handle {
    ($name:ident) => {
        impl $name {
            pub(crate) const fn new(index: usize, generation: u32) -> Self {
                Self { index, generation }
            }

            /// Slot index inside the world's storage.
            pub const fn index(self) -> usize {
                self.index
            }

            /// Generation of the slot at the time the handle was issued.
            pub const fn generation(self) -> u32 {
                self.generation
            }
        }

        impl crate::storage::SlotHandle for $name {
            fn from_parts(index: usize, generation: u32) -> Self {
                Self::new(index, generation)
            }

            fn index(self) -> usize {
                self.index
            }

            fn generation(self) -> u32 {
                self.generation
            }
        }
    };
}

impl_handle!(BodyRef);
impl_handle!(ColliderRef);

/// Simulation behaviour of a body.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyKind {
    /// Never integrated, never pushed by contacts.
    Static,
    /// Integrated every step and moved by contact resolution.
    #[default]
    Dynamic,
}

/// Unordered pair of colliders. `(a, b)` and `(b, a)` compare and hash equal.
#[derive(Copy, Clone, Debug)]
pub struct ColliderRefPair {
    pub a: ColliderRef,
    pub b: ColliderRef,
}

impl ColliderRefPair {
    pub fn new(a: ColliderRef, b: ColliderRef) -> Self {
        Self { a, b }
    }

    fn ordered(&self) -> (ColliderRef, ColliderRef) {
        if self.a <= self.b { (self.a, self.b) } else { (self.b, self.a) }
    }
}

impl PartialEq for ColliderRefPair {
    fn eq(&self, other: &Self) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

impl Eq for ColliderRefPair {}

impl Hash for ColliderRefPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

/// Broadphase tuning.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadTreeConfig {
    /// Deepest level a node may be subdivided to (root is depth 0).
    pub max_depth: usize,
    /// Entries a leaf buffers before it splits.
    pub max_per_leaf: usize,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_per_leaf: 8,
        }
    }
}

/// World-level configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    /// Body and collider slots allocated by `set_up`.
    pub initial_capacity: usize,
    pub quadtree: QuadTreeConfig,
    /// Enable internal timing instrumentation (adds small overhead when true).
    pub enable_timing: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            quadtree: QuadTreeConfig::default(),
            enable_timing: false,
        }
    }
}

/// Debug statistics for the last completed step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub bodies: usize,
    pub colliders: usize,
    pub leaves: usize,
    /// Sum of per-leaf pair counts (n*(n-1)/2), counts duplicates across leaves.
    pub candidate_pairs: usize,
}

/// Timing breakdown for the last `update`.
#[derive(Copy, Clone, Debug, Default)]
pub struct WorldTiming {
    pub update_ms: f64,
    pub integrate_ms: f64,
    pub rebuild_index_ms: f64,
    pub collision_pass_ms: f64,
}
