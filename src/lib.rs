//! impulse2d: 2D rigid-body kernel (generational handles, quadtree broadphase, impulse contacts)

pub mod types;
pub mod error;
pub mod geometry;
pub mod body;
pub mod collider;
pub mod storage;
pub mod quadtree;
pub mod api;
pub mod narrowphase;
pub mod contact;
pub mod events;
pub mod world;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::world::PhysicsWorld;
pub use crate::error::{PhysicsError, Result};
pub use crate::geometry::{Circle, Intersect, Polygon, Rectangle, intersect};
pub use crate::body::Body;
pub use crate::collider::{Collider, Shape, ShapeKind};
pub use crate::events::{ContactEvent, ContactEventKind, EventCollector};
