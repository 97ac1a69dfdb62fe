use std::cell::RefCell;
use std::rc::Rc;

use crate::body::Body;
use crate::collider::Collider;
use crate::error::Result;
use crate::geometry::{Circle, Rectangle};
use crate::narrowphase::Manifold;
use crate::types::*;

/// Public API contract for the simulation world.
pub trait PhysicsWorldApi {
    /// Construct a world and allocate `cfg.initial_capacity` slots.
    fn new(cfg: WorldConfig) -> Result<Self>
    where
        Self: Sized;

    // --- Storage lifecycle -------------------------------------------------

    /// (Re)allocate body and collider storage with `initial_capacity` slots.
    /// Every previously issued handle becomes invalid.
    fn set_up(&mut self, initial_capacity: usize);

    /// Release all storage and forget active trigger overlaps.
    fn tear_down(&mut self);

    // --- Bodies ------------------------------------------------------------

    /// Claim the first free body slot, growing storage if none is free.
    fn create_body(&mut self) -> BodyRef;

    fn body(&self, body: BodyRef) -> Result<&Body>;

    fn body_mut(&mut self, body: BodyRef) -> Result<&mut Body>;

    /// Free the slot. The handle keeps resolving until the slot is reused.
    fn destroy_body(&mut self, body: BodyRef) -> Result<()>;

    // --- Colliders ---------------------------------------------------------

    /// Claim a collider slot attached to `body`.
    fn create_collider(&mut self, body: BodyRef) -> Result<ColliderRef>;

    fn collider(&self, collider: ColliderRef) -> Result<&Collider>;

    fn collider_mut(&mut self, collider: ColliderRef) -> Result<&mut Collider>;

    fn destroy_collider(&mut self, collider: ColliderRef) -> Result<()>;

    // --- Simulation --------------------------------------------------------

    /// Integrate, rebuild the broadphase, resolve contacts and notify.
    fn update(&mut self, dt: f32) -> Result<()>;

    /// Install the listener. Only a weak reference is kept: dropping the
    /// last `Rc` silently disables notifications.
    fn set_contact_listener<L>(&mut self, listener: &Rc<RefCell<L>>)
    where
        L: ContactListener + 'static,
        Self: Sized;

    fn clear_contact_listener(&mut self);

    // --- Queries -----------------------------------------------------------

    /// Narrowphase overlap of two colliders at their bodies' current positions.
    fn overlap(&self, a: ColliderRef, b: ColliderRef) -> Result<bool>;
}

/// Receives contact notifications during `update`. All methods default to
/// doing nothing.
pub trait ContactListener {
    /// Two solid colliders overlapped this step. Fires every overlapping step.
    fn on_collision_enter(&mut self, _a: ColliderRef, _b: ColliderRef) {}

    /// Two solid colliders sharing a leaf did not overlap this step.
    fn on_collision_exit(&mut self, _a: ColliderRef, _b: ColliderRef) {}

    /// A pair involving a trigger started overlapping.
    fn on_trigger_enter(&mut self, _a: ColliderRef, _b: ColliderRef) {}

    /// A pair involving a trigger stopped overlapping.
    fn on_trigger_exit(&mut self, _a: ColliderRef, _b: ColliderRef) {}
}

/// Contact manifold signatures for the shape pairs that support resolution.
pub trait NarrowphaseApi {
    fn circle_circle(a: &Circle, b: &Circle) -> Manifold;
    fn circle_rectangle(circle: &Circle, rect: &Rectangle) -> Manifold;
    fn rectangle_rectangle(a: &Rectangle, b: &Rectangle) -> Manifold;
}
