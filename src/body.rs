use glam::Vec2;

use crate::storage::Slot;
use crate::types::BodyKind;

/// Point-mass rigid body. No rotation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Must stay above zero for dynamic bodies.
    pub mass: f32,
    pub kind: BodyKind,
    force: Vec2,
    enabled: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 1.0,
            kind: BodyKind::Dynamic,
            force: Vec2::ZERO,
            enabled: false,
        }
    }
}

impl Body {
    /// Accumulate a force for the next step.
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    pub fn force(&self) -> Vec2 {
        self.force
    }

    pub fn reset_force(&mut self) {
        self.force = Vec2::ZERO;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass
    }

    /// Semi-implicit Euler: velocity first, then position with the new
    /// velocity. Clears the force accumulator. Static and disabled bodies
    /// are left untouched.
    pub fn integrate(&mut self, dt: f32) {
        if !self.enabled || self.is_static() {
            return;
        }
        let acceleration = self.force / self.mass;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
        self.reset_force();
    }
}

impl Slot for Body {
    fn is_occupied(&self) -> bool {
        self.enabled
    }

    fn occupy(&mut self) {
        self.enable();
    }

    fn vacate(&mut self) {
        self.disable();
    }
}
