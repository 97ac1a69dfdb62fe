//! Impulse-based contact response.
//!
//! Only dynamic bodies are ever moved. When one side is static, the dynamic
//! side takes the full velocity correction, as if the static body had
//! infinite mass, regardless of the mass stored on it.

use glam::Vec2;
use log::debug;

use crate::api::NarrowphaseApi;
use crate::body::Body;
use crate::collider::{Collider, Shape};
use crate::narrowphase::{Manifold, Narrowphase};

/// One side of a contact.
pub struct ContactBody<'a> {
    pub body: &'a mut Body,
    pub collider: &'a Collider,
}

/// A pair already known to overlap.
pub struct Contact<'a> {
    bodies: [ContactBody<'a>; 2],
    normal: Vec2,
    penetration: f32,
    restitution: f32,
}

impl<'a> Contact<'a> {
    pub fn new(a: ContactBody<'a>, b: ContactBody<'a>) -> Self {
        Self {
            bodies: [a, b],
            normal: Vec2::ZERO,
            penetration: 0.0,
            restitution: 0.0,
        }
    }

    /// Normal from the second body into the first, after `resolve`. The
    /// operands may have been swapped to put a circle first.
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    pub fn penetration(&self) -> f32 {
        self.penetration
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Apply velocity and positional correction.
    ///
    /// Returns `false` without touching either body when the shape pair has
    /// no manifold (anything involving a polygon or an empty shape).
    pub fn resolve(&mut self) -> bool {
        let Some(manifold) = self.manifold() else {
            debug!(
                "no contact resolution for {:?}/{:?}",
                self.bodies[0].collider.shape.kind(),
                self.bodies[1].collider.shape.kind()
            );
            return false;
        };
        self.normal = manifold.normal;
        self.penetration = manifold.penetration;
        self.restitution = self.blended_restitution();

        self.resolve_velocity();
        self.resolve_interpenetration();
        true
    }

    fn manifold(&mut self) -> Option<Manifold> {
        let (ca, cb) = (self.bodies[0].collider, self.bodies[1].collider);
        let (pa, pb) = (self.bodies[0].body.position, self.bodies[1].body.position);
        match (&ca.shape, &cb.shape) {
            (Shape::Circle(a), Shape::Circle(b)) => Some(Narrowphase::circle_circle(&(*a + pa), &(*b + pb))),
            (Shape::Circle(c), Shape::Rectangle(r)) => {
                Some(Narrowphase::circle_rectangle(&(*c + pa), &(*r + pb)))
            }
            (Shape::Rectangle(_), Shape::Circle(_)) => {
                self.bodies.swap(0, 1);
                self.manifold()
            }
            (Shape::Rectangle(a), Shape::Rectangle(b)) => {
                Some(Narrowphase::rectangle_rectangle(&(*a + pa), &(*b + pb)))
            }
            (Shape::Polygon(_), _) | (_, Shape::Polygon(_)) => None,
            (Shape::None, _) | (_, Shape::None) => None,
        }
    }

    /// Mass-weighted average of both colliders' restitution.
    fn blended_restitution(&self) -> f32 {
        let (m1, m2) = (self.bodies[0].body.mass, self.bodies[1].body.mass);
        let (r1, r2) = (self.bodies[0].collider.restitution, self.bodies[1].collider.restitution);
        let total = m1 + m2;
        if total > 0.0 && total.is_finite() {
            (m1 * r1 + m2 * r2) / total
        } else {
            (r1 + r2) * 0.5
        }
    }

    fn separating_velocity(&self) -> f32 {
        (self.bodies[0].body.velocity - self.bodies[1].body.velocity).dot(self.normal)
    }

    /// `None` when the pair cannot be corrected: no dynamic side, or a total
    /// inverse mass that is zero, negative or not finite.
    fn inverse_masses(&self) -> Option<(f32, f32, f32)> {
        let [a, b] = &self.bodies;
        if !a.body.is_dynamic() && !b.body.is_dynamic() {
            return None;
        }
        let (im1, im2) = (a.body.inverse_mass(), b.body.inverse_mass());
        let total = im1 + im2;
        if total <= 0.0 || !total.is_finite() {
            return None;
        }
        Some((im1, im2, total))
    }

    fn resolve_velocity(&mut self) {
        let separating = self.separating_velocity();
        if separating >= 0.0 {
            return;
        }
        let Some((im1, im2, total)) = self.inverse_masses() else {
            return;
        };

        let new_separating = -separating * self.restitution;
        let delta_velocity = new_separating - separating;
        let impulse = self.normal * (delta_velocity / total);

        let [a, b] = &mut self.bodies;
        let (a_dynamic, b_dynamic) = (a.body.is_dynamic(), b.body.is_dynamic());
        if a_dynamic {
            a.body.velocity += impulse * im1;
            if !b_dynamic {
                a.body.velocity += impulse * im2;
            }
        }
        if b_dynamic {
            b.body.velocity -= impulse * im2;
            if !a_dynamic {
                b.body.velocity -= impulse * im1;
            }
        }
    }

    fn resolve_interpenetration(&mut self) {
        if self.penetration <= 0.0 {
            return;
        }
        let Some((im1, im2, total)) = self.inverse_masses() else {
            return;
        };

        let move_per_inverse_mass = self.normal * (self.penetration / total);
        let [a, b] = &mut self.bodies;
        if a.body.is_dynamic() {
            a.body.position += move_per_inverse_mass * im1;
        }
        if b.body.is_dynamic() {
            b.body.position -= move_per_inverse_mass * im2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Polygon, Rectangle};
    use crate::types::BodyKind;
    use approx::assert_relative_eq;

    fn body(position: Vec2, velocity: Vec2, kind: BodyKind) -> Body {
        let mut b = Body::default();
        b.enable();
        b.position = position;
        b.velocity = velocity;
        b.kind = kind;
        b
    }

    fn collider(shape: impl Into<Shape>, restitution: f32) -> Collider {
        let mut c = Collider::default();
        c.shape = shape.into();
        c.restitution = restitution;
        c
    }

    #[test]
    fn test_equal_mass_elastic_exchange() {
        let mut a = body(Vec2::new(-0.9, 0.0), Vec2::new(2.0, 0.0), BodyKind::Dynamic);
        let mut b = body(Vec2::new(0.9, 0.0), Vec2::new(-2.0, 0.0), BodyKind::Dynamic);
        let ca = collider(Circle::with_radius(1.0), 1.0);
        let cb = collider(Circle::with_radius(1.0), 1.0);

        let mut contact = Contact::new(
            ContactBody { body: &mut a, collider: &ca },
            ContactBody { body: &mut b, collider: &cb },
        );
        assert!(contact.resolve());
        assert_relative_eq!(contact.restitution(), 1.0);
        drop(contact);

        assert_relative_eq!(a.velocity.x, -2.0, epsilon = 1e-5);
        assert_relative_eq!(b.velocity.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(a.velocity.y, 0.0, epsilon = 1e-5);
        // Penetration 0.2 split evenly.
        assert_relative_eq!(a.position.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(b.position.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_separating_bodies_keep_velocity() {
        let mut a = body(Vec2::new(-0.9, 0.0), Vec2::new(-1.0, 0.0), BodyKind::Dynamic);
        let mut b = body(Vec2::new(0.9, 0.0), Vec2::new(1.0, 0.0), BodyKind::Dynamic);
        let ca = collider(Circle::with_radius(1.0), 1.0);
        let cb = collider(Circle::with_radius(1.0), 1.0);
        Contact::new(
            ContactBody { body: &mut a, collider: &ca },
            ContactBody { body: &mut b, collider: &cb },
        )
        .resolve();
        assert_eq!(a.velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_static_body_never_moves() {
        let mut ball = body(Vec2::new(0.0, 1.5), Vec2::new(0.0, -3.0), BodyKind::Dynamic);
        ball.mass = 1000.0;
        let mut ground = body(Vec2::ZERO, Vec2::ZERO, BodyKind::Static);
        ground.mass = 0.001;
        let cball = collider(Circle::with_radius(1.0), 1.0);
        let cground = collider(Rectangle::new(Vec2::new(-5.0, -1.0), Vec2::new(5.0, 1.0)), 1.0);

        // Rectangle first: operands get swapped internally.
        let mut contact = Contact::new(
            ContactBody { body: &mut ground, collider: &cground },
            ContactBody { body: &mut ball, collider: &cball },
        );
        assert!(contact.resolve());
        drop(contact);

        assert_eq!(ground.position, Vec2::ZERO);
        assert_eq!(ground.velocity, Vec2::ZERO);
        // Full reflection with restitution 1.
        assert_relative_eq!(ball.velocity.y, 3.0, epsilon = 1e-3);
        // Only the ball's inverse-mass share of the 0.5 penetration.
        let share: f32 = 0.5 * (1.0 / 1000.0) / (1.0 / 1000.0 + 1.0 / 0.001);
        assert_relative_eq!(ball.position.y, 1.5 + share, epsilon = 1e-6);
    }

    #[test]
    fn test_static_partner_keeps_its_positional_share() {
        let mut dynamic = body(Vec2::new(1.8, 0.0), Vec2::ZERO, BodyKind::Dynamic);
        let mut wall = body(Vec2::ZERO, Vec2::ZERO, BodyKind::Static);
        let cd = collider(Rectangle::from_center(Vec2::ZERO, Vec2::ONE), 1.0);
        let cw = collider(Rectangle::from_center(Vec2::ZERO, Vec2::ONE), 1.0);
        let mut contact = Contact::new(
            ContactBody { body: &mut dynamic, collider: &cd },
            ContactBody { body: &mut wall, collider: &cw },
        );
        assert!(contact.resolve());
        assert_relative_eq!(contact.penetration(), 0.2, epsilon = 1e-5);
        drop(contact);

        // Equal masses: half of the 0.2 overlap, the wall keeps its half.
        assert_relative_eq!(dynamic.position.x, 1.9, epsilon = 1e-5);
        assert_eq!(wall.position, Vec2::ZERO);
    }

    #[test]
    fn test_penetration_split_by_inverse_mass() {
        let mut light = body(Vec2::ZERO, Vec2::ZERO, BodyKind::Dynamic);
        let mut heavy = body(Vec2::new(1.6, 0.0), Vec2::ZERO, BodyKind::Dynamic);
        heavy.mass = 3.0;
        let cl = collider(Circle::with_radius(1.0), 1.0);
        let ch = collider(Circle::with_radius(1.0), 1.0);
        Contact::new(
            ContactBody { body: &mut light, collider: &cl },
            ContactBody { body: &mut heavy, collider: &ch },
        )
        .resolve();

        // Penetration 0.4, inverse masses 1 and 1/3: a 3:1 split.
        assert_relative_eq!(light.position.x, -0.3, epsilon = 1e-5);
        assert_relative_eq!(heavy.position.x, 1.7, epsilon = 1e-5);
        assert_eq!(light.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_zero_restitution_against_static_stops() {
        let mut ball = body(Vec2::new(0.0, 1.9), Vec2::new(0.0, -3.0), BodyKind::Dynamic);
        let mut ground = body(Vec2::ZERO, Vec2::ZERO, BodyKind::Static);
        let cball = collider(Circle::with_radius(1.0), 0.0);
        let cground = collider(Rectangle::new(Vec2::new(-5.0, -1.0), Vec2::new(5.0, 1.0)), 0.0);
        Contact::new(
            ContactBody { body: &mut ball, collider: &cball },
            ContactBody { body: &mut ground, collider: &cground },
        )
        .resolve();
        assert_relative_eq!(ball.velocity.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_two_static_bodies_untouched() {
        let mut a = body(Vec2::ZERO, Vec2::new(1.0, 0.0), BodyKind::Static);
        let mut b = body(Vec2::new(0.5, 0.0), Vec2::new(-1.0, 0.0), BodyKind::Static);
        let ca = collider(Rectangle::from_center(Vec2::ZERO, Vec2::ONE), 1.0);
        let cb = collider(Rectangle::from_center(Vec2::ZERO, Vec2::ONE), 1.0);
        Contact::new(
            ContactBody { body: &mut a, collider: &ca },
            ContactBody { body: &mut b, collider: &cb },
        )
        .resolve();
        assert_eq!(a.position, Vec2::ZERO);
        assert_eq!(b.position, Vec2::new(0.5, 0.0));
        assert_eq!(a.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_zero_mass_is_skipped() {
        let mut a = body(Vec2::ZERO, Vec2::new(1.0, 0.0), BodyKind::Dynamic);
        a.mass = 0.0;
        let mut b = body(Vec2::new(1.5, 0.0), Vec2::ZERO, BodyKind::Dynamic);
        let ca = collider(Circle::with_radius(1.0), 1.0);
        let cb = collider(Circle::with_radius(1.0), 1.0);
        Contact::new(
            ContactBody { body: &mut a, collider: &ca },
            ContactBody { body: &mut b, collider: &cb },
        )
        .resolve();
        assert!(a.velocity.is_finite() && b.velocity.is_finite());
        assert!(a.position.is_finite() && b.position.is_finite());
    }

    #[test]
    fn test_polygon_fails_closed() {
        let mut a = body(Vec2::ZERO, Vec2::new(1.0, 0.0), BodyKind::Dynamic);
        let mut b = body(Vec2::new(0.5, 0.0), Vec2::new(-1.0, 0.0), BodyKind::Dynamic);
        let tri = Polygon::new(vec![Vec2::ZERO, Vec2::X, Vec2::Y]);
        let ca = collider(tri, 1.0);
        let cb = collider(Circle::with_radius(1.0), 1.0);
        let resolved = Contact::new(
            ContactBody { body: &mut a, collider: &ca },
            ContactBody { body: &mut b, collider: &cb },
        )
        .resolve();
        assert!(!resolved);
        assert_eq!(a.velocity, Vec2::new(1.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(a.position, Vec2::ZERO);
    }

    #[test]
    fn test_restitution_is_mass_weighted() {
        let mut a = body(Vec2::ZERO, Vec2::ZERO, BodyKind::Dynamic);
        a.mass = 3.0;
        let mut b = body(Vec2::new(1.0, 0.0), Vec2::ZERO, BodyKind::Dynamic);
        let ca = collider(Circle::with_radius(1.0), 1.0);
        let cb = collider(Circle::with_radius(1.0), 0.0);
        let mut contact = Contact::new(
            ContactBody { body: &mut a, collider: &ca },
            ContactBody { body: &mut b, collider: &cb },
        );
        contact.resolve();
        assert_relative_eq!(contact.restitution(), 0.75);
    }
}
