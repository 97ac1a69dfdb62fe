use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::geometry::{Circle, Rectangle};

/// Contact normal and penetration for an overlapping pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Manifold {
    /// Unit normal pointing from B into A.
    pub normal: Vec2,
    /// Overlap depth along `normal` (negative when not actually overlapping).
    pub penetration: f32,
}

/// Manifold generation for world-space shapes.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn circle_circle(a: &Circle, b: &Circle) -> Manifold {
        let delta = a.center() - b.center();
        let dist = delta.length();
        // Coincident centers: pick "up".
        let normal = if dist > 0.0 { delta / dist } else { Vec2::Y };
        Manifold {
            normal,
            penetration: a.radius() + b.radius() - dist,
        }
    }

    fn circle_rectangle(circle: &Circle, rect: &Rectangle) -> Manifold {
        let center = circle.center();
        let closest = center.clamp(rect.min_bound(), rect.max_bound());
        let delta = center - closest;
        let dist = delta.length();
        let normal = if dist > 0.0 { delta / dist } else { Vec2::Y };
        Manifold {
            normal,
            penetration: circle.radius() - dist,
        }
    }

    fn rectangle_rectangle(a: &Rectangle, b: &Rectangle) -> Manifold {
        let d = a.center() - b.center();
        let overlap = (a.half_size() + b.half_size()) - d.abs();

        // Axis of minimum penetration
        if overlap.x < overlap.y {
            let nx = if d.x > 0.0 { 1.0 } else { -1.0 };
            Manifold {
                normal: Vec2::new(nx, 0.0),
                penetration: overlap.x,
            }
        } else {
            let ny = if d.y > 0.0 { 1.0 } else { -1.0 };
            Manifold {
                normal: Vec2::new(0.0, ny),
                penetration: overlap.y,
            }
        }
    }
}
