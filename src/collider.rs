use glam::Vec2;

use crate::geometry::{Circle, Intersect, Polygon, Rectangle};
use crate::storage::Slot;
use crate::types::BodyRef;

/// Collider geometry, in body-local space.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
    Polygon(Polygon),
    #[default]
    None,
}

/// Discriminant of [`Shape`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Polygon,
    None,
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::None => ShapeKind::None,
        }
    }

    /// Translated copy.
    pub fn translated(&self, offset: Vec2) -> Shape {
        match self {
            Shape::Circle(c) => Shape::Circle(*c + offset),
            Shape::Rectangle(r) => Shape::Rectangle(*r + offset),
            Shape::Polygon(p) => Shape::Polygon(p + offset),
            Shape::None => Shape::None,
        }
    }

    /// Local-space bounding box. `None` for an empty shape.
    pub fn local_bounds(&self) -> Option<Rectangle> {
        match self {
            Shape::Circle(c) => Some(Rectangle::from_center(c.center(), Vec2::splat(c.radius()))),
            Shape::Rectangle(r) => Some(*r),
            Shape::Polygon(p) => Some(p.bounds()),
            Shape::None => None,
        }
    }

    /// Collider-level overlap. [`Shape::None`] overlaps nothing, and a
    /// circle never overlaps a polygon here even though [`Circle`] and
    /// [`Polygon`] implement the predicate.
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Circle(a), Shape::Circle(b)) => a.intersects(b),
            (Shape::Circle(a), Shape::Rectangle(b)) => a.intersects(b),
            (Shape::Rectangle(a), Shape::Circle(b)) => a.intersects(b),
            (Shape::Rectangle(a), Shape::Rectangle(b)) => a.intersects(b),
            (Shape::Rectangle(a), Shape::Polygon(b)) => a.intersects(b),
            (Shape::Polygon(a), Shape::Rectangle(b)) => a.intersects(b),
            (Shape::Circle(_), Shape::Polygon(_)) | (Shape::Polygon(_), Shape::Circle(_)) => false,
            (Shape::Polygon(a), Shape::Polygon(b)) => a.intersects(b),
            (Shape::None, _) | (_, Shape::None) => false,
        }
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<Rectangle> for Shape {
    fn from(r: Rectangle) -> Self {
        Shape::Rectangle(r)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Shape::Polygon(p)
    }
}

/// A shape attached to a body.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collider {
    pub shape: Shape,
    /// Owning body, by handle.
    pub body: BodyRef,
    /// Detects overlap without physical response.
    pub is_trigger: bool,
    /// Bounciness; blended with the other collider's by mass.
    pub restitution: f32,
    /// World position of the owning body, refreshed every step.
    pub body_position: Vec2,
    attached: bool,
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            shape: Shape::None,
            body: BodyRef::new(0, 0),
            is_trigger: false,
            restitution: 1.0,
            body_position: Vec2::ZERO,
            attached: false,
        }
    }
}

impl Collider {
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// World-space AABB at the cached body position. A [`Shape::None`]
    /// collider yields a zero-size box at the body position.
    pub fn bounds(&self) -> Rectangle {
        match self.shape.local_bounds() {
            Some(local) => local + self.body_position,
            None => Rectangle::new(self.body_position, self.body_position),
        }
    }
}

impl Slot for Collider {
    fn is_occupied(&self) -> bool {
        self.attached
    }

    fn occupy(&mut self) {
        self.attached = true;
    }

    fn vacate(&mut self) {
        self.attached = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collider(shape: impl Into<Shape>, at: Vec2) -> Collider {
        Collider {
            shape: shape.into(),
            body_position: at,
            ..Default::default()
        }
    }

    #[test]
    fn test_circle_bounds() {
        let c = collider(Circle::new(Vec2::new(1.0, 0.0), 2.0), Vec2::new(10.0, 10.0));
        let b = c.bounds();
        assert_eq!(b.min_bound(), Vec2::new(9.0, 8.0));
        assert_eq!(b.max_bound(), Vec2::new(13.0, 12.0));
    }

    #[test]
    fn test_rectangle_bounds() {
        let c = collider(
            Rectangle::new(Vec2::new(-1.0, -2.0), Vec2::new(1.0, 2.0)),
            Vec2::new(5.0, 0.0),
        );
        let b = c.bounds();
        assert_eq!(b.min_bound(), Vec2::new(4.0, -2.0));
        assert_eq!(b.max_bound(), Vec2::new(6.0, 2.0));
    }

    #[test]
    fn test_polygon_bounds() {
        let tri = Polygon::new(vec![
            Vec2::new(-1.0, 0.0),
            Vec2::new(3.0, -2.0),
            Vec2::new(0.0, 5.0),
        ]);
        let b = collider(tri, Vec2::new(1.0, 1.0)).bounds();
        assert_eq!(b.min_bound(), Vec2::new(0.0, -1.0));
        assert_eq!(b.max_bound(), Vec2::new(4.0, 6.0));
    }

    #[test]
    fn test_none_shape() {
        let c = collider(Shape::None, Vec2::new(2.0, 3.0));
        assert_eq!(c.bounds().size(), Vec2::ZERO);
        assert!(!c.shape.intersects(&Shape::Circle(Circle::with_radius(100.0))));
    }

    #[test]
    fn test_circle_polygon_never_overlap_as_shapes() {
        let circle = Circle::with_radius(2.0);
        let tri = Polygon::new(vec![Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(0.0, 1.0)]);
        assert!(circle.intersects(&tri));
        let (c, p): (Shape, Shape) = (circle.into(), tri.into());
        assert!(!c.intersects(&p));
        assert!(!p.intersects(&c));
        assert!(p.intersects(&Shape::Rectangle(Rectangle::from_center(Vec2::ZERO, Vec2::ONE))));
    }

    #[test]
    fn test_shape_kind_and_translation() {
        let s: Shape = Circle::with_radius(1.0).into();
        assert_eq!(s.kind(), ShapeKind::Circle);
        match s.translated(Vec2::new(2.0, 0.0)) {
            Shape::Circle(c) => assert_eq!(c.center(), Vec2::new(2.0, 0.0)),
            other => panic!("unexpected shape {:?}", other),
        }
    }
}
