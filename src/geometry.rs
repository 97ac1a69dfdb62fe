//! Shape value types and pairwise intersection predicates.
//!
//! Shapes are plain values in their own local space. Adding a `Vec2` yields a
//! translated copy, which is how collider-local geometry is moved into world
//! space. All predicates treat touching boundaries as intersecting.

use std::ops::Add;

use glam::Vec2;

/// Circle with a non-negative radius.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    center: Vec2,
    radius: f32,
}

impl Circle {
    /// A negative `radius` is stored as its absolute value.
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// Circle centered on the local origin.
    pub fn with_radius(radius: f32) -> Self {
        Self::new(Vec2::ZERO, radius)
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.abs();
    }

    pub fn contains(&self, point: Vec2) -> bool {
        (self.center - point).length_squared() <= self.radius * self.radius
    }
}

impl Add<Vec2> for Circle {
    type Output = Circle;

    fn add(self, offset: Vec2) -> Circle {
        Circle::new(self.center + offset, self.radius)
    }
}

/// Axis-aligned rectangle given by its min and max corners.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rectangle {
    min: Vec2,
    max: Vec2,
}

impl Rectangle {
    pub fn new(min_bound: Vec2, max_bound: Vec2) -> Self {
        Self {
            min: min_bound,
            max: max_bound,
        }
    }

    pub fn from_center(center: Vec2, half_size: Vec2) -> Self {
        Self::new(center - half_size, center + half_size)
    }

    /// Inverted box (min = +MAX, max = -MAX). Acts as the identity for `union`.
    pub fn inverted() -> Self {
        Self::new(Vec2::splat(f32::MAX), Vec2::splat(f32::MIN))
    }

    pub fn min_bound(&self) -> Vec2 {
        self.min
    }

    pub fn max_bound(&self) -> Vec2 {
        self.max
    }

    pub fn set_min_bound(&mut self, min_bound: Vec2) {
        self.min = min_bound;
    }

    pub fn set_max_bound(&mut self, max_bound: Vec2) {
        self.max = max_bound;
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn half_size(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// True when min exceeds max on either axis.
    pub fn is_inverted(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Smallest rectangle enclosing both.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Corners in winding order: min, (min.x, max.y), max, (max.x, min.y).
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.min.x, self.max.y),
            self.max,
            Vec2::new(self.max.x, self.min.y),
        ]
    }

    /// Equivalent 4-vertex polygon.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.corners().to_vec())
    }
}

impl Add<Vec2> for Rectangle {
    type Output = Rectangle;

    fn add(self, offset: Vec2) -> Rectangle {
        Rectangle::new(self.min + offset, self.max + offset)
    }
}

/// Ordered vertex list. Fewer than 3 vertices is a legal value but not a
/// usable convex shape.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn set_vertices(&mut self, vertices: Vec<Vec2>) {
        self.vertices = vertices;
    }

    /// At least a triangle.
    pub fn is_convex_candidate(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// Vertex average; the origin for an empty polygon.
    pub fn center(&self) -> Vec2 {
        if self.vertices.is_empty() {
            return Vec2::ZERO;
        }
        self.vertices.iter().copied().sum::<Vec2>() / self.vertices.len() as f32
    }

    /// Min/max scan over the vertices. Inverted when empty.
    pub fn bounds(&self) -> Rectangle {
        self.vertices
            .iter()
            .fold(Rectangle::inverted(), |acc, &v| Rectangle::new(acc.min.min(v), acc.max.max(v)))
    }

    pub fn size(&self) -> Vec2 {
        if self.vertices.is_empty() {
            return Vec2::ZERO;
        }
        self.bounds().size()
    }

    /// Iterates `(vertices[i], vertices[i - 1])`, wrapping the first edge to
    /// the last vertex.
    fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| {
            let j = if i == 0 { n - 1 } else { i - 1 };
            (self.vertices[i], self.vertices[j])
        })
    }

    fn project(&self, axis: Vec2) -> (f32, f32) {
        self.vertices.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            let p = v.dot(axis);
            (lo.min(p), hi.max(p))
        })
    }
}

impl Add<Vec2> for &Polygon {
    type Output = Polygon;

    fn add(self, offset: Vec2) -> Polygon {
        Polygon::new(self.vertices.iter().map(|&v| v + offset).collect())
    }
}

impl Add<Vec2> for Polygon {
    type Output = Polygon;

    fn add(mut self, offset: Vec2) -> Polygon {
        for v in &mut self.vertices {
            *v += offset;
        }
        self
    }
}

/// Closest point to `p` on segment `a..b`, clamping the projection
/// parameter to `[0, 1]`. A zero-length segment yields `a`.
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = (p - a).dot(ab) / len_sq;
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        a + ab * t
    }
}

/// Boolean overlap test between two shapes.
pub trait Intersect<Rhs = Self> {
    fn intersects(&self, other: &Rhs) -> bool;
}

/// Free-function form of [`Intersect::intersects`].
pub fn intersect<A, B>(a: &A, b: &B) -> bool
where
    A: Intersect<B>,
{
    a.intersects(b)
}

impl Intersect for Circle {
    fn intersects(&self, other: &Circle) -> bool {
        let rsum = self.radius + other.radius;
        (self.center - other.center).length_squared() <= rsum * rsum
    }
}

impl Intersect for Rectangle {
    fn intersects(&self, other: &Rectangle) -> bool {
        if self.max.x < other.min.x || self.min.x > other.max.x {
            return false;
        }
        if self.max.y < other.min.y || self.min.y > other.max.y {
            return false;
        }
        true
    }
}

impl Intersect<Circle> for Rectangle {
    fn intersects(&self, circle: &Circle) -> bool {
        let center = circle.center;
        if self.contains(center) {
            return true;
        }

        // Bounds grown by the radius along one axis at a time: catches edge
        // contact without computing a closest point.
        let r = circle.radius;
        let widened = Rectangle::new(self.min - Vec2::new(r, 0.0), self.max + Vec2::new(r, 0.0));
        let heightened = Rectangle::new(self.min - Vec2::new(0.0, r), self.max + Vec2::new(0.0, r));
        if widened.contains(center) || heightened.contains(center) {
            return true;
        }

        self.corners().iter().any(|&corner| circle.contains(corner))
    }
}

impl Intersect<Rectangle> for Circle {
    fn intersects(&self, rectangle: &Rectangle) -> bool {
        rectangle.intersects(self)
    }
}

impl Intersect for Polygon {
    /// Separating-axis test over the edge normals of both polygons.
    fn intersects(&self, other: &Polygon) -> bool {
        if self.vertices.is_empty() || other.vertices.is_empty() {
            return false;
        }
        let separated_on = |axis: Vec2| {
            let (min_a, max_a) = self.project(axis);
            let (min_b, max_b) = other.project(axis);
            max_a < min_b || max_b < min_a
        };
        let mut axes = self.edges().chain(other.edges()).map(|(p, q)| {
            let edge = p - q;
            Vec2::new(-edge.y, edge.x)
        });
        !axes.any(separated_on)
    }
}

impl Intersect<Circle> for Polygon {
    fn intersects(&self, circle: &Circle) -> bool {
        if self.vertices.iter().any(|&v| circle.contains(v)) {
            return true;
        }
        let r_sq = circle.radius * circle.radius;
        self.edges().any(|(p, q)| {
            let closest = closest_point_on_segment(p, q, circle.center);
            (circle.center - closest).length_squared() <= r_sq
        })
    }
}

impl Intersect<Polygon> for Circle {
    fn intersects(&self, polygon: &Polygon) -> bool {
        polygon.intersects(self)
    }
}

impl Intersect<Rectangle> for Polygon {
    fn intersects(&self, rectangle: &Rectangle) -> bool {
        self.intersects(&rectangle.to_polygon())
    }
}

impl Intersect<Polygon> for Rectangle {
    fn intersects(&self, polygon: &Polygon) -> bool {
        polygon.intersects(self)
    }
}
