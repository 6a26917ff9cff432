//! Geometric primitives for plot layout and hit-testing.
//!
//! All coordinates are `f64`. Client space has its origin at the top-left
//! corner with y growing downwards.

use std::fmt;

/// A 2D point (or vector) with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Origin point (0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Calculate the distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Swap x and y.
    #[must_use]
    pub const fn flip(self) -> Self {
        Self::new(self.y, self.x)
    }

    /// Component-wise addition.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise subtraction.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Scale both components.
    #[must_use]
    pub fn mul(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k)
    }

    /// 2D cross product (z component).
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
}

impl Segment {
    /// Create a new segment.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Create a segment from coordinates.
    #[must_use]
    pub const fn from_coords(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    /// Length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Swap x and y of both ends.
    #[must_use]
    pub const fn flip(self) -> Self {
        Self::new(self.start.flip(), self.end.flip())
    }

    /// Intersection point with another segment.
    ///
    /// Parallel and collinear segments never intersect, even when they overlap.
    #[must_use]
    pub fn intersection(&self, other: &Segment) -> Option<Point> {
        let r = self.end.sub(self.start);
        let s = other.end.sub(other.start);
        let denom = r.cross(s);
        if denom == 0.0 {
            return None;
        }
        let qp = other.start.sub(self.start);
        let t = qp.cross(s) / denom;
        let u = qp.cross(r) / denom;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(self.start.add(r.mul(t)))
        } else {
            None
        }
    }

    /// Squared distance from `p` to the closest point of this segment.
    ///
    /// Projections falling before the start or past the end use the distance
    /// to that endpoint. Zero-length segments degrade to a point distance.
    #[must_use]
    pub fn distance_squared_to(&self, p: Point) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let to_start = p.distance_squared(self.start);

        let scalar = dx * (p.x - self.start.x) + dy * (p.y - self.start.y);
        if scalar <= 0.0 {
            return to_start;
        }
        let len_sq = dx * dx + dy * dy;
        let base_sq = scalar * scalar / len_sq;
        if base_sq >= len_sq {
            return p.distance_squared(self.end);
        }
        (to_start - base_sq).max(0.0)
    }
}

/// A rectangle defined by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f64,
    /// Y coordinate of the top-left corner.
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle at `origin` with `size`.
    #[must_use]
    pub const fn from_origin_size(origin: Point, size: Point) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    /// Smallest rectangle containing both corner points.
    #[must_use]
    pub fn span_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Bounding box of a set of points, `None` when empty.
    #[must_use]
    pub fn bounding_box(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Some(Self::span_points(min, max))
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height as a vector.
    #[must_use]
    pub const fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    /// Left edge.
    #[must_use]
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Horizontal extent.
    #[must_use]
    pub fn x_range(&self) -> Span {
        Span::new(self.left(), self.right())
    }

    /// Vertical extent.
    #[must_use]
    pub fn y_range(&self) -> Span {
        Span::new(self.top(), self.bottom())
    }

    /// Check if a point is inside the rectangle (edges included).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Swap x and y of origin and size.
    #[must_use]
    pub const fn flip(self) -> Self {
        Self::new(self.y, self.x, self.height, self.width)
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom.
    #[must_use]
    pub fn inflate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x - dx, self.y - dy, self.width + 2.0 * dx, self.height + 2.0 * dy)
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Self {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }

    /// Same size, moved by `offset`.
    #[must_use]
    pub fn translate(self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }
}

/// A closed numeric interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    lower: f64,
    upper: f64,
}

impl Span {
    /// Create a span; the bounds are ordered.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { lower: a, upper: b }
        } else {
            Self { lower: b, upper: a }
        }
    }

    /// Span of a single value.
    #[must_use]
    pub fn singleton(v: f64) -> Self {
        Self { lower: v, upper: v }
    }

    /// Smallest span containing every finite value, `None` if there are none.
    pub fn encloses<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Span>, v| {
                Some(acc.map_or(Span::singleton(v), |s| s.include(v)))
            })
    }

    /// Lower bound.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// `upper - lower`.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.upper - self.lower
    }

    /// Midpoint.
    #[must_use]
    pub fn center(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// Zero length.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.length() == 0.0
    }

    /// Whether `v` lies within the bounds.
    #[must_use]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower && v <= self.upper
    }

    /// Extend to include `v`.
    #[must_use]
    pub fn include(self, v: f64) -> Self {
        Self {
            lower: self.lower.min(v),
            upper: self.upper.max(v),
        }
    }

    /// Smallest span containing both.
    #[must_use]
    pub fn union(self, other: Span) -> Self {
        Self {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    /// Grow both ends by `amount`.
    #[must_use]
    pub fn expanded(self, amount: f64) -> Self {
        Self::new(self.lower - amount, self.upper + amount)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?}]", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_relative_eq!(p1.distance(p2), 5.0);
        assert_relative_eq!(p1.distance_squared(p2), 25.0);
    }

    #[test]
    fn test_intersection_at_origin() {
        let a = Segment::from_coords(0.0, 1.0, 0.0, -1.0);
        let b = Segment::from_coords(1.0, 0.0, -1.0, 0.0);
        assert_eq!(a.intersection(&b), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        let a = Segment::from_coords(0.0, 1.0, 0.0, -1.0);
        let b = Segment::from_coords(1.0, 1.0, 1.0, -1.0);
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn test_collinear_disjoint_segments_do_not_intersect() {
        let a = Segment::from_coords(0.0, 0.0, 1.0, 0.0);
        let b = Segment::from_coords(2.0, 0.0, 3.0, 0.0);
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn test_perpendicular_segments_not_touching() {
        let a = Segment::from_coords(10.0, 0.0, 9.0, 0.0);
        let b = Segment::from_coords(0.0, 10.0, 0.0, 9.0);
        assert_eq!(a.intersection(&b), None);

        let c = Segment::from_coords(100.0, 100.0, 140.0, 100.0);
        let d = Segment::from_coords(120.0, 120.0, 120.0, 320.0);
        assert_eq!(c.intersection(&d), None);
    }

    #[test]
    fn test_segment_distance_inside_projection() {
        let s = Segment::from_coords(0.0, 0.0, 10.0, 0.0);
        assert_relative_eq!(s.distance_squared_to(Point::new(5.0, 3.0)), 9.0);
    }

    #[test]
    fn test_segment_distance_beyond_endpoints() {
        let s = Segment::from_coords(0.0, 0.0, 10.0, 0.0);
        // Perpendicular distance to the infinite line would be 1.
        assert_relative_eq!(s.distance_squared_to(Point::new(13.0, 1.0)), 10.0);
        assert_relative_eq!(s.distance_squared_to(Point::new(-2.0, 1.0)), 5.0);
    }

    #[test]
    fn test_zero_length_segment_distance() {
        let s = Segment::from_coords(1.0, 1.0, 1.0, 1.0);
        assert_relative_eq!(s.distance_squared_to(Point::new(4.0, 5.0)), 25.0);
    }

    #[test]
    fn test_rect_flip_and_contains() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.flip(), Rect::new(2.0, 1.0, 4.0, 3.0));
        assert!(r.contains(Point::new(4.0, 6.0)));
        assert!(!r.contains(Point::new(4.1, 6.0)));
    }

    #[test]
    fn test_rect_union_inflate() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(2.0, -1.0, 1.0, 1.0);
        assert_eq!(a.union(&b), Rect::new(0.0, -1.0, 3.0, 2.0));
        assert_eq!(a.inflate(1.0, 2.0), Rect::new(-1.0, -2.0, 3.0, 5.0));
    }

    #[test]
    fn test_bounding_box() {
        let pts = [Point::new(1.0, 5.0), Point::new(-1.0, 2.0), Point::new(3.0, 3.0)];
        assert_eq!(Rect::bounding_box(&pts), Some(Rect::new(-1.0, 2.0, 4.0, 3.0)));
        assert_eq!(Rect::bounding_box(&[]), None);
    }

    #[test]
    fn test_span_ordering_and_union() {
        let s = Span::new(5.0, 1.0);
        assert_eq!(s.lower(), 1.0);
        assert_eq!(s.upper(), 5.0);
        assert_eq!(s.union(Span::new(-1.0, 2.0)), Span::new(-1.0, 5.0));
        assert_eq!(Span::encloses([3.0, f64::NAN, -2.0, 7.0]), Some(Span::new(-2.0, 7.0)));
        assert_eq!(Span::encloses([f64::NAN]), None);
        assert_eq!(s.to_string(), "[1.0, 5.0]");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn segment_distance_never_below_endpoint_when_outside(
                x0 in -100.0f64..100.0, y0 in -100.0f64..100.0,
                x1 in -100.0f64..100.0, y1 in -100.0f64..100.0,
                px in -200.0f64..200.0, py in -200.0f64..200.0,
            ) {
                let s = Segment::from_coords(x0, y0, x1, y1);
                let p = Point::new(px, py);
                let d = s.distance_squared_to(p);
                let nearest_end = p.distance_squared(s.start).min(p.distance_squared(s.end));
                prop_assert!(d >= 0.0);
                prop_assert!(d <= nearest_end + 1e-6 * (1.0 + nearest_end));
            }

            #[test]
            fn span_encloses_all_inputs(values in proptest::collection::vec(-1e6f64..1e6, 1..50)) {
                let span = Span::encloses(values.iter().copied()).expect("non-empty");
                for v in values {
                    prop_assert!(span.contains(v));
                }
            }
        }
    }
}
