//! Hit-testing: from a pointer position back to data observations.

use super::target::{GeomTarget, HitShape};
use crate::geometry::{Point, Rect, Segment};
use std::fmt::Debug;

/// Converts client measures into world (map) units.
pub trait RenderHelper: Debug {
    /// World position of a client point.
    fn pos_to_world(&self, p: Point) -> Point;

    /// World length of a client distance.
    fn dim_to_world(&self, d: f64) -> f64;
}

/// World = client / zoom + origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRenderHelper {
    origin: Point,
    zoom: f64,
}

impl ZoomRenderHelper {
    /// Helper for a view at `origin` magnified by `zoom`.
    #[must_use]
    pub fn new(origin: Point, zoom: f64) -> Self {
        Self { origin, zoom: if zoom > 0.0 { zoom } else { 1.0 } }
    }
}

impl Default for ZoomRenderHelper {
    fn default() -> Self {
        Self::new(Point::ORIGIN, 1.0)
    }
}

impl RenderHelper for ZoomRenderHelper {
    fn pos_to_world(&self, p: Point) -> Point {
        p.mul(1.0 / self.zoom).add(self.origin)
    }

    fn dim_to_world(&self, d: f64) -> f64 {
        d / self.zoom
    }
}

/// World geometry of a map entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityGeometry {
    /// One or more line strings.
    MultiLineString(Vec<Vec<Point>>),
    /// A single position.
    Point(Point),
}

/// A rendered map object that can be hovered.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntity {
    /// Layer the entity belongs to.
    pub layer_index: usize,
    /// Data row index.
    pub index: usize,
    /// Geometry, if attached.
    pub geometry: Option<EntityGeometry>,
    /// Stroke width (paths) or diameter (points) in client pixels.
    pub stroke_width: f64,
}

/// Which locator produced a hover result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    /// [`PathLocator`].
    Path,
    /// [`PointLocator`].
    Point,
}

/// Result of a locator search.
///
/// Distances are only comparable within one `reduce` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverObject {
    /// Layer of the hit entity.
    pub layer_index: usize,
    /// Data row index.
    pub index: usize,
    /// Distance from the pointer, in world units.
    pub distance: f64,
    /// Originating locator.
    pub locator: LocatorKind,
}

/// Finds the entity under a pointer.
pub trait Locator: Debug {
    /// Hover result for `target`, `None` when missed.
    fn search(&self, coord: Point, target: &MapEntity, helper: &dyn RenderHelper) -> Option<HoverObject>;

    /// Pick one of several hits.
    fn reduce(&self, hover_objects: &[HoverObject]) -> Option<HoverObject>;
}

/// Hit-tests line strings against their stroke.
///
/// Any hit within the stroke is reported with distance 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathLocator;

impl PathLocator {
    fn is_coordinate_in_path(coord: Point, stroke_radius: f64, lines: &[Vec<Point>]) -> bool {
        for line in lines {
            let Some(bbox) = Rect::bounding_box(line) else {
                continue;
            };
            if !bbox.inflate(stroke_radius, stroke_radius).contains(coord) {
                continue;
            }
            if Self::path_contains_coordinate(coord, line, stroke_radius) {
                return true;
            }
        }
        false
    }

    fn path_contains_coordinate(coord: Point, path: &[Point], stroke_width: f64) -> bool {
        path.windows(2)
            .any(|w| Segment::new(w[0], w[1]).distance_squared_to(coord) <= stroke_width * stroke_width)
    }
}

impl Locator for PathLocator {
    fn search(&self, coord: Point, target: &MapEntity, helper: &dyn RenderHelper) -> Option<HoverObject> {
        let Some(EntityGeometry::MultiLineString(lines)) = &target.geometry else {
            return None;
        };
        let world = helper.pos_to_world(coord);
        let stroke_radius = helper.dim_to_world(target.stroke_width / 2.0);
        Self::is_coordinate_in_path(world, stroke_radius, lines).then_some(HoverObject {
            layer_index: target.layer_index,
            index: target.index,
            distance: 0.0,
            locator: LocatorKind::Path,
        })
    }

    // No ranking among paths yet: first hit wins.
    fn reduce(&self, hover_objects: &[HoverObject]) -> Option<HoverObject> {
        hover_objects.first().copied()
    }
}

/// Hit-tests point markers by radius.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointLocator;

impl Locator for PointLocator {
    fn search(&self, coord: Point, target: &MapEntity, helper: &dyn RenderHelper) -> Option<HoverObject> {
        let Some(EntityGeometry::Point(center)) = &target.geometry else {
            return None;
        };
        let distance = helper.pos_to_world(coord).distance(*center);
        (distance <= helper.dim_to_world(target.stroke_width / 2.0)).then_some(HoverObject {
            layer_index: target.layer_index,
            index: target.index,
            distance,
            locator: LocatorKind::Point,
        })
    }

    fn reduce(&self, hover_objects: &[HoverObject]) -> Option<HoverObject> {
        hover_objects
            .iter()
            .copied()
            .reduce(|best, h| if h.distance < best.distance { h } else { best })
    }
}

/// A target resolved for a pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupResult<'a> {
    /// Data row index.
    pub index: usize,
    /// Distance from the pointer in client pixels (0 inside rectangles).
    pub distance: f64,
    /// Matched target.
    pub target: &'a GeomTarget,
}

/// Resolves client points against a layer's geom targets.
#[derive(Debug, Clone, Copy)]
pub struct TargetLocator<'a> {
    targets: &'a [GeomTarget],
}

impl<'a> TargetLocator<'a> {
    /// Locator over `targets`.
    #[must_use]
    pub fn new(targets: &'a [GeomTarget]) -> Self {
        Self { targets }
    }

    /// Closest hit target; ties go to the first registered.
    #[must_use]
    pub fn search(&self, p: Point) -> Option<LookupResult<'a>> {
        let mut best: Option<LookupResult<'a>> = None;
        for target in self.targets {
            let Some((index, distance)) = Self::hit(target, p) else {
                continue;
            };
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(LookupResult { index, distance, target });
            }
        }
        best
    }

    fn hit(target: &GeomTarget, p: Point) -> Option<(usize, f64)> {
        match target.shape() {
            HitShape::Rect(r) => r.contains(p).then_some((target.index(), 0.0)),
            HitShape::Point { center, radius } => {
                let d = center.distance(p);
                (d <= *radius).then_some((target.index(), d))
            }
            HitShape::Path(points) => {
                let xs = points.iter().map(|pp| pp.point.x);
                let lo = xs.clone().fold(f64::INFINITY, f64::min);
                let hi = xs.fold(f64::NEG_INFINITY, f64::max);
                if p.x < lo || p.x > hi {
                    return None;
                }
                points
                    .iter()
                    .map(|pp| (pp.index, (pp.point.x - p.x).abs()))
                    .reduce(|best, c| if c.1 < best.1 { c } else { best })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tooltip::target::{GeomTargetCollector, PathPoint, TipKind, TooltipParams};

    fn path_entity(lines: Vec<Vec<Point>>, stroke_width: f64) -> MapEntity {
        MapEntity { layer_index: 1, index: 4, geometry: Some(EntityGeometry::MultiLineString(lines)), stroke_width }
    }

    #[test]
    fn test_path_locator_hit_within_stroke() {
        let e = path_entity(vec![vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]], 2.0);
        let hit = PathLocator.search(Point::new(5.0, 0.9), &e, &ZoomRenderHelper::default()).unwrap();
        assert_eq!((hit.layer_index, hit.index, hit.distance), (1, 4, 0.0));
        assert!(PathLocator.search(Point::new(5.0, 1.5), &e, &ZoomRenderHelper::default()).is_none());
    }

    #[test]
    fn test_path_locator_uses_endpoint_distance_past_segment() {
        let e = path_entity(vec![vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]], 2.0);
        // Within the inflated bbox, but beyond the end cap.
        assert!(PathLocator.search(Point::new(10.9, 0.9), &e, &ZoomRenderHelper::default()).is_none());
        assert!(PathLocator.search(Point::new(10.5, 0.5), &e, &ZoomRenderHelper::default()).is_some());
    }

    #[test]
    fn test_path_locator_without_geometry() {
        let e = MapEntity { layer_index: 0, index: 0, geometry: None, stroke_width: 1.0 };
        assert!(PathLocator.search(Point::ORIGIN, &e, &ZoomRenderHelper::default()).is_none());
    }

    #[test]
    fn test_path_locator_second_line_string() {
        let e = path_entity(
            vec![vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)], vec![Point::new(50.0, 50.0), Point::new(60.0, 50.0)]],
            2.0,
        );
        assert!(PathLocator.search(Point::new(55.0, 50.5), &e, &ZoomRenderHelper::default()).is_some());
    }

    #[test]
    fn test_render_helper_zoom() {
        let h = ZoomRenderHelper::new(Point::new(100.0, 0.0), 2.0);
        assert_eq!(h.pos_to_world(Point::new(10.0, 4.0)), Point::new(105.0, 2.0));
        assert_eq!(h.dim_to_world(4.0), 2.0);
        // Zoomed in: the stroke covers less of the world.
        let e = path_entity(vec![vec![Point::new(100.0, 0.0), Point::new(110.0, 0.0)]], 2.0);
        assert!(PathLocator.search(Point::new(10.0, 0.8), &e, &h).is_some());
        assert!(PathLocator.search(Point::new(10.0, 1.2), &e, &h).is_none());
    }

    #[test]
    fn test_reduce_policies() {
        let a = HoverObject { layer_index: 0, index: 1, distance: 3.0, locator: LocatorKind::Point };
        let b = HoverObject { index: 2, distance: 1.0, ..a };
        assert_eq!(PathLocator.reduce(&[a, b]).map(|h| h.index), Some(1));
        assert_eq!(PointLocator.reduce(&[a, b]).map(|h| h.index), Some(2));
        assert!(PointLocator.reduce(&[]).is_none());
    }

    #[test]
    fn test_point_locator() {
        let e = MapEntity { layer_index: 0, index: 9, geometry: Some(EntityGeometry::Point(Point::ORIGIN)), stroke_width: 10.0 };
        let hit = PointLocator.search(Point::new(3.0, 4.0), &e, &ZoomRenderHelper::default()).unwrap();
        assert_eq!(hit.distance, 5.0);
        assert!(PointLocator.search(Point::new(6.0, 0.0), &e, &ZoomRenderHelper::default()).is_none());
    }

    fn path_targets() -> GeomTargetCollector {
        let mut c = GeomTargetCollector::new();
        let points = [0.0, 10.0, 20.0]
            .iter()
            .enumerate()
            .map(|(i, x)| PathPoint { point: Point::new(*x, 5.0), index: i })
            .collect();
        c.add_path(points, TooltipParams::default(), TipKind::HorizontalTooltip);
        c
    }

    #[test]
    fn test_target_locator_path_hover_x() {
        let c = path_targets();
        let loc = TargetLocator::new(c.targets());
        assert_eq!(loc.search(Point::new(11.0, 0.0)).map(|r| r.index), Some(1));
        assert_eq!(loc.search(Point::new(18.0, 0.0)).map(|r| r.index), Some(2));
        // Halfway between two vertices: the first one wins.
        assert_eq!(loc.search(Point::new(5.0, 0.0)).map(|r| r.index), Some(0));
        assert!(loc.search(Point::new(-1.0, 0.0)).is_none());
    }

    #[test]
    fn test_target_locator_rect_and_point() {
        let mut c = GeomTargetCollector::new();
        c.add_rectangle(0, Rect::new(0.0, 0.0, 10.0, 10.0), TooltipParams::default(), TipKind::HorizontalTooltip);
        c.add_point(1, Point::new(5.0, 5.0), 3.0, TooltipParams::default(), TipKind::VerticalTooltip);
        let loc = TargetLocator::new(c.targets());
        let hit = loc.search(Point::new(5.0, 5.0)).unwrap();
        assert_eq!((hit.index, hit.distance), (0, 0.0));
        assert_eq!(loc.search(Point::new(12.0, 5.0)), None);
        let outside_rect = loc.search(Point::new(5.0, 7.0)).unwrap();
        assert_eq!(outside_rect.index, 0);
    }
}
