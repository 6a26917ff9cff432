//! Tooltip targets registered by geoms while they render.

use crate::color::Rgba;
use crate::geometry::{Point, Rect};
use crate::grammar::Aes;
use std::collections::BTreeMap;

/// Where a tooltip is placed relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TipKind {
    /// Above or below the target.
    #[default]
    VerticalTooltip,
    /// Left or right of the target.
    HorizontalTooltip,
    /// Horizontal tooltip for a geom drawn across the plot.
    RotatedTooltip,
    /// Next to the cursor.
    CursorTooltip,
}

/// Placement hint for one tooltip, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipLayoutHint {
    kind: TipKind,
    coord: Point,
    object_radius: f64,
    color: Option<Rgba>,
}

impl TipLayoutHint {
    /// Hint of `kind` anchored at `coord`.
    #[must_use]
    pub fn new(kind: TipKind, coord: Point, object_radius: f64, color: Option<Rgba>) -> Self {
        Self { kind, coord, object_radius, color }
    }

    /// Tooltip above or below `coord`.
    #[must_use]
    pub fn vertical(coord: Point, object_radius: f64, color: Option<Rgba>) -> Self {
        Self::new(TipKind::VerticalTooltip, coord, object_radius, color)
    }

    /// Tooltip beside `coord`.
    #[must_use]
    pub fn horizontal(coord: Point, object_radius: f64, color: Option<Rgba>) -> Self {
        Self::new(TipKind::HorizontalTooltip, coord, object_radius, color)
    }

    /// Tooltip following the cursor.
    #[must_use]
    pub fn cursor(coord: Point) -> Self {
        Self::new(TipKind::CursorTooltip, coord, 0.0, None)
    }

    /// Placement kind.
    #[must_use]
    pub fn kind(&self) -> TipKind {
        self.kind
    }

    /// Anchor point.
    #[must_use]
    pub fn coord(&self) -> Point {
        self.coord
    }

    /// Half the target's extent across the tooltip direction.
    #[must_use]
    pub fn object_radius(&self) -> f64 {
        self.object_radius
    }

    /// Tooltip paint, if the hint overrides the target's.
    #[must_use]
    pub fn color(&self) -> Option<Rgba> {
        self.color
    }
}

/// A path vertex and the data row it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    /// Client position.
    pub point: Point,
    /// Data row index.
    pub index: usize,
}

/// Hit area of a target.
#[derive(Debug, Clone, PartialEq)]
pub enum HitShape {
    /// Rectangle; hit when the cursor is inside.
    Rect(Rect),
    /// Disc; hit when the cursor is within `radius`.
    Point {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
    },
    /// Polyline; hit by the vertex nearest in x.
    Path(Vec<PathPoint>),
}

/// Tooltip content attached to a target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TooltipParams {
    /// Per-aesthetic placement hints.
    pub hints: BTreeMap<Aes, TipLayoutHint>,
    /// Tooltip fill.
    pub fill_color: Option<Rgba>,
    /// Marker swatches shown next to the lines.
    pub marker_colors: Vec<Rgba>,
}

/// One registered target.
#[derive(Debug, Clone, PartialEq)]
pub struct GeomTarget {
    index: usize,
    shape: HitShape,
    kind: TipKind,
    params: TooltipParams,
}

impl GeomTarget {
    /// Data row index; for paths, the row of the first vertex.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Hit area.
    #[must_use]
    pub fn shape(&self) -> &HitShape {
        &self.shape
    }

    /// Placement kind of the main tooltip.
    #[must_use]
    pub fn kind(&self) -> TipKind {
        self.kind
    }

    /// Tooltip content.
    #[must_use]
    pub fn params(&self) -> &TooltipParams {
        &self.params
    }

    /// Per-aesthetic hints.
    #[must_use]
    pub fn hints(&self) -> &BTreeMap<Aes, TipLayoutHint> {
        &self.params.hints
    }
}

/// Accumulates targets for one layer.
#[derive(Debug, Clone, Default)]
pub struct GeomTargetCollector {
    targets: Vec<GeomTarget>,
}

impl GeomTargetCollector {
    /// Empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rectangular target.
    pub fn add_rectangle(&mut self, index: usize, rect: Rect, params: TooltipParams, kind: TipKind) {
        self.targets.push(GeomTarget { index, shape: HitShape::Rect(rect), kind, params });
    }

    /// Register a disc target.
    pub fn add_point(&mut self, index: usize, center: Point, radius: f64, params: TooltipParams, kind: TipKind) {
        self.targets.push(GeomTarget { index, shape: HitShape::Point { center, radius }, kind, params });
    }

    /// Register a path target; empty paths are ignored.
    pub fn add_path(&mut self, points: Vec<PathPoint>, params: TooltipParams, kind: TipKind) {
        let Some(first) = points.first() else {
            return;
        };
        let index = first.index;
        self.targets.push(GeomTarget { index, shape: HitShape::Path(points), kind, params });
    }

    /// Registered targets.
    #[must_use]
    pub fn targets(&self) -> &[GeomTarget] {
        &self.targets
    }

    /// Number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// No targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Take the targets.
    #[must_use]
    pub fn into_targets(self) -> Vec<GeomTarget> {
        self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector() {
        let mut c = GeomTargetCollector::new();
        c.add_rectangle(3, Rect::new(0.0, 0.0, 1.0, 1.0), TooltipParams::default(), TipKind::HorizontalTooltip);
        c.add_path(Vec::new(), TooltipParams::default(), TipKind::HorizontalTooltip);
        c.add_path(
            vec![PathPoint { point: Point::ORIGIN, index: 7 }],
            TooltipParams::default(),
            TipKind::VerticalTooltip,
        );
        assert_eq!(c.len(), 2);
        assert_eq!(c.targets()[0].index(), 3);
        assert_eq!(c.targets()[1].index(), 7);
        assert!(matches!(c.targets()[1].shape(), HitShape::Path(_)));
    }

    #[test]
    fn test_hint_constructors() {
        let h = TipLayoutHint::horizontal(Point::new(1.0, 2.0), 3.0, Some(Rgba::RED));
        assert_eq!(h.kind(), TipKind::HorizontalTooltip);
        assert_eq!(h.object_radius(), 3.0);
        assert_eq!(TipLayoutHint::cursor(Point::ORIGIN).color(), None);
    }
}
