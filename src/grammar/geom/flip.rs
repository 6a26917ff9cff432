//! Orientation handling shared by the range geoms.
//!
//! A range geom is written once for the vertical case. A horizontal variant
//! reads its aesthetics through [`FlippableGeomHelper::effective_aes`] and
//! swaps coordinates of everything it builds before handing it to the
//! coordinate system.
//!
//! Tooltip orientation is decided separately from the shape: it depends on
//! the geom orientation and on whether the whole plot is flipped.

use super::GeomContext;
use crate::color::Rgba;
use crate::geometry::{Point, Rect, Segment};
use crate::grammar::{Aes, CoordinateSystem, DataPoint};
use crate::tooltip::{GeomTargetCollector, TipKind, TipLayoutHint, TooltipParams};
use std::collections::BTreeMap;

/// Orientation helper of a geom with vertical and horizontal variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlippableGeomHelper {
    is_vertical: bool,
}

impl FlippableGeomHelper {
    /// Helper for a vertical (`true`) or horizontal geom.
    #[must_use]
    pub const fn new(is_vertical: bool) -> Self {
        Self { is_vertical }
    }

    /// Geom orientation.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        self.is_vertical
    }

    /// Aesthetic holding the value the vertical geom calls `aes`.
    #[must_use]
    pub fn effective_aes(self, aes: Aes) -> Aes {
        if self.is_vertical {
            return aes;
        }
        match aes {
            Aes::X => Aes::Y,
            Aes::Y => Aes::X,
            Aes::YMin => Aes::XMin,
            Aes::YMax => Aes::XMax,
            Aes::XMin => Aes::YMin,
            Aes::XMax => Aes::YMax,
            Aes::Width => Aes::Height,
            Aes::Height => Aes::Width,
            other => other,
        }
    }

    /// Point from the vertical frame into aesthetic space.
    #[must_use]
    pub fn flip_point(self, p: Point) -> Point {
        if self.is_vertical { p } else { p.flip() }
    }

    /// Rectangle from the vertical frame into aesthetic space.
    #[must_use]
    pub fn flip_rect(self, r: Rect) -> Rect {
        if self.is_vertical { r } else { r.flip() }
    }

    /// Segment from the vertical frame into aesthetic space.
    #[must_use]
    pub fn flip_segment(self, s: Segment) -> Segment {
        if self.is_vertical { s } else { s.flip() }
    }

    /// Whether the geom appears vertical on screen.
    #[must_use]
    pub fn is_vertically_oriented(self, ctx: &GeomContext) -> bool {
        if self.is_vertical {
            !ctx.is_flipped()
        } else {
            ctx.is_flipped()
        }
    }

    /// Kind of the per-aesthetic hints.
    #[must_use]
    pub fn hint_kind(self, ctx: &GeomContext) -> TipKind {
        if self.is_vertically_oriented(ctx) {
            TipKind::HorizontalTooltip
        } else {
            TipKind::RotatedTooltip
        }
    }

    /// Kind of the main tooltip.
    #[must_use]
    pub fn target_kind(self, ctx: &GeomContext) -> TipKind {
        if self.is_vertically_oriented(ctx) {
            TipKind::HorizontalTooltip
        } else {
            TipKind::VerticalTooltip
        }
    }

    /// Half the client rectangle's extent across the geom.
    #[must_use]
    pub fn object_radius(self, ctx: &GeomContext, client_rect: Rect) -> f64 {
        if self.is_vertically_oriented(ctx) {
            client_rect.width / 2.0
        } else {
            client_rect.height / 2.0
        }
    }

    /// Resolution along the geom's own x.
    #[must_use]
    pub fn resolution(self, ctx: &GeomContext) -> f64 {
        ctx.resolution(self.effective_aes(Aes::X))
    }

    /// Client position of a vertical-frame point.
    #[must_use]
    pub fn to_client(self, coord: &dyn CoordinateSystem, p: Point) -> Option<Point> {
        coord.to_client(self.flip_point(p))
    }

    /// Client rectangle of a vertical-frame rectangle.
    #[must_use]
    pub fn to_client_rect(self, coord: &dyn CoordinateSystem, r: Rect) -> Option<Rect> {
        coord.to_client_rect(self.flip_rect(r))
    }

    /// Register `target` with one hint per `hint_aes` (given in the
    /// vertical frame) anchored at `(x, p[aes])`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn add_target(
        self,
        targets: &mut GeomTargetCollector,
        p: &DataPoint,
        hint_aes: &[Aes],
        target: Rect,
        radius: f64,
        coord: &dyn CoordinateSystem,
        ctx: &GeomContext,
        marker_colors: Vec<Rgba>,
    ) {
        let kind = self.hint_kind(ctx);
        self.add_target_with_hint_kind(targets, p, hint_aes, target, radius, coord, ctx, marker_colors, kind);
    }

    /// Like [`Self::add_target`], with every hint of `kind`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn add_target_with_hint_kind(
        self,
        targets: &mut GeomTargetCollector,
        p: &DataPoint,
        hint_aes: &[Aes],
        target: Rect,
        radius: f64,
        coord: &dyn CoordinateSystem,
        ctx: &GeomContext,
        marker_colors: Vec<Rgba>,
        kind: TipKind,
    ) {
        let Some(x) = p.number(self.effective_aes(Aes::X)) else {
            return;
        };
        let mut hints = BTreeMap::new();
        for aes in hint_aes {
            let aes = self.effective_aes(*aes);
            let Some(v) = p.number(aes) else {
                continue;
            };
            if let Some(anchor) = self.to_client(coord, Point::new(x, v)) {
                hints.insert(aes, TipLayoutHint::new(kind, anchor, radius, None));
            }
        }
        let params = TooltipParams { hints, fill_color: Some(p.fill()), marker_colors };
        targets.add_rectangle(p.index(), target, params, self.target_kind(ctx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(flipped: bool) -> GeomContext {
        GeomContext::new(flipped)
    }

    #[test]
    fn test_effective_aes() {
        let v = FlippableGeomHelper::new(true);
        let h = FlippableGeomHelper::new(false);
        assert_eq!(v.effective_aes(Aes::YMin), Aes::YMin);
        assert_eq!(h.effective_aes(Aes::X), Aes::Y);
        assert_eq!(h.effective_aes(Aes::YMin), Aes::XMin);
        assert_eq!(h.effective_aes(Aes::YMax), Aes::XMax);
        assert_eq!(h.effective_aes(Aes::Width), Aes::Height);
        assert_eq!(h.effective_aes(Aes::Color), Aes::Color);
    }

    #[test]
    fn test_orientation_composition() {
        let cases = [
            (true, false, TipKind::HorizontalTooltip, TipKind::HorizontalTooltip),
            (true, true, TipKind::RotatedTooltip, TipKind::VerticalTooltip),
            (false, false, TipKind::RotatedTooltip, TipKind::VerticalTooltip),
            (false, true, TipKind::HorizontalTooltip, TipKind::HorizontalTooltip),
        ];
        for (vertical, flipped, hint, target) in cases {
            let helper = FlippableGeomHelper::new(vertical);
            assert_eq!(helper.hint_kind(&ctx(flipped)), hint, "{vertical} {flipped}");
            assert_eq!(helper.target_kind(&ctx(flipped)), target, "{vertical} {flipped}");
        }
    }

    #[test]
    fn test_object_radius() {
        let r = Rect::new(0.0, 0.0, 10.0, 4.0);
        assert_eq!(FlippableGeomHelper::new(true).object_radius(&ctx(false), r), 5.0);
        assert_eq!(FlippableGeomHelper::new(true).object_radius(&ctx(true), r), 2.0);
        assert_eq!(FlippableGeomHelper::new(false).object_radius(&ctx(false), r), 2.0);
    }

    #[test]
    fn test_flip_shapes() {
        let h = FlippableGeomHelper::new(false);
        assert_eq!(h.flip_point(Point::new(1.0, 2.0)), Point::new(2.0, 1.0));
        assert_eq!(h.flip_rect(Rect::new(1.0, 2.0, 3.0, 4.0)), Rect::new(2.0, 1.0, 4.0, 3.0));
        let v = FlippableGeomHelper::new(true);
        assert_eq!(v.flip_point(Point::new(1.0, 2.0)), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_resolution_follows_orientation() {
        let c = GeomContext::new(false).with_resolution(2.0, 7.0);
        assert_eq!(FlippableGeomHelper::new(true).resolution(&c), 2.0);
        assert_eq!(FlippableGeomHelper::new(false).resolution(&c), 7.0);
    }
}
