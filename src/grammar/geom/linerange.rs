use super::glyph::{line_style, AesScaling};
use super::{marker_colors, with_defined, FlippableGeomHelper, Geom, GeomContext, GeomKind, LegendKeyFactory};
use crate::geometry::{Point, Rect};
use crate::grammar::{Aes, Aesthetics, CoordinateSystem};
use crate::render::SceneNode;
use crate::tooltip::GeomTargetCollector;

/// Line from `ymin` to `ymax`.
#[derive(Debug, Clone, Copy)]
pub struct LineRangeGeom {
    flip: FlippableGeomHelper,
}

impl LineRangeGeom {
    /// Vertical (`true`) or horizontal line range.
    #[must_use]
    pub fn new(is_vertical: bool) -> Self {
        Self { flip: FlippableGeomHelper::new(is_vertical) }
    }
}

impl Geom for LineRangeGeom {
    fn kind(&self) -> GeomKind {
        GeomKind::LineRange
    }

    fn required_aes(&self) -> Vec<Aes> {
        [Aes::X, Aes::YMin, Aes::YMax].map(|a| self.flip.effective_aes(a)).to_vec()
    }

    fn legend_key(&self) -> LegendKeyFactory {
        LegendKeyFactory::VLine
    }

    fn build(
        &self,
        aesthetics: &Aesthetics,
        coord: &dyn CoordinateSystem,
        ctx: &GeomContext,
        targets: &mut GeomTargetCollector,
    ) -> Vec<SceneNode> {
        let f = self.flip;
        let mut nodes = Vec::new();
        for p in with_defined(self.kind(), aesthetics, &self.required_aes()) {
            let values = (
                p.number(f.effective_aes(Aes::X)),
                p.number(f.effective_aes(Aes::YMin)),
                p.number(f.effective_aes(Aes::YMax)),
            );
            let (Some(x), Some(ymin), Some(ymax)) = values else { continue };
            let (Some(start), Some(end)) =
                (f.to_client(coord, Point::new(x, ymin)), f.to_client(coord, Point::new(x, ymax)))
            else {
                continue;
            };
            nodes.push(SceneNode::line(start, end, line_style(p)));

            // zero-size anchor at (x, ymin), widened by the stroke across the geom
            let Some(client) = f.to_client_rect(coord, Rect::new(x, ymin, 0.0, 0.0)) else { continue };
            let stroke = AesScaling::stroke_width(p);
            let target = if f.is_vertical() { client.inflate(stroke, 0.0) } else { client.inflate(0.0, stroke) };
            let kind = f.target_kind(ctx);
            f.add_target_with_hint_kind(
                targets,
                p,
                &[Aes::YMin, Aes::YMax],
                target,
                f.object_radius(ctx, client),
                coord,
                ctx,
                marker_colors(p, false),
                kind,
            );
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Span;
    use crate::grammar::{CartesianCoordinates, DataPoint};
    use crate::tooltip::{HitShape, TipKind};

    fn coord() -> CartesianCoordinates {
        CartesianCoordinates::new(Span::new(0.0, 16.0), Span::new(0.0, 16.0), Rect::new(0.0, 0.0, 128.0, 128.0))
    }

    fn vertical_point() -> DataPoint {
        DataPoint::new(0)
            .with(Aes::X, 4.0)
            .with(Aes::YMin, 2.0)
            .with(Aes::YMax, 6.0)
            .with(Aes::Size, 1.0)
    }

    #[test]
    fn test_line_and_anchor_target() {
        let mut targets = GeomTargetCollector::new();
        let nodes =
            LineRangeGeom::new(true).build(&Aesthetics::new(vec![vertical_point()]), &coord(), &GeomContext::new(false), &mut targets);
        match &nodes[0] {
            SceneNode::Line { segment, .. } => {
                assert_eq!(segment.start, Point::new(32.0, 112.0));
                assert_eq!(segment.end, Point::new(32.0, 80.0));
            }
            other => panic!("unexpected node {other:?}"),
        }
        let target = &targets.targets()[0];
        match target.shape() {
            HitShape::Rect(r) => {
                approx::assert_relative_eq!(r.x, 32.0 - 2.2);
                approx::assert_relative_eq!(r.width, 4.4);
                assert_eq!(r.y, 112.0);
                assert_eq!(r.height, 0.0);
            }
            other => panic!("unexpected target {other:?}"),
        }
        assert_eq!(target.kind(), TipKind::HorizontalTooltip);
        assert_eq!(target.hints()[&Aes::YMin].kind(), TipKind::HorizontalTooltip);
        assert_eq!(target.hints()[&Aes::YMax].kind(), TipKind::HorizontalTooltip);
        assert_eq!(target.hints()[&Aes::YMax].object_radius(), 0.0);
    }

    #[test]
    fn test_anchor_target_on_flipped_plot() {
        let mut targets = GeomTargetCollector::new();
        LineRangeGeom::new(true).build(
            &Aesthetics::new(vec![vertical_point()]),
            &coord().flipped(true),
            &GeomContext::new(true),
            &mut targets,
        );
        let target = &targets.targets()[0];
        match target.shape() {
            HitShape::Rect(r) => {
                // (x 4, ymin 2) drawn at (16, 96); still widened along client x
                approx::assert_relative_eq!(r.x, 16.0 - 2.2);
                approx::assert_relative_eq!(r.width, 4.4);
                assert_eq!(r.y, 96.0);
                assert_eq!(r.height, 0.0);
            }
            other => panic!("unexpected target {other:?}"),
        }
        assert_eq!(target.kind(), TipKind::VerticalTooltip);
        assert_eq!(target.hints()[&Aes::YMin].kind(), TipKind::VerticalTooltip);
        assert_eq!(target.hints()[&Aes::YMax].kind(), TipKind::VerticalTooltip);
    }

    #[test]
    fn test_horizontal_line_range() {
        let coord = coord();
        let p = DataPoint::new(0).with(Aes::Y, 4.0).with(Aes::XMin, 2.0).with(Aes::XMax, 6.0);
        let mut targets = GeomTargetCollector::new();
        let nodes = LineRangeGeom::new(false).build(&Aesthetics::new(vec![p]), &coord, &GeomContext::new(false), &mut targets);
        match &nodes[0] {
            SceneNode::Line { segment, .. } => {
                assert_eq!(segment.start, Point::new(16.0, 96.0));
                assert_eq!(segment.end, Point::new(48.0, 96.0));
            }
            other => panic!("unexpected node {other:?}"),
        }
        assert_eq!(targets.targets()[0].kind(), TipKind::VerticalTooltip);
        assert_eq!(targets.targets()[0].hints()[&Aes::XMin].kind(), TipKind::VerticalTooltip);
    }
}
