use super::glyph::line_style;
use super::legend_key::error_bar_segments;
use super::{marker_colors, with_defined, FlippableGeomHelper, Geom, GeomContext, GeomKind, LegendKeyFactory};
use crate::geometry::Rect;
use crate::grammar::{Aes, Aesthetics, CoordinateSystem};
use crate::render::SceneNode;
use crate::tooltip::GeomTargetCollector;

/// Interval from `ymin` to `ymax` with caps `width` wide.
#[derive(Debug, Clone, Copy)]
pub struct ErrorBarGeom {
    flip: FlippableGeomHelper,
}

impl ErrorBarGeom {
    /// Vertical (`true`) or horizontal error bar.
    #[must_use]
    pub fn new(is_vertical: bool) -> Self {
        Self { flip: FlippableGeomHelper::new(is_vertical) }
    }
}

impl Geom for ErrorBarGeom {
    fn kind(&self) -> GeomKind {
        GeomKind::ErrorBar
    }

    fn required_aes(&self) -> Vec<Aes> {
        [Aes::X, Aes::YMin, Aes::YMax, Aes::Width].map(|a| self.flip.effective_aes(a)).to_vec()
    }

    fn legend_key(&self) -> LegendKeyFactory {
        LegendKeyFactory::ErrorBar
    }

    fn build(
        &self,
        aesthetics: &Aesthetics,
        coord: &dyn CoordinateSystem,
        ctx: &GeomContext,
        targets: &mut GeomTargetCollector,
    ) -> Vec<SceneNode> {
        let f = self.flip;
        let resolution = f.resolution(ctx);
        let mut nodes = Vec::new();
        for p in with_defined(self.kind(), aesthetics, &self.required_aes()) {
            let values = (
                p.number(f.effective_aes(Aes::X)),
                p.number(f.effective_aes(Aes::YMin)),
                p.number(f.effective_aes(Aes::YMax)),
                p.number(f.effective_aes(Aes::Width)),
            );
            let (Some(x), Some(ymin), Some(ymax), Some(w)) = values else { continue };
            let width = w * resolution;
            let height = ymax - ymin;

            let rect = Rect::new(x - width / 2.0, ymin, width, height);
            let lines: Vec<SceneNode> = error_bar_segments(rect)
                .into_iter()
                .filter_map(|s| {
                    let s = f.flip_segment(s);
                    let start = coord.to_client(s.start)?;
                    let end = coord.to_client(s.end)?;
                    Some(SceneNode::line(start, end, line_style(p)))
                })
                .collect();
            nodes.push(SceneNode::group(lines));

            let hint = Rect::new(x - width / 2.0, ymin - height / 2.0, width, 0.0);
            if let Some(client) = f.to_client_rect(coord, hint) {
                f.add_target(targets, p, &[Aes::YMin, Aes::YMax], client, f.object_radius(ctx, client), coord, ctx, marker_colors(p, false));
            }
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Span};
    use crate::grammar::{CartesianCoordinates, DataPoint};
    use crate::tooltip::{HitShape, TipKind};

    fn coord() -> CartesianCoordinates {
        CartesianCoordinates::new(Span::new(0.0, 16.0), Span::new(0.0, 16.0), Rect::new(0.0, 0.0, 128.0, 128.0))
    }

    #[test]
    fn test_three_segments() {
        let p = DataPoint::new(0)
            .with(Aes::X, 4.0)
            .with(Aes::YMin, 2.0)
            .with(Aes::YMax, 6.0)
            .with(Aes::Width, 0.5);
        let mut targets = GeomTargetCollector::new();
        let nodes = ErrorBarGeom::new(true).build(&Aesthetics::new(vec![p]), &coord(), &GeomContext::new(false), &mut targets);
        assert_eq!(nodes.len(), 1);
        let segments: Vec<_> = nodes[0]
            .children()
            .iter()
            .filter_map(|n| match n {
                SceneNode::Line { segment, .. } => Some(*segment),
                _ => None,
            })
            .collect();
        assert_eq!(segments.len(), 3);
        // caps at ymin and ymax, x 3.75..4.25 -> 30..34
        assert_eq!(segments[0].start, Point::new(30.0, 112.0));
        assert_eq!(segments[0].end, Point::new(34.0, 112.0));
        assert_eq!(segments[1].start, Point::new(30.0, 80.0));
        assert_eq!(segments[2].start, Point::new(32.0, 112.0));
        assert_eq!(segments[2].end, Point::new(32.0, 80.0));

        // hint rect sits at ymin - height / 2
        assert_eq!(targets.targets()[0].shape(), &HitShape::Rect(Rect::new(30.0, 128.0, 4.0, 0.0)));
        assert_eq!(targets.targets()[0].kind(), TipKind::HorizontalTooltip);
    }

    #[test]
    fn test_horizontal_on_flipped_plot() {
        let p = DataPoint::new(0)
            .with(Aes::Y, 4.0)
            .with(Aes::XMin, 2.0)
            .with(Aes::XMax, 6.0)
            .with(Aes::Height, 0.5);
        let mut targets = GeomTargetCollector::new();
        let nodes = ErrorBarGeom::new(false).build(&Aesthetics::new(vec![p]), &coord().flipped(true), &GeomContext::new(true), &mut targets);
        assert_eq!(nodes[0].leaf_count(), 3);
        assert_eq!(targets.targets()[0].kind(), TipKind::HorizontalTooltip);
        assert_eq!(targets.targets()[0].hints()[&Aes::XMin].kind(), TipKind::HorizontalTooltip);
    }

    #[test]
    fn test_missing_width_skips_row() {
        let p = DataPoint::new(0).with(Aes::X, 4.0).with(Aes::YMin, 2.0).with(Aes::YMax, 6.0);
        let mut targets = GeomTargetCollector::new();
        let nodes = ErrorBarGeom::new(true).build(&Aesthetics::new(vec![p]), &coord(), &GeomContext::new(false), &mut targets);
        assert!(nodes.is_empty());
    }
}
