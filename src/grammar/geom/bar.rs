use super::glyph::fill_style;
use super::{marker_colors, with_defined, Geom, GeomContext, GeomKind, LegendKeyFactory};
use crate::geometry::{Point, Rect};
use crate::grammar::{Aes, Aesthetics, AestheticsDefaults, CoordinateSystem};
use crate::render::SceneNode;
use crate::tooltip::{GeomTargetCollector, TipKind, TipLayoutHint, TooltipParams};
use std::collections::BTreeMap;

/// Bars from the baseline (`ymin`, or zero) up to `y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarGeom;

impl Geom for BarGeom {
    fn kind(&self) -> GeomKind {
        GeomKind::Bar
    }

    fn defaults(&self) -> AestheticsDefaults {
        AestheticsDefaults::bar()
    }

    fn required_aes(&self) -> Vec<Aes> {
        vec![Aes::X, Aes::Y, Aes::Width]
    }

    fn legend_key(&self) -> LegendKeyFactory {
        LegendKeyFactory::Rect
    }

    fn build(
        &self,
        aesthetics: &Aesthetics,
        coord: &dyn CoordinateSystem,
        ctx: &GeomContext,
        targets: &mut GeomTargetCollector,
    ) -> Vec<SceneNode> {
        let resolution = ctx.resolution(Aes::X);
        let (tip_kind, vertical_bars) = if ctx.is_flipped() {
            (TipKind::VerticalTooltip, false)
        } else {
            (TipKind::HorizontalTooltip, true)
        };

        let mut nodes = Vec::new();
        for p in with_defined(self.kind(), aesthetics, &self.required_aes()) {
            let (Some(x), Some(y), Some(w)) = (p.x(), p.y(), p.number(Aes::Width)) else { continue };
            let width = w * resolution;
            let base = p.number(Aes::YMin).unwrap_or(0.0);
            let data_rect = Rect::new(x - width / 2.0, base, width, y - base);
            let Some(client) = coord.to_client_rect(data_rect) else { continue };
            nodes.push(SceneNode::rect(client, fill_style(p)));

            let radius = if vertical_bars { client.width / 2.0 } else { client.height / 2.0 };
            let mut hints = BTreeMap::new();
            if let Some(top) = coord.to_client(Point::new(x, y)) {
                hints.insert(Aes::Y, TipLayoutHint::new(tip_kind, top, radius, None));
            }
            let params = TooltipParams { hints, fill_color: Some(p.fill()), marker_colors: marker_colors(p, true) };
            targets.add_rectangle(p.index(), client, params, tip_kind);
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Span;
    use crate::grammar::{CartesianCoordinates, DataPoint};
    use crate::tooltip::HitShape;

    #[test]
    fn test_bar_rect() {
        let coord = CartesianCoordinates::new(Span::new(0.0, 16.0), Span::new(0.0, 16.0), Rect::new(0.0, 0.0, 128.0, 128.0));
        let aes = Aesthetics::new(vec![DataPoint::new(0).with(Aes::X, 5.0).with(Aes::Y, 4.0).with(Aes::Width, 0.5)]);
        let mut targets = GeomTargetCollector::new();
        let ctx = GeomContext::new(false).with_resolution(2.0, 1.0);
        let nodes = BarGeom.build(&aes, &coord, &ctx, &mut targets);
        match &nodes[0] {
            SceneNode::Rect { rect, .. } => assert_eq!(*rect, Rect::new(36.0, 96.0, 8.0, 32.0)),
            other => panic!("unexpected node {other:?}"),
        }
        assert!(matches!(targets.targets()[0].shape(), HitShape::Rect(_)));
        assert_eq!(targets.targets()[0].hints()[&Aes::Y].coord(), Point::new(40.0, 96.0));
        assert_eq!(targets.targets()[0].hints()[&Aes::Y].object_radius(), 4.0);
    }

    #[test]
    fn test_stacked_bar_uses_ymin() {
        let coord = CartesianCoordinates::new(Span::new(0.0, 16.0), Span::new(0.0, 16.0), Rect::new(0.0, 0.0, 128.0, 128.0));
        let aes = Aesthetics::new(vec![DataPoint::new(0)
            .with(Aes::X, 5.0)
            .with(Aes::YMin, 2.0)
            .with(Aes::Y, 4.0)
            .with(Aes::Width, 1.0)]);
        let mut targets = GeomTargetCollector::new();
        let nodes = BarGeom.build(&aes, &coord, &GeomContext::new(false), &mut targets);
        match &nodes[0] {
            SceneNode::Rect { rect, .. } => assert_eq!(*rect, Rect::new(36.0, 96.0, 8.0, 16.0)),
            other => panic!("unexpected node {other:?}"),
        }
    }
}
