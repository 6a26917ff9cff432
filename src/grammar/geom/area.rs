use super::glyph::fill_style;
use super::{marker_colors, with_defined, Geom, GeomContext, GeomKind, LegendKeyFactory};
use crate::geometry::Point;
use crate::grammar::{Aes, Aesthetics, AestheticsDefaults, CoordinateSystem};
use crate::render::SceneNode;
use crate::tooltip::{GeomTargetCollector, PathPoint, TipKind, TooltipParams};

/// Filled band between the baseline (`ymin`, or zero) and `y`, per group.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaGeom;

impl Geom for AreaGeom {
    fn kind(&self) -> GeomKind {
        GeomKind::Area
    }

    fn defaults(&self) -> AestheticsDefaults {
        AestheticsDefaults::bar()
    }

    fn required_aes(&self) -> Vec<Aes> {
        vec![Aes::X, Aes::Y]
    }

    fn handles_groups(&self) -> bool {
        true
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
        let defined = Aesthetics::new(
            with_defined(self.kind(), aesthetics, &self.required_aes())
                .into_iter()
                .cloned()
                .collect(),
        );
        let tip_kind = if ctx.is_flipped() {
            TipKind::VerticalTooltip
        } else {
            TipKind::HorizontalTooltip
        };

        let mut nodes = Vec::new();
        for mut group in defined.groups() {
            group.sort_by(|a, b| a.x().unwrap_or(0.0).total_cmp(&b.x().unwrap_or(0.0)));
            let Some(first) = group.first().copied() else { continue };

            let mut upper = Vec::with_capacity(group.len());
            let mut lower = Vec::with_capacity(group.len());
            for p in &group {
                let (Some(x), Some(y)) = (p.x(), p.y()) else { continue };
                let base = p.number(Aes::YMin).unwrap_or(0.0);
                if let (Some(top), Some(bottom)) = (coord.to_client(Point::new(x, y)), coord.to_client(Point::new(x, base))) {
                    upper.push(PathPoint { point: top, index: p.index() });
                    lower.push(bottom);
                }
            }
            if upper.len() >= 2 {
                let mut outline: Vec<Point> = upper.iter().map(|pp| pp.point).collect();
                outline.extend(lower.into_iter().rev());
                nodes.push(SceneNode::polygon(outline, fill_style(first)));
            }
            let params = TooltipParams {
                fill_color: Some(first.fill()),
                marker_colors: marker_colors(first, true),
                ..TooltipParams::default()
            };
            targets.add_path(upper, params, tip_kind);
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Span};
    use crate::grammar::{CartesianCoordinates, DataPoint};

    #[test]
    fn test_area_polygon() {
        let coord = CartesianCoordinates::new(Span::new(0.0, 4.0), Span::new(0.0, 4.0), Rect::new(0.0, 0.0, 40.0, 40.0));
        let aes = Aesthetics::new(vec![
            DataPoint::new(0).with(Aes::X, 2.0).with(Aes::Y, 2.0),
            DataPoint::new(1).with(Aes::X, 0.0).with(Aes::Y, 1.0),
        ]);
        let mut targets = GeomTargetCollector::new();
        let nodes = AreaGeom.build(&aes, &coord, &GeomContext::new(false), &mut targets);
        match &nodes[0] {
            SceneNode::Path { points, closed, .. } => {
                assert!(closed);
                assert_eq!(
                    points,
                    &vec![
                        Point::new(0.0, 30.0),
                        Point::new(20.0, 20.0),
                        Point::new(20.0, 40.0),
                        Point::new(0.0, 40.0)
                    ]
                );
            }
            other => panic!("unexpected node {other:?}"),
        }
        assert_eq!(targets.targets()[0].kind(), TipKind::HorizontalTooltip);
        assert_eq!(targets.targets()[0].index(), 1);
    }
}
