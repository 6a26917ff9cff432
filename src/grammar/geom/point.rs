use super::glyph::{point_glyph, AesScaling};
use super::{marker_colors, with_defined, Geom, GeomContext, GeomKind, LegendKeyFactory};
use crate::geometry::Point;
use crate::grammar::{Aes, Aesthetics, AestheticsDefaults, CoordinateSystem};
use crate::render::SceneNode;
use crate::tooltip::{GeomTargetCollector, TipKind, TooltipParams};

/// Scatter points.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointGeom;

impl Geom for PointGeom {
    fn kind(&self) -> GeomKind {
        GeomKind::Point
    }

    fn defaults(&self) -> AestheticsDefaults {
        AestheticsDefaults::point()
    }

    fn required_aes(&self) -> Vec<Aes> {
        vec![Aes::X, Aes::Y]
    }

    fn legend_key(&self) -> LegendKeyFactory {
        LegendKeyFactory::Point { fatten: 1.0 }
    }

    fn build(
        &self,
        aesthetics: &Aesthetics,
        coord: &dyn CoordinateSystem,
        _ctx: &GeomContext,
        targets: &mut GeomTargetCollector,
    ) -> Vec<SceneNode> {
        let mut nodes = Vec::new();
        for p in with_defined(self.kind(), aesthetics, &self.required_aes()) {
            let (Some(x), Some(y)) = (p.x(), p.y()) else { continue };
            let Some(location) = coord.to_client(Point::new(x, y)) else { continue };
            nodes.push(point_glyph(p, location, 1.0));

            let radius = AesScaling::shape_size(p, 1.0) / 2.0;
            let params = TooltipParams {
                fill_color: Some(p.fill()),
                marker_colors: marker_colors(p, p.shape().is_filled()),
                ..TooltipParams::default()
            };
            targets.add_point(p.index(), location, radius, params, TipKind::VerticalTooltip);
        }
        nodes
    }
}
