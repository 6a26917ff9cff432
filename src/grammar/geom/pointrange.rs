use super::glyph::{line_style, point_glyph, AesScaling};
use super::{marker_colors, with_defined, FlippableGeomHelper, Geom, GeomContext, GeomKind, LegendKeyFactory};
use crate::geometry::{Point, Rect};
use crate::grammar::{Aes, Aesthetics, AestheticsDefaults, CoordinateSystem};
use crate::render::SceneNode;
use crate::tooltip::GeomTargetCollector;

/// Point size multiplier of point ranges.
pub const DEF_FATTEN: f64 = 5.0;

/// Line from `ymin` to `ymax` with a point at `y`.
#[derive(Debug, Clone, Copy)]
pub struct PointRangeGeom {
    flip: FlippableGeomHelper,
    fatten: f64,
}

impl PointRangeGeom {
    /// Vertical (`true`) or horizontal point range.
    #[must_use]
    pub fn new(is_vertical: bool) -> Self {
        Self { flip: FlippableGeomHelper::new(is_vertical), fatten: DEF_FATTEN }
    }

    /// Set the point size multiplier.
    #[must_use]
    pub fn fatten(mut self, fatten: f64) -> Self {
        self.fatten = fatten;
        self
    }
}

impl Geom for PointRangeGeom {
    fn kind(&self) -> GeomKind {
        GeomKind::PointRange
    }

    fn defaults(&self) -> AestheticsDefaults {
        AestheticsDefaults::point_range()
    }

    fn required_aes(&self) -> Vec<Aes> {
        [Aes::X, Aes::Y, Aes::YMin, Aes::YMax].map(|a| self.flip.effective_aes(a)).to_vec()
    }

    fn legend_key(&self) -> LegendKeyFactory {
        LegendKeyFactory::PointRange { fatten: self.fatten }
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
                p.number(f.effective_aes(Aes::Y)),
                p.number(f.effective_aes(Aes::YMin)),
                p.number(f.effective_aes(Aes::YMax)),
            );
            let (Some(x), Some(y), Some(ymin), Some(ymax)) = values else { continue };

            if let (Some(start), Some(end)) =
                (f.to_client(coord, Point::new(x, ymin)), f.to_client(coord, Point::new(x, ymax)))
            {
                nodes.push(SceneNode::line(start, end, line_style(p)));
            }

            let Some(location) = f.to_client(coord, Point::new(x, y)) else { continue };
            nodes.push(point_glyph(p, location, self.fatten));

            let extent = AesScaling::shape_size(p, self.fatten) + AesScaling::shape_stroke_width(p);
            let need_to_flip = if f.is_vertical() { ctx.is_flipped() } else { !ctx.is_flipped() };
            let target = if need_to_flip {
                Rect::new(location.x, location.y - extent / 2.0, 0.0, extent)
            } else {
                Rect::new(location.x - extent / 2.0, location.y, extent, 0.0)
            };
            f.add_target(
                targets,
                p,
                &[Aes::YMin, Aes::YMax],
                target,
                f.object_radius(ctx, target),
                coord,
                ctx,
                marker_colors(p, p.shape().is_filled()),
            );
        }
        nodes
    }
}
