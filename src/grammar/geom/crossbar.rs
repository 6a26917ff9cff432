use super::glyph::{fill_style, line_style};
use super::{marker_colors, with_defined, FlippableGeomHelper, Geom, GeomContext, GeomKind, LegendKeyFactory};
use crate::geometry::{Point, Rect};
use crate::grammar::{Aes, Aesthetics, AestheticsDefaults, CoordinateSystem, DataPoint};
use crate::render::SceneNode;
use crate::tooltip::GeomTargetCollector;

/// Midline width multiplier of cross bars.
pub const DEF_FATTEN_MIDLINE: f64 = 2.5;

/// Box from `ymin` to `ymax` with a thick midline at `y`.
#[derive(Debug, Clone, Copy)]
pub struct CrossBarGeom {
    flip: FlippableGeomHelper,
    fatten_midline: f64,
}

impl CrossBarGeom {
    /// Vertical (`true`) or horizontal cross bar.
    #[must_use]
    pub fn new(is_vertical: bool) -> Self {
        Self { flip: FlippableGeomHelper::new(is_vertical), fatten_midline: DEF_FATTEN_MIDLINE }
    }

    /// Set the midline width multiplier.
    #[must_use]
    pub fn fatten_midline(mut self, fatten: f64) -> Self {
        self.fatten_midline = fatten;
        self
    }

    /// Box in the vertical frame.
    fn box_rect(&self, p: &DataPoint, ctx: &GeomContext) -> Option<Rect> {
        let f = self.flip;
        let x = p.number(f.effective_aes(Aes::X))?;
        let ymin = p.number(f.effective_aes(Aes::YMin))?;
        let ymax = p.number(f.effective_aes(Aes::YMax))?;
        let width = p.number(f.effective_aes(Aes::Width))? * f.resolution(ctx);
        Some(Rect::new(x - width / 2.0, ymin, width, ymax - ymin))
    }

    /// Zero-height hint rectangle at the middle, in the vertical frame.
    fn hint_rect(&self, p: &DataPoint, ctx: &GeomContext) -> Option<Rect> {
        let f = self.flip;
        let x = p.number(f.effective_aes(Aes::X))?;
        let y = p.number(f.effective_aes(Aes::Y))?;
        let width = p.number(f.effective_aes(Aes::Width))? * f.resolution(ctx);
        Some(Rect::new(x - width / 2.0, y, width, 0.0))
    }
}

impl Geom for CrossBarGeom {
    fn kind(&self) -> GeomKind {
        GeomKind::CrossBar
    }

    fn defaults(&self) -> AestheticsDefaults {
        AestheticsDefaults::cross_bar()
    }

    fn required_aes(&self) -> Vec<Aes> {
        [Aes::X, Aes::YMin, Aes::YMax].map(|a| self.flip.effective_aes(a)).to_vec()
    }

    fn legend_key(&self) -> LegendKeyFactory {
        LegendKeyFactory::CrossBar { fatten: self.fatten_midline }
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
            if let Some(client) = self.box_rect(p, ctx).and_then(|r| f.to_client_rect(coord, r)) {
                nodes.push(SceneNode::rect(client, fill_style(p)));
            }

            if let Some(hint) = self.hint_rect(p, ctx) {
                let start = f.to_client(coord, hint.origin());
                let end = f.to_client(coord, Point::new(hint.right(), hint.y));
                if let (Some(start), Some(end)) = (start, end) {
                    let mut style = line_style(p);
                    style.stroke_width *= self.fatten_midline;
                    nodes.push(SceneNode::line(start, end, style));
                }
                if let Some(client) = f.to_client_rect(coord, hint) {
                    f.add_target(targets, p, &[Aes::YMin, Aes::YMax], client, f.object_radius(ctx, client), coord, ctx, marker_colors(p, true));
                }
            }
        }
        nodes
    }
}
