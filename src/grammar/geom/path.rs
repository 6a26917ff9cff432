use super::glyph::line_style;
use super::{marker_colors, with_defined, Geom, GeomContext, GeomKind, LegendKeyFactory};
use crate::geometry::Point;
use crate::grammar::{Aes, Aesthetics, CoordinateSystem, DataPoint};
use crate::render::SceneNode;
use crate::tooltip::{GeomTargetCollector, PathPoint, TipKind, TooltipParams};

/// Polyline per group, in row order (path) or sorted by x (line).
#[derive(Debug, Clone, Copy)]
pub struct PathGeom {
    sort_by_x: bool,
}

impl PathGeom {
    /// Connect points in row order.
    #[must_use]
    pub const fn path() -> Self {
        Self { sort_by_x: false }
    }

    /// Connect points in x order.
    #[must_use]
    pub const fn line() -> Self {
        Self { sort_by_x: true }
    }
}

impl Geom for PathGeom {
    fn kind(&self) -> GeomKind {
        if self.sort_by_x {
            GeomKind::Line
        } else {
            GeomKind::Path
        }
    }

    fn required_aes(&self) -> Vec<Aes> {
        vec![Aes::X, Aes::Y]
    }

    fn handles_groups(&self) -> bool {
        true
    }

    fn legend_key(&self) -> LegendKeyFactory {
        LegendKeyFactory::HLine
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
            if self.sort_by_x {
                group.sort_by(|a, b| a.x().unwrap_or(0.0).total_cmp(&b.x().unwrap_or(0.0)));
            }
            let path = client_path(&group, coord);
            let Some(first) = group.first() else { continue };
            if path.len() >= 2 {
                let points = path.iter().map(|pp| pp.point).collect();
                nodes.push(SceneNode::polyline(points, line_style(first)));
            }
            let params = TooltipParams {
                marker_colors: marker_colors(first, false),
                ..TooltipParams::default()
            };
            targets.add_path(path, params, tip_kind);
        }
        nodes
    }
}

fn client_path(group: &[&DataPoint], coord: &dyn CoordinateSystem) -> Vec<PathPoint> {
    group
        .iter()
        .filter_map(|p| {
            let point = coord.to_client(Point::new(p.x()?, p.y()?))?;
            Some(PathPoint { point, index: p.index() })
        })
        .collect()
}
