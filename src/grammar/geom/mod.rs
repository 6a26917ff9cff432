//! Geometry layers for Grammar of Graphics.
//!
//! A [`Geom`] turns the resolved aesthetics of a layer into scene nodes and
//! registers tooltip targets for them. Rows with an undefined required
//! aesthetic are skipped for both.

mod area;
mod bar;
mod crossbar;
mod errorbar;
mod flip;
mod glyph;
mod legend_key;
mod linerange;
mod path;
mod point;
mod pointrange;

pub use area::AreaGeom;
pub use bar::BarGeom;
pub use crossbar::CrossBarGeom;
pub use errorbar::ErrorBarGeom;
pub use flip::FlippableGeomHelper;
pub use glyph::{AesScaling, UNIT_SHAPE_SIZE};
pub use legend_key::LegendKeyFactory;
pub use linerange::LineRangeGeom;
pub use path::PathGeom;
pub use point::PointGeom;
pub use pointrange::PointRangeGeom;

use super::aes::Aes;
use super::aesthetics::{Aesthetics, AestheticsDefaults, DataPoint};
use super::coord::CoordinateSystem;
use super::position::PositionAdjustment;
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::render::SceneNode;
use crate::tooltip::GeomTargetCollector;
use std::fmt::{self, Debug};

/// Layer-wide rendering context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeomContext {
    flipped: bool,
    x_resolution: f64,
    y_resolution: f64,
}

impl GeomContext {
    /// Context of a plain (`false`) or flipped plot, unit resolutions.
    #[must_use]
    pub fn new(flipped: bool) -> Self {
        Self { flipped, x_resolution: 1.0, y_resolution: 1.0 }
    }

    /// Set the data resolutions along X and Y.
    #[must_use]
    pub fn with_resolution(mut self, x: f64, y: f64) -> Self {
        self.x_resolution = x;
        self.y_resolution = y;
        self
    }

    /// Whether the plot draws X vertically.
    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Smallest data step along the axis of `aes`.
    #[must_use]
    pub fn resolution(&self, aes: Aes) -> f64 {
        if aes.is_positional_x() {
            self.x_resolution
        } else {
            self.y_resolution
        }
    }
}

/// A renderable layer type.
pub trait Geom: Debug + Send + Sync {
    /// Kind of this geom.
    fn kind(&self) -> GeomKind;

    /// Values of channels neither mapped nor set as constants.
    fn defaults(&self) -> AestheticsDefaults {
        AestheticsDefaults::base()
    }

    /// Aesthetics a row needs to be drawn.
    fn required_aes(&self) -> Vec<Aes>;

    /// Whether rows are drawn per group (paths, areas).
    fn handles_groups(&self) -> bool {
        false
    }

    /// Legend key glyph.
    fn legend_key(&self) -> LegendKeyFactory;

    /// Scene nodes of the layer in client coordinates; tooltip targets go to
    /// `targets`.
    fn build(
        &self,
        aesthetics: &Aesthetics,
        coord: &dyn CoordinateSystem,
        ctx: &GeomContext,
        targets: &mut GeomTargetCollector,
    ) -> Vec<SceneNode>;
}

/// Names of the available geoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeomKind {
    /// Points.
    Point,
    /// Lines connecting points in row order.
    Path,
    /// Lines connecting points in x order.
    Line,
    /// Bars.
    Bar,
    /// Area under a line.
    Area,
    /// Box with a midline.
    CrossBar,
    /// Capped interval.
    ErrorBar,
    /// Plain interval.
    LineRange,
    /// Interval with a point.
    PointRange,
}

impl GeomKind {
    /// Parse a geom name as used in plot specifications.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for an unknown name.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name.trim().to_ascii_lowercase().as_str() {
            "point" => Self::Point,
            "path" => Self::Path,
            "line" => Self::Line,
            "bar" | "col" | "histogram" => Self::Bar,
            "area" => Self::Area,
            "crossbar" => Self::CrossBar,
            "errorbar" => Self::ErrorBar,
            "linerange" => Self::LineRange,
            "pointrange" => Self::PointRange,
            other => return Err(Error::InvalidSpec(format!("unknown geom '{other}'"))),
        })
    }

    /// Name of the geom.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Path => "path",
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Area => "area",
            Self::CrossBar => "crossbar",
            Self::ErrorBar => "errorbar",
            Self::LineRange => "linerange",
            Self::PointRange => "pointrange",
        }
    }

    /// Whether the geom has a horizontal variant.
    #[must_use]
    pub const fn is_flippable(self) -> bool {
        matches!(self, Self::CrossBar | Self::ErrorBar | Self::LineRange | Self::PointRange)
    }

    /// Stat used when a layer names none.
    #[must_use]
    pub const fn default_stat(self) -> &'static str {
        match self {
            Self::Bar => "count",
            _ => "identity",
        }
    }

    /// Position adjustment used when a layer names none.
    #[must_use]
    pub fn default_position(self) -> PositionAdjustment {
        match self {
            Self::Bar | Self::Area => PositionAdjustment::Stack,
            _ => PositionAdjustment::Identity,
        }
    }

    /// Geom of this kind. `is_vertical` picks the variant of range geoms
    /// and is ignored by the others.
    #[must_use]
    pub fn create(self, is_vertical: bool) -> Box<dyn Geom> {
        match self {
            Self::Point => Box::new(PointGeom),
            Self::Path => Box::new(PathGeom::path()),
            Self::Line => Box::new(PathGeom::line()),
            Self::Bar => Box::new(BarGeom),
            Self::Area => Box::new(AreaGeom),
            Self::CrossBar => Box::new(CrossBarGeom::new(is_vertical)),
            Self::ErrorBar => Box::new(ErrorBarGeom::new(is_vertical)),
            Self::LineRange => Box::new(LineRangeGeom::new(is_vertical)),
            Self::PointRange => Box::new(PointRangeGeom::new(is_vertical)),
        }
    }
}

impl fmt::Display for GeomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Points with every aesthetic of `required` defined; logs how many were dropped.
pub(crate) fn with_defined<'a>(kind: GeomKind, aesthetics: &'a Aesthetics, required: &[Aes]) -> Vec<&'a DataPoint> {
    let defined: Vec<&DataPoint> = aesthetics.points().iter().filter(|p| p.all_defined(required)).collect();
    let skipped = aesthetics.len() - defined.len();
    if skipped > 0 {
        log::warn!("geom_{kind}: removed {skipped} rows containing missing values");
    }
    defined
}

/// Tooltip marker swatch: the fill for filled geoms, the stroke otherwise.
pub(crate) fn marker_colors(p: &DataPoint, filled: bool) -> Vec<Rgba> {
    let c = if filled { p.fill() } else { p.color() };
    if c.a == 0 {
        Vec::new()
    } else {
        vec![c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geom_kind_names() {
        for kind in [
            GeomKind::Point,
            GeomKind::Path,
            GeomKind::Line,
            GeomKind::Bar,
            GeomKind::Area,
            GeomKind::CrossBar,
            GeomKind::ErrorBar,
            GeomKind::LineRange,
            GeomKind::PointRange,
        ] {
            assert_eq!(GeomKind::from_name(kind.name()).unwrap(), kind);
            assert_eq!(kind.create(true).kind(), kind);
        }
        assert!(matches!(GeomKind::from_name("violin"), Err(Error::InvalidSpec(_))));
    }

    #[test]
    fn test_defaults_per_kind() {
        assert_eq!(GeomKind::Bar.default_stat(), "count");
        assert_eq!(GeomKind::Point.default_stat(), "identity");
        assert_eq!(GeomKind::Bar.default_position(), PositionAdjustment::Stack);
        assert!(GeomKind::ErrorBar.is_flippable());
        assert!(!GeomKind::Bar.is_flippable());
    }

    #[test]
    fn test_context_resolution() {
        let ctx = GeomContext::new(false).with_resolution(0.5, 3.0);
        assert_eq!(ctx.resolution(Aes::XMin), 0.5);
        assert_eq!(ctx.resolution(Aes::YMax), 3.0);
    }

    #[test]
    fn test_with_defined_skips_rows() {
        let aes = Aesthetics::new(vec![
            DataPoint::new(0).with(Aes::X, 1.0).with(Aes::Y, 2.0),
            DataPoint::new(1).with(Aes::X, 1.0).with(Aes::Y, f64::NAN),
            DataPoint::new(2).with(Aes::X, 1.0),
        ]);
        let kept = with_defined(GeomKind::Point, &aes, &[Aes::X, Aes::Y]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].index(), 0);
    }
}
