//! Legends and colorbars.
//!
//! A [`LegendAssembler`] merges the breaks of every layer sharing a legend
//! title into one key per label and lays the keys out on a grid. A
//! [`ColorBarAssembler`] draws a binned gradient for a continuous color
//! scale. Both produce specs that know their size and render to scene nodes.

mod assembler;
mod colorbar;
mod layout;
mod wrap;

pub use assembler::{key_sizes, LegendAssembler, LegendBreak, LegendOptions, LegendScaleContext, LegendSpec};
pub use colorbar::{ColorBarAssembler, ColorBarOptions, ColorBarSpec, DEF_NUM_BIN};
pub use layout::{grid_placements, GridShape, KeyPlacement, LegendBoxLayout};
pub use wrap::{wrap_label, DEF_LABEL_MAX_LENGTH, DEF_LABEL_MAX_LINES};

use crate::geometry::Point;
use crate::render::SceneNode;

/// Guide requested for a non-positional aesthetic.
#[derive(Debug, Clone, PartialEq)]
pub enum Guide {
    /// Discrete keys, even for a continuous color scale.
    Legend(LegendOptions),
    /// Gradient bar; only continuous color scales draw one.
    ColorBar(ColorBarOptions),
    /// No guide.
    None,
}

/// A laid-out legend of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum LegendInfo {
    /// Keys for discrete breaks.
    Legend(LegendSpec),
    /// Gradient for a continuous color scale.
    ColorBar(ColorBarSpec),
}

impl LegendInfo {
    /// Legend title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Legend(l) => l.title(),
            Self::ColorBar(c) => c.title(),
        }
    }

    /// Size of the legend box.
    #[must_use]
    pub fn size(&self) -> Point {
        match self {
            Self::Legend(l) => l.size(),
            Self::ColorBar(c) => c.size(),
        }
    }

    /// Scene with the top-left corner at `origin`.
    #[must_use]
    pub fn to_scene(&self, origin: Point) -> SceneNode {
        match self {
            Self::Legend(l) => l.to_scene(origin),
            Self::ColorBar(c) => c.to_scene(origin),
        }
    }
}
