//! Legend key glyphs of each geom.

use super::glyph::{fill_style, line_style, point_glyph, AesScaling};
use crate::geometry::{Point, Rect, Segment};
use crate::grammar::{Aes, DataPoint};
use crate::render::SceneNode;

/// Draws the key of one legend break in a `size` box at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegendKeyFactory {
    /// Filled rectangle (bars, areas).
    Rect,
    /// Point glyph widened by `fatten`.
    Point {
        /// Glyph size multiplier.
        fatten: f64,
    },
    /// Horizontal line (paths).
    HLine,
    /// Vertical line (line ranges).
    VLine,
    /// Vertical line with a point glyph (point ranges).
    PointRange {
        /// Glyph size multiplier.
        fatten: f64,
    },
    /// Box with a midline (cross bars).
    CrossBar {
        /// Midline width multiplier.
        fatten: f64,
    },
    /// Capped bar (error bars).
    ErrorBar,
}

impl LegendKeyFactory {
    /// Key element for `p` drawn in a box of `size`.
    #[must_use]
    pub fn create(&self, p: &DataPoint, size: Point) -> SceneNode {
        let sw = AesScaling::stroke_width(p);
        let children = match *self {
            Self::Rect => vec![SceneNode::rect(inset(size, sw), fill_style(p))],
            Self::Point { fatten } => {
                vec![point_glyph(p, Point::new(size.x / 2.0, size.y / 2.0), fatten)]
            }
            Self::HLine => vec![SceneNode::line(
                Point::new(0.0, size.y / 2.0),
                Point::new(size.x, size.y / 2.0),
                line_style(p),
            )],
            Self::VLine => vec![vline(p, size)],
            Self::PointRange { fatten } => vec![
                vline(p, size),
                point_glyph(p, Point::new(size.x / 2.0, size.y / 2.0), fatten),
            ],
            Self::CrossBar { fatten } => {
                let mut mid = line_style(p);
                mid.stroke_width *= fatten;
                vec![
                    SceneNode::rect(inset(size, sw), fill_style(p)),
                    SceneNode::line(Point::new(sw / 2.0, size.y / 2.0), Point::new(size.x - sw / 2.0, size.y / 2.0), mid),
                ]
            }
            Self::ErrorBar => {
                let width = p.number(Aes::Width).unwrap_or(0.9) * (size.x - sw);
                let height = size.y - sw;
                let rect = Rect::new((size.x - width) / 2.0, sw / 2.0, width, height);
                error_bar_segments(rect)
                    .into_iter()
                    .map(|s| SceneNode::line(s.start, s.end, line_style(p)))
                    .collect()
            }
        };
        SceneNode::group(children)
    }

    /// Smallest key box that shows `p` without clipping.
    #[must_use]
    pub fn minimum_key_size(&self, p: &DataPoint) -> Point {
        let side = match *self {
            Self::Point { fatten } | Self::PointRange { fatten } => {
                AesScaling::shape_size(p, fatten) + 2.0 * AesScaling::shape_stroke_width(p) + 2.0
            }
            _ => 2.0 * AesScaling::stroke_width(p) + 4.0,
        };
        Point::new(side, side)
    }
}

fn inset(size: Point, stroke_width: f64) -> Rect {
    let half = stroke_width / 2.0;
    Rect::new(half, half, (size.x - stroke_width).max(0.0), (size.y - stroke_width).max(0.0))
}

fn vline(p: &DataPoint, size: Point) -> SceneNode {
    SceneNode::line(Point::new(size.x / 2.0, 0.0), Point::new(size.x / 2.0, size.y), line_style(p))
}

/// Top cap, bottom cap and the connector through the middle.
pub(crate) fn error_bar_segments(r: Rect) -> [Segment; 3] {
    let center = r.left() + r.width / 2.0;
    [
        Segment::from_coords(r.left(), r.top(), r.right(), r.top()),
        Segment::from_coords(r.left(), r.bottom(), r.right(), r.bottom()),
        Segment::from_coords(center, r.top(), center, r.bottom()),
    ]
}
