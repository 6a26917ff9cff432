//! Pixel sizes derived from aesthetics, and point glyphs.

use crate::color::Rgba;
use crate::geometry::Point;
use crate::grammar::{DataPoint, PointShape};
use crate::render::{SceneNode, Style};

/// Pixels per unit of the size and stroke aesthetics.
pub const UNIT_SHAPE_SIZE: f64 = 2.2;

/// Conversions from aesthetic units to pixels.
#[derive(Debug, Clone, Copy)]
pub struct AesScaling;

impl AesScaling {
    /// Stroke width of lines and outlines.
    #[must_use]
    pub fn stroke_width(p: &DataPoint) -> f64 {
        p.size() * UNIT_SHAPE_SIZE
    }

    /// Diameter of a point glyph, widened by `fatten`.
    #[must_use]
    pub fn shape_size(p: &DataPoint, fatten: f64) -> f64 {
        p.size() * UNIT_SHAPE_SIZE * fatten
    }

    /// Outline width of a point glyph; solid glyphs have none.
    #[must_use]
    pub fn shape_stroke_width(p: &DataPoint) -> f64 {
        if p.shape().is_solid() {
            0.0
        } else {
            p.stroke() * UNIT_SHAPE_SIZE
        }
    }
}

/// Line style of a data point: color, width and dash pattern.
pub(crate) fn line_style(p: &DataPoint) -> Style {
    let width = AesScaling::stroke_width(p);
    Style::stroked(p.color(), width).dash(p.line_type().dash_array(width))
}

/// Fill style of a data point, outlined when the color is visible.
pub(crate) fn fill_style(p: &DataPoint) -> Style {
    let style = Style::filled(p.fill());
    let color = p.color();
    if color.a == 0 {
        style
    } else {
        style.stroke(color, AesScaling::stroke_width(p)).dash(p.line_type().dash_array(AesScaling::stroke_width(p)))
    }
}

/// Point glyph of `p` centred at `center`.
pub(crate) fn point_glyph(p: &DataPoint, center: Point, fatten: f64) -> SceneNode {
    let shape = p.shape();
    let r = AesScaling::shape_size(p, fatten) / 2.0;
    let stroke = AesScaling::shape_stroke_width(p);
    let style = glyph_style(shape, p.color(), p.fill(), stroke);
    let at = |dx: f64, dy: f64| Point::new(center.x + dx * r, center.y + dy * r);

    match shape {
        PointShape::CircleOpen | PointShape::CircleSolid | PointShape::CircleFilled => {
            SceneNode::circle(center, r, style)
        }
        PointShape::SquareOpen | PointShape::SquareSolid | PointShape::SquareFilled => {
            SceneNode::polygon(vec![at(-1.0, -1.0), at(1.0, -1.0), at(1.0, 1.0), at(-1.0, 1.0)], style)
        }
        PointShape::TriangleOpen | PointShape::TriangleSolid | PointShape::TriangleFilled => {
            SceneNode::polygon(vec![at(0.0, -1.0), at(1.0, 0.75), at(-1.0, 0.75)], style)
        }
        PointShape::DiamondOpen | PointShape::DiamondSolid | PointShape::DiamondFilled => {
            SceneNode::polygon(vec![at(0.0, -1.0), at(1.0, 0.0), at(0.0, 1.0), at(-1.0, 0.0)], style)
        }
        PointShape::Plus => SceneNode::group(vec![
            SceneNode::line(at(-1.0, 0.0), at(1.0, 0.0), style.clone()),
            SceneNode::line(at(0.0, -1.0), at(0.0, 1.0), style),
        ]),
        PointShape::Cross => {
            let k = std::f64::consts::FRAC_1_SQRT_2;
            SceneNode::group(vec![
                SceneNode::line(at(-k, -k), at(k, k), style.clone()),
                SceneNode::line(at(-k, k), at(k, -k), style),
            ])
        }
    }
}

fn glyph_style(shape: PointShape, color: Rgba, fill: Rgba, stroke: f64) -> Style {
    if shape.is_solid() {
        Style::filled(color)
    } else if shape.is_filled() {
        Style::filled(fill).stroke(color, stroke)
    } else {
        // open glyphs and line glyphs
        Style::stroked(color, stroke.max(1.0))
    }
}
