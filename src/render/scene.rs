//! Immutable scene graph produced by the assembly pipeline.

use crate::color::Rgba;
use crate::geometry::{Point, Rect, Segment};

/// Paint and stroke attributes of a node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    /// Fill paint; `None` leaves the interior empty.
    pub fill: Option<Rgba>,
    /// Stroke paint; `None` draws no outline.
    pub stroke: Option<Rgba>,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Dash pattern in pixels.
    pub dash: Option<Vec<f64>>,
}

impl Style {
    /// Filled, no outline.
    #[must_use]
    pub fn filled(fill: Rgba) -> Self {
        Self { fill: Some(fill), ..Self::default() }
    }

    /// Outline only.
    #[must_use]
    pub fn stroked(stroke: Rgba, width: f64) -> Self {
        Self { stroke: Some(stroke), stroke_width: width, ..Self::default() }
    }

    /// Set the fill.
    #[must_use]
    pub fn fill(mut self, fill: Rgba) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Set the stroke.
    #[must_use]
    pub fn stroke(mut self, stroke: Rgba, width: f64) -> Self {
        self.stroke = Some(stroke);
        self.stroke_width = width;
        self
    }

    /// Set the dash pattern.
    #[must_use]
    pub fn dash(mut self, dash: Option<Vec<f64>>) -> Self {
        self.dash = dash;
        self
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// Align text start at position (left-aligned for LTR)
    #[default]
    Start,
    /// Center text at position
    Middle,
    /// Align text end at position (right-aligned for LTR)
    End,
}

/// A text label.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    /// Baseline anchor point of the first line.
    pub position: Point,
    /// Content; `\n` separates lines.
    pub text: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Text paint.
    pub color: Rgba,
    /// Alignment relative to `position`.
    pub anchor: TextAnchor,
    /// Clockwise rotation in degrees around `position`.
    pub rotation: f64,
}

impl TextNode {
    /// Unrotated, start-anchored text.
    #[must_use]
    pub fn new(position: Point, text: impl Into<String>, font_size: f64, color: Rgba) -> Self {
        Self { position, text: text.into(), font_size, color, anchor: TextAnchor::Start, rotation: 0.0 }
    }

    /// Set the anchor.
    #[must_use]
    pub fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the rotation.
    #[must_use]
    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }
}

/// A node of the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    /// Children drawn in order, shifted by `offset`.
    Group {
        /// Identifier, used as a class name by encoders.
        id: Option<String>,
        /// Translation applied to every child.
        offset: Point,
        /// Child nodes.
        children: Vec<SceneNode>,
    },
    /// Straight line.
    Line {
        /// Endpoints.
        segment: Segment,
        /// Stroke attributes.
        style: Style,
    },
    /// Axis-aligned rectangle.
    Rect {
        /// Bounds.
        rect: Rect,
        /// Paint.
        style: Style,
    },
    /// Circle.
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
        /// Paint.
        style: Style,
    },
    /// Polyline or polygon.
    Path {
        /// Vertices.
        points: Vec<Point>,
        /// Whether the last vertex joins the first.
        closed: bool,
        /// Paint.
        style: Style,
    },
    /// Text label.
    Text(TextNode),
    /// Embedded raster image.
    Image {
        /// Bounds.
        rect: Rect,
        /// Media type, e.g. `image/png`.
        mime: String,
        /// Encoded image bytes.
        bytes: Vec<u8>,
    },
}

impl SceneNode {
    /// Untranslated group.
    #[must_use]
    pub fn group(children: Vec<SceneNode>) -> Self {
        Self::Group { id: None, offset: Point::ORIGIN, children }
    }

    /// Named, translated group.
    #[must_use]
    pub fn named_group(id: impl Into<String>, offset: Point, children: Vec<SceneNode>) -> Self {
        Self::Group { id: Some(id.into()), offset, children }
    }

    /// Line node.
    #[must_use]
    pub fn line(start: Point, end: Point, style: Style) -> Self {
        Self::Line { segment: Segment::new(start, end), style }
    }

    /// Rectangle node.
    #[must_use]
    pub fn rect(rect: Rect, style: Style) -> Self {
        Self::Rect { rect, style }
    }

    /// Circle node.
    #[must_use]
    pub fn circle(center: Point, radius: f64, style: Style) -> Self {
        Self::Circle { center, radius, style }
    }

    /// Open polyline.
    #[must_use]
    pub fn polyline(points: Vec<Point>, style: Style) -> Self {
        Self::Path { points, closed: false, style }
    }

    /// Closed polygon.
    #[must_use]
    pub fn polygon(points: Vec<Point>, style: Style) -> Self {
        Self::Path { points, closed: true, style }
    }

    /// Text node.
    #[must_use]
    pub fn text(text: TextNode) -> Self {
        Self::Text(text)
    }

    /// Group identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Group { id, .. } => id.as_deref(),
            _ => None,
        }
    }

    /// Direct children (empty for leaves).
    #[must_use]
    pub fn children(&self) -> &[SceneNode] {
        match self {
            Self::Group { children, .. } => children,
            _ => &[],
        }
    }

    /// This node and all descendants, depth first.
    #[must_use]
    pub fn descendants(&self) -> Vec<&SceneNode> {
        let mut out = vec![self];
        let mut i = 0;
        while i < out.len() {
            let node = out[i];
            out.extend(node.children());
            i += 1;
        }
        out
    }

    /// First group with `id`, searching depth first.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&SceneNode> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    /// Number of leaf nodes.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Group { children, .. } => children.iter().map(SceneNode::leaf_count).sum(),
            _ => 1,
        }
    }
}
