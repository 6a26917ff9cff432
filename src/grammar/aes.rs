//! Aesthetic channels, their values, and layer mappings.

use crate::color::Rgba;
use std::collections::BTreeMap;
use std::fmt;

/// A typed visual channel data can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Aes {
    X,
    Y,
    XMin,
    XMax,
    YMin,
    YMax,
    Lower,
    Middle,
    Upper,
    Color,
    Fill,
    Alpha,
    Shape,
    LineType,
    Size,
    Stroke,
    Width,
    Height,
    Label,
    Weight,
    Slice,
    Group,
}

/// Value type carried by an aesthetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesKind {
    /// Number (position, size, alpha...).
    Numeric,
    /// Paint.
    Color,
    /// Point glyph.
    Shape,
    /// Stroke dash pattern.
    LineType,
    /// Free text.
    Text,
}

impl Aes {
    /// Every aesthetic, in declaration order.
    pub const ALL: [Aes; 22] = [
        Aes::X,
        Aes::Y,
        Aes::XMin,
        Aes::XMax,
        Aes::YMin,
        Aes::YMax,
        Aes::Lower,
        Aes::Middle,
        Aes::Upper,
        Aes::Color,
        Aes::Fill,
        Aes::Alpha,
        Aes::Shape,
        Aes::LineType,
        Aes::Size,
        Aes::Stroke,
        Aes::Width,
        Aes::Height,
        Aes::Label,
        Aes::Weight,
        Aes::Slice,
        Aes::Group,
    ];

    /// Name used in plot specifications.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Aes::X => "x",
            Aes::Y => "y",
            Aes::XMin => "xmin",
            Aes::XMax => "xmax",
            Aes::YMin => "ymin",
            Aes::YMax => "ymax",
            Aes::Lower => "lower",
            Aes::Middle => "middle",
            Aes::Upper => "upper",
            Aes::Color => "color",
            Aes::Fill => "fill",
            Aes::Alpha => "alpha",
            Aes::Shape => "shape",
            Aes::LineType => "linetype",
            Aes::Size => "size",
            Aes::Stroke => "stroke",
            Aes::Width => "width",
            Aes::Height => "height",
            Aes::Label => "label",
            Aes::Weight => "weight",
            Aes::Slice => "slice",
            Aes::Group => "group",
        }
    }

    /// Parse an aesthetic name (`colour` and `col` accepted for color).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Aes> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "colour" | "col" => Some(Aes::Color),
            _ => Aes::ALL.into_iter().find(|a| a.name() == name),
        }
    }

    /// Value type.
    #[must_use]
    pub const fn kind(self) -> AesKind {
        match self {
            Aes::Color | Aes::Fill => AesKind::Color,
            Aes::Shape => AesKind::Shape,
            Aes::LineType => AesKind::LineType,
            Aes::Label => AesKind::Text,
            _ => AesKind::Numeric,
        }
    }

    /// Horizontal position channel.
    #[must_use]
    pub const fn is_positional_x(self) -> bool {
        matches!(self, Aes::X | Aes::XMin | Aes::XMax)
    }

    /// Vertical position channel.
    #[must_use]
    pub const fn is_positional_y(self) -> bool {
        matches!(
            self,
            Aes::Y | Aes::YMin | Aes::YMax | Aes::Lower | Aes::Middle | Aes::Upper
        )
    }

    /// Either position channel.
    #[must_use]
    pub const fn is_positional(self) -> bool {
        self.is_positional_x() || self.is_positional_y()
    }

    /// Color or fill.
    #[must_use]
    pub const fn is_color(self) -> bool {
        matches!(self, Aes::Color | Aes::Fill)
    }

    /// Channels that never get a scale or a legend.
    #[must_use]
    pub const fn is_unscaled(self) -> bool {
        matches!(self, Aes::Label | Aes::Weight | Aes::Group | Aes::Slice)
    }
}

impl fmt::Display for Aes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Point glyphs, numbered as in ggplot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum PointShape {
    SquareOpen,
    CircleOpen,
    TriangleOpen,
    Plus,
    Cross,
    DiamondOpen,
    SquareSolid,
    #[default]
    CircleSolid,
    TriangleSolid,
    DiamondSolid,
    CircleFilled,
    SquareFilled,
    DiamondFilled,
    TriangleFilled,
}

impl PointShape {
    /// Glyph for a ggplot shape code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Self::SquareOpen,
            1 => Self::CircleOpen,
            2 => Self::TriangleOpen,
            3 => Self::Plus,
            4 => Self::Cross,
            5 => Self::DiamondOpen,
            15 => Self::SquareSolid,
            16 | 19 | 20 => Self::CircleSolid,
            17 => Self::TriangleSolid,
            18 => Self::DiamondSolid,
            21 => Self::CircleFilled,
            22 => Self::SquareFilled,
            23 => Self::DiamondFilled,
            24 => Self::TriangleFilled,
            _ => return None,
        })
    }

    /// Interior painted with the color aesthetic.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(
            self,
            Self::SquareSolid | Self::CircleSolid | Self::TriangleSolid | Self::DiamondSolid
        )
    }

    /// Interior painted with the fill aesthetic.
    #[must_use]
    pub const fn is_filled(self) -> bool {
        matches!(
            self,
            Self::CircleFilled | Self::SquareFilled | Self::DiamondFilled | Self::TriangleFilled
        )
    }

    /// Palette used for discrete shape scales.
    pub const PALETTE: [PointShape; 6] = [
        PointShape::CircleSolid,
        PointShape::TriangleSolid,
        PointShape::SquareSolid,
        PointShape::Plus,
        PointShape::CircleOpen,
        PointShape::DiamondSolid,
    ];
}

/// Stroke dash patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DotDash,
    LongDash,
    TwoDash,
    Blank,
}

impl LineType {
    /// Parse a line type by name or ggplot code.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.trim().to_ascii_lowercase().as_str() {
            "solid" | "1" => Self::Solid,
            "dashed" | "2" => Self::Dashed,
            "dotted" | "3" => Self::Dotted,
            "dotdash" | "4" => Self::DotDash,
            "longdash" | "5" => Self::LongDash,
            "twodash" | "6" => Self::TwoDash,
            "blank" | "0" => Self::Blank,
            _ => return None,
        })
    }

    /// Dash lengths scaled by the stroke width; `None` for solid lines.
    #[must_use]
    pub fn dash_array(self, stroke_width: f64) -> Option<Vec<f64>> {
        let w = stroke_width.max(1.0);
        let pattern: &[f64] = match self {
            Self::Solid | Self::Blank => return None,
            Self::Dashed => &[4.3, 4.3],
            Self::Dotted => &[1.0, 2.2],
            Self::DotDash => &[1.0, 2.2, 4.3, 2.2],
            Self::LongDash => &[8.6, 4.3],
            Self::TwoDash => &[4.3, 2.2, 8.6, 2.2],
        };
        Some(pattern.iter().map(|d| d * w).collect())
    }

    /// Palette used for discrete line type scales.
    pub const PALETTE: [LineType; 6] = [
        LineType::Solid,
        LineType::Dashed,
        LineType::Dotted,
        LineType::DotDash,
        LineType::LongDash,
        LineType::TwoDash,
    ];
}

/// Resolved value of one aesthetic for one data point.
#[derive(Debug, Clone, PartialEq)]
pub enum AesValue {
    /// A number.
    Number(f64),
    /// A paint.
    Color(Rgba),
    /// A point glyph.
    Shape(PointShape),
    /// A dash pattern.
    LineType(LineType),
    /// Free text.
    Text(String),
}

impl AesValue {
    /// Numeric value, if any.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AesValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Paint, if any.
    #[must_use]
    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            AesValue::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<f64> for AesValue {
    fn from(v: f64) -> Self {
        AesValue::Number(v)
    }
}

impl From<Rgba> for AesValue {
    fn from(c: Rgba) -> Self {
        AesValue::Color(c)
    }
}

impl From<PointShape> for AesValue {
    fn from(s: PointShape) -> Self {
        AesValue::Shape(s)
    }
}

impl From<LineType> for AesValue {
    fn from(l: LineType) -> Self {
        AesValue::LineType(l)
    }
}

/// Aesthetic-to-column mapping of a plot or a layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    columns: BTreeMap<Aes, String>,
}

impl Mapping {
    /// Empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an aesthetic to a column (or a stat variable such as `..count..`).
    #[must_use]
    pub fn map(mut self, aes: Aes, column: &str) -> Self {
        self.columns.insert(aes, column.to_string());
        self
    }

    /// Map x position to a column.
    #[must_use]
    pub fn x(self, column: &str) -> Self {
        self.map(Aes::X, column)
    }

    /// Map y position to a column.
    #[must_use]
    pub fn y(self, column: &str) -> Self {
        self.map(Aes::Y, column)
    }

    /// Map color to a column.
    #[must_use]
    pub fn color(self, column: &str) -> Self {
        self.map(Aes::Color, column)
    }

    /// Map fill to a column.
    #[must_use]
    pub fn fill(self, column: &str) -> Self {
        self.map(Aes::Fill, column)
    }

    /// Map size to a column.
    #[must_use]
    pub fn size(self, column: &str) -> Self {
        self.map(Aes::Size, column)
    }

    /// Column mapped to an aesthetic.
    #[must_use]
    pub fn get(&self, aes: Aes) -> Option<&str> {
        self.columns.get(&aes).map(String::as_str)
    }

    /// Mapped aesthetics with their columns.
    pub fn iter(&self) -> impl Iterator<Item = (Aes, &str)> {
        self.columns.iter().map(|(a, c)| (*a, c.as_str()))
    }

    /// Merge with another mapping (other takes precedence).
    #[must_use]
    pub fn merge(mut self, other: &Mapping) -> Self {
        for (aes, column) in &other.columns {
            self.columns.insert(*aes, column.clone());
        }
        self
    }

    /// Nothing mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
