//! Per-point resolved aesthetics.
//!
//! After scales and mappers run, each row of a layer becomes a [`DataPoint`]:
//! positional channels hold transformed data values, every other channel holds
//! its visual value (a paint, a size, a glyph).

use super::aes::{Aes, AesValue, LineType, PointShape};
use crate::color::Rgba;
use crate::geometry::Span;
use std::collections::BTreeMap;

/// Resolved aesthetics of one data row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataPoint {
    index: usize,
    group: usize,
    values: BTreeMap<Aes, AesValue>,
}

impl DataPoint {
    /// Empty point for row `index`.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Set a value.
    #[must_use]
    pub fn with(mut self, aes: Aes, value: impl Into<AesValue>) -> Self {
        self.values.insert(aes, value.into());
        self
    }

    /// Set the group.
    #[must_use]
    pub fn with_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    /// Set a value in place.
    pub fn set(&mut self, aes: Aes, value: AesValue) {
        self.values.insert(aes, value);
    }

    /// Row index in the layer data.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Group index.
    #[must_use]
    pub fn group(&self) -> usize {
        self.group
    }

    /// Raw value of a channel.
    #[must_use]
    pub fn get(&self, aes: Aes) -> Option<&AesValue> {
        self.values.get(&aes)
    }

    /// Whether a channel has a value (finite, for numbers).
    #[must_use]
    pub fn defined(&self, aes: Aes) -> bool {
        match self.values.get(&aes) {
            Some(AesValue::Number(n)) => n.is_finite(),
            Some(_) => true,
            None => false,
        }
    }

    /// Whether all channels are defined.
    #[must_use]
    pub fn all_defined(&self, aes: &[Aes]) -> bool {
        aes.iter().all(|a| self.defined(*a))
    }

    /// Finite numeric value of a channel.
    #[must_use]
    pub fn number(&self, aes: Aes) -> Option<f64> {
        self.values
            .get(&aes)
            .and_then(AesValue::as_f64)
            .filter(|v| v.is_finite())
    }

    /// X position.
    #[must_use]
    pub fn x(&self) -> Option<f64> {
        self.number(Aes::X)
    }

    /// Y position.
    #[must_use]
    pub fn y(&self) -> Option<f64> {
        self.number(Aes::Y)
    }

    /// Stroke paint with the alpha channel applied.
    #[must_use]
    pub fn color(&self) -> Rgba {
        self.paint(Aes::Color, Rgba::BLACK)
    }

    /// Fill paint with the alpha channel applied.
    #[must_use]
    pub fn fill(&self) -> Rgba {
        self.paint(Aes::Fill, Rgba::GRAY)
    }

    fn paint(&self, aes: Aes, fallback: Rgba) -> Rgba {
        let c = self.values.get(&aes).and_then(AesValue::as_color).unwrap_or(fallback);
        match self.number(Aes::Alpha) {
            Some(alpha) if c.a == 255 => c.with_opacity(alpha),
            _ => c,
        }
    }

    /// Opacity.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.number(Aes::Alpha).unwrap_or(1.0)
    }

    /// Size.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.number(Aes::Size).unwrap_or(0.5)
    }

    /// Outline width of point glyphs.
    #[must_use]
    pub fn stroke(&self) -> f64 {
        self.number(Aes::Stroke).unwrap_or(0.5)
    }

    /// Point glyph.
    #[must_use]
    pub fn shape(&self) -> PointShape {
        match self.values.get(&Aes::Shape) {
            Some(AesValue::Shape(s)) => *s,
            _ => PointShape::default(),
        }
    }

    /// Dash pattern.
    #[must_use]
    pub fn line_type(&self) -> LineType {
        match self.values.get(&Aes::LineType) {
            Some(AesValue::LineType(l)) => *l,
            _ => LineType::default(),
        }
    }
}

/// Default values of a geom for channels neither mapped nor constant.
#[derive(Debug, Clone, PartialEq)]
pub struct AestheticsDefaults {
    values: BTreeMap<Aes, AesValue>,
}

impl AestheticsDefaults {
    /// Defaults shared by every geom.
    #[must_use]
    pub fn base() -> Self {
        let values = BTreeMap::from([
            (Aes::Color, AesValue::Color(Rgba::BLACK)),
            (Aes::Fill, AesValue::Color(Rgba::rgb(118, 118, 118))),
            (Aes::Alpha, AesValue::Number(1.0)),
            (Aes::Shape, AesValue::Shape(PointShape::CircleSolid)),
            (Aes::LineType, AesValue::LineType(LineType::Solid)),
            (Aes::Size, AesValue::Number(0.5)),
            (Aes::Stroke, AesValue::Number(0.5)),
            (Aes::Width, AesValue::Number(0.9)),
            (Aes::Height, AesValue::Number(0.9)),
        ]);
        Self { values }
    }

    /// Defaults for point glyphs.
    #[must_use]
    pub fn point() -> Self {
        Self::base().with(Aes::Size, 2.0)
    }

    /// Defaults for bars: no outline.
    #[must_use]
    pub fn bar() -> Self {
        Self::base().with(Aes::Color, Rgba::TRANSPARENT)
    }

    /// Defaults for ranges with a point (point range).
    #[must_use]
    pub fn point_range() -> Self {
        Self::base().with(Aes::Fill, Rgba::BLACK)
    }

    /// Defaults for boxes (cross bar): white fill.
    #[must_use]
    pub fn cross_bar() -> Self {
        Self::base().with(Aes::Fill, Rgba::WHITE)
    }

    /// Override one default.
    #[must_use]
    pub fn with(mut self, aes: Aes, value: impl Into<AesValue>) -> Self {
        self.values.insert(aes, value.into());
        self
    }

    /// Default for a channel.
    #[must_use]
    pub fn get(&self, aes: Aes) -> Option<&AesValue> {
        self.values.get(&aes)
    }

    /// Every default, in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (Aes, &AesValue)> {
        self.values.iter().map(|(aes, v)| (*aes, v))
    }
}

impl Default for AestheticsDefaults {
    fn default() -> Self {
        Self::base()
    }
}

/// All data points of a layer.
#[derive(Debug, Clone, Default)]
pub struct Aesthetics {
    points: Vec<DataPoint>,
}

impl Aesthetics {
    /// Wrap data points.
    #[must_use]
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self { points }
    }

    /// Data points in row order.
    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// No points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point for a row index.
    #[must_use]
    pub fn by_index(&self, index: usize) -> Option<&DataPoint> {
        self.points.iter().find(|p| p.index() == index)
    }

    /// Span of the finite values of a numeric channel.
    #[must_use]
    pub fn range(&self, aes: Aes) -> Option<Span> {
        Span::encloses(self.points.iter().filter_map(|p| p.number(aes)))
    }

    /// Smallest gap between distinct values of a channel, `na` if fewer than two.
    #[must_use]
    pub fn resolution(&self, aes: Aes, na: f64) -> f64 {
        let mut values: Vec<f64> = self.points.iter().filter_map(|p| p.number(aes)).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        values
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|d| *d > 0.0)
            .reduce(f64::min)
            .unwrap_or(na)
    }

    /// Points split by group, groups in order of first appearance.
    #[must_use]
    pub fn groups(&self) -> Vec<Vec<&DataPoint>> {
        let mut order: Vec<usize> = Vec::new();
        let mut by_group: BTreeMap<usize, Vec<&DataPoint>> = BTreeMap::new();
        for p in &self.points {
            if !by_group.contains_key(&p.group()) {
                order.push(p.group());
            }
            by_group.entry(p.group()).or_default().push(p);
        }
        order
            .into_iter()
            .filter_map(|g| by_group.remove(&g))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defined_rejects_nan() {
        let p = DataPoint::new(0).with(Aes::X, 1.0).with(Aes::Y, f64::NAN);
        assert!(p.defined(Aes::X));
        assert!(!p.defined(Aes::Y));
        assert!(!p.defined(Aes::YMin));
        assert!(!p.all_defined(&[Aes::X, Aes::Y]));
        assert_eq!(p.y(), None);
    }

    #[test]
    fn test_alpha_applies_to_opaque_paint() {
        let p = DataPoint::new(0)
            .with(Aes::Color, Rgba::RED)
            .with(Aes::Alpha, 0.5);
        assert_eq!(p.color(), Rgba::new(255, 0, 0, 128));
        let q = DataPoint::new(0).with(Aes::Color, Rgba::TRANSPARENT).with(Aes::Alpha, 0.5);
        assert_eq!(q.color(), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_resolution() {
        let aes = Aesthetics::new(
            [1.0, 3.0, 3.0, 3.5, 6.0]
                .iter()
                .enumerate()
                .map(|(i, x)| DataPoint::new(i).with(Aes::X, *x))
                .collect(),
        );
        assert_eq!(aes.resolution(Aes::X, 1.0), 0.5);
        assert_eq!(aes.resolution(Aes::Y, 1.0), 1.0);
        assert_eq!(aes.range(Aes::X), Some(Span::new(1.0, 6.0)));
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let aes = Aesthetics::new(vec![
            DataPoint::new(0).with_group(2),
            DataPoint::new(1).with_group(0),
            DataPoint::new(2).with_group(2),
        ]);
        let groups = aes.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].iter().map(|p| p.index()).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(groups[1][0].index(), 1);
    }

    #[test]
    fn test_defaults() {
        let d = AestheticsDefaults::point();
        assert_eq!(d.get(Aes::Size), Some(&AesValue::Number(2.0)));
        assert_eq!(AestheticsDefaults::bar().get(Aes::Color), Some(&AesValue::Color(Rgba::TRANSPARENT)));
    }
}
