//! Mapper providers: build a [`GuideMapper`] for a scale's domain.

use super::mapper::{level_index, GuideMapper, GuideMappers, ScaleMapper};
use super::{Scale, ScaleDomain};
use crate::color::{Hsla, Rgba};
use crate::error::{Error, Result};
use crate::geometry::Span;
use crate::grammar::{Aes, AesValue, LineType, PointShape};
use crate::transform::{range_with_limits_after_transform, ContinuousTransform, DiscreteTransform};
use std::fmt::Debug;
use std::sync::Arc;

/// Builds mappers for discrete and continuous domains.
pub trait MapperProvider<T>: Debug + Send + Sync {
    /// Mapper over level indices.
    fn create_discrete_mapper(&self, levels: &DiscreteTransform) -> Result<GuideMapper<T>>;

    /// Mapper over transformed values of a data-space `domain`.
    fn create_continuous_mapper(&self, domain: Span, transform: &ContinuousTransform) -> Result<GuideMapper<T>>;
}

/// Positional aesthetics: transformed values pass through, coordinates do the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapperProvider;

impl MapperProvider<f64> for IdentityMapperProvider {
    fn create_discrete_mapper(&self, levels: &DiscreteTransform) -> Result<GuideMapper<f64>> {
        let n = levels.len();
        let mapper = ScaleMapper::new(f64::NAN, move |v| level_index(v, n).map(|i| i as f64));
        Ok(GuideMapper::new(mapper, false))
    }

    fn create_continuous_mapper(&self, _: Span, _: &ContinuousTransform) -> Result<GuideMapper<f64>> {
        Ok(GuideMapper::new(ScaleMapper::new(f64::NAN, Some), true))
    }
}

/// Linear map onto a numeric output range (size, alpha, width).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearNormalizingMapperProvider {
    output: Span,
    na_value: f64,
}

impl LinearNormalizingMapperProvider {
    /// Provider for `output`.
    #[must_use]
    pub fn new(output: Span, na_value: f64) -> Self {
        Self { output, na_value }
    }

    /// Default size range.
    #[must_use]
    pub fn size() -> Self {
        Self::new(Span::new(1.0, 6.0), 0.5)
    }

    /// Default alpha range.
    #[must_use]
    pub fn alpha() -> Self {
        Self::new(Span::new(0.1, 1.0), 1.0)
    }

    /// Default stroke width range.
    #[must_use]
    pub fn stroke() -> Self {
        Self::new(Span::new(0.5, 2.0), 0.5)
    }
}

impl MapperProvider<f64> for LinearNormalizingMapperProvider {
    fn create_discrete_mapper(&self, levels: &DiscreteTransform) -> Result<GuideMapper<f64>> {
        Ok(GuideMappers::discrete_to_continuous(levels, self.output, self.na_value))
    }

    fn create_continuous_mapper(&self, domain: Span, transform: &ContinuousTransform) -> Result<GuideMapper<f64>> {
        let range = range_with_limits_after_transform(domain, transform);
        Ok(GuideMappers::continuous_to_continuous(range, self.output, self.na_value))
    }
}

/// Two-color gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorGradientMapperProvider {
    low: Rgba,
    high: Rgba,
    na_value: Rgba,
}

/// Low end of the default continuous color gradient.
pub const DEF_GRADIENT_LOW: Rgba = Rgba::rgb(19, 43, 67);
/// High end of the default continuous color gradient.
pub const DEF_GRADIENT_HIGH: Rgba = Rgba::rgb(86, 177, 247);
/// Color of missing values.
pub const DEF_NA_COLOR: Rgba = Rgba::GRAY;

impl Default for ColorGradientMapperProvider {
    fn default() -> Self {
        Self::new(DEF_GRADIENT_LOW, DEF_GRADIENT_HIGH, DEF_NA_COLOR)
    }
}

impl ColorGradientMapperProvider {
    /// Gradient from `low` to `high`.
    #[must_use]
    pub fn new(low: Rgba, high: Rgba, na_value: Rgba) -> Self {
        Self { low, high, na_value }
    }
}

impl MapperProvider<Rgba> for ColorGradientMapperProvider {
    fn create_discrete_mapper(&self, levels: &DiscreteTransform) -> Result<GuideMapper<Rgba>> {
        let n = levels.len();
        let colors = (0..n)
            .map(|i| {
                let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
                self.low.lerp(self.high, t)
            })
            .collect();
        Ok(GuideMappers::discrete_to_palette(levels, colors, self.na_value))
    }

    fn create_continuous_mapper(&self, domain: Span, transform: &ContinuousTransform) -> Result<GuideMapper<Rgba>> {
        let range = range_with_limits_after_transform(domain, transform);
        Ok(GuideMappers::continuous_to_color(range, self.low, self.high, self.na_value))
    }
}

/// Colors around the hue wheel at fixed chroma and luminance.
///
/// The hue range may exceed 360 degrees to wrap around the wheel. A discrete
/// domain spreads its levels evenly over the range; when the range covers
/// the full wheel the last slot is dropped so the first and last level do
/// not coincide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorHueMapperProvider {
    hue_range: (f64, f64),
    chroma: f64,
    luminance: f64,
    start_hue: f64,
    reversed: bool,
    na_value: Rgba,
}

impl Default for ColorHueMapperProvider {
    fn default() -> Self {
        Self::new((15.0, 375.0), 100.0, 65.0, 0.0, false, DEF_NA_COLOR)
    }
}

impl ColorHueMapperProvider {
    /// Provider with every parameter. Chroma and luminance are percentages.
    #[must_use]
    pub fn new(
        hue_range: (f64, f64),
        chroma: f64,
        luminance: f64,
        start_hue: f64,
        reversed: bool,
        na_value: Rgba,
    ) -> Self {
        Self { hue_range, chroma, luminance, start_hue, reversed, na_value }
    }

    fn color(&self, hue: f64) -> Rgba {
        Hsla::hsl(hue.rem_euclid(360.0), self.chroma / 100.0, self.luminance / 100.0).to_rgba()
    }

    /// Hues of `n` evenly spaced discrete levels.
    #[must_use]
    pub fn discrete_hues(&self, n: usize) -> Vec<f64> {
        if n == 0 {
            return Vec::new();
        }
        let (lo, mut hi) = self.hue_range;
        if (hi - lo).rem_euclid(360.0) < 1.0 {
            hi -= 360.0 / n as f64;
        }
        let step = if n > 1 { (hi - lo) / (n - 1) as f64 } else { 0.0 };
        let mut hues: Vec<f64> = (0..n)
            .map(|i| (lo + step * i as f64 + self.start_hue).rem_euclid(360.0))
            .collect();
        if self.reversed {
            hues.reverse();
        }
        hues
    }
}

impl MapperProvider<Rgba> for ColorHueMapperProvider {
    fn create_discrete_mapper(&self, levels: &DiscreteTransform) -> Result<GuideMapper<Rgba>> {
        let colors = self.discrete_hues(levels.len()).into_iter().map(|h| self.color(h)).collect();
        Ok(GuideMappers::discrete_to_palette(levels, colors, self.na_value))
    }

    fn create_continuous_mapper(&self, domain: Span, transform: &ContinuousTransform) -> Result<GuideMapper<Rgba>> {
        let range = range_with_limits_after_transform(domain, transform);
        let this = *self;
        let (hue_lo, hue_hi) = self.hue_range;
        let mapper = ScaleMapper::new(self.na_value, move |v| {
            if !range.contains(v) {
                return None;
            }
            let t = if range.is_degenerate() { 0.0 } else { (v - range.lower()) / range.length() };
            let len = hue_hi - hue_lo;
            let hue = if this.reversed { hue_hi - t * len } else { hue_lo + t * len };
            Some(this.color(hue + this.start_hue))
        });
        Ok(GuideMapper::new(mapper, true))
    }
}

/// Gradient for numbers, hues for levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorMapperProvider {
    continuous: ColorGradientMapperProvider,
    discrete: ColorHueMapperProvider,
}

impl ColorMapperProvider {
    /// Combine a gradient and a hue provider.
    #[must_use]
    pub fn new(continuous: ColorGradientMapperProvider, discrete: ColorHueMapperProvider) -> Self {
        Self { continuous, discrete }
    }
}

impl MapperProvider<Rgba> for ColorMapperProvider {
    fn create_discrete_mapper(&self, levels: &DiscreteTransform) -> Result<GuideMapper<Rgba>> {
        self.discrete.create_discrete_mapper(levels)
    }

    fn create_continuous_mapper(&self, domain: Span, transform: &ContinuousTransform) -> Result<GuideMapper<Rgba>> {
        self.continuous.create_continuous_mapper(domain, transform)
    }
}

fn continuous_unsupported<T>(provider: &str, domain: Span) -> Result<T> {
    Err(Error::ContinuousDomainUnsupported {
        provider: provider.to_string(),
        domain: domain.to_string(),
    })
}

/// Point glyphs for discrete domains only.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMapperProvider {
    palette: Vec<PointShape>,
    na_value: PointShape,
}

impl Default for ShapeMapperProvider {
    fn default() -> Self {
        Self::new(PointShape::PALETTE.to_vec(), PointShape::CircleOpen)
    }
}

impl ShapeMapperProvider {
    /// Provider cycling through `palette`.
    #[must_use]
    pub fn new(palette: Vec<PointShape>, na_value: PointShape) -> Self {
        Self { palette, na_value }
    }
}

impl MapperProvider<PointShape> for ShapeMapperProvider {
    fn create_discrete_mapper(&self, levels: &DiscreteTransform) -> Result<GuideMapper<PointShape>> {
        Ok(GuideMappers::discrete_to_palette(levels, self.palette.clone(), self.na_value))
    }

    fn create_continuous_mapper(&self, domain: Span, _: &ContinuousTransform) -> Result<GuideMapper<PointShape>> {
        continuous_unsupported("ShapeMapperProvider", domain)
    }
}

/// Dash patterns for discrete domains only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineTypeMapperProvider;

impl MapperProvider<LineType> for LineTypeMapperProvider {
    fn create_discrete_mapper(&self, levels: &DiscreteTransform) -> Result<GuideMapper<LineType>> {
        Ok(GuideMappers::discrete_to_palette(levels, LineType::PALETTE.to_vec(), LineType::Solid))
    }

    fn create_continuous_mapper(&self, domain: Span, _: &ContinuousTransform) -> Result<GuideMapper<LineType>> {
        continuous_unsupported("LineTypeMapperProvider", domain)
    }
}

/// A provider for any aesthetic, typed by the aesthetic's value kind.
#[derive(Debug, Clone)]
pub enum AesMapperProvider {
    /// Numeric output.
    Number(Arc<dyn MapperProvider<f64>>),
    /// Paint output.
    Color(Arc<dyn MapperProvider<Rgba>>),
    /// Glyph output.
    Shape(Arc<dyn MapperProvider<PointShape>>),
    /// Dash pattern output.
    LineType(Arc<dyn MapperProvider<LineType>>),
}

impl AesMapperProvider {
    /// Default provider of an aesthetic.
    #[must_use]
    pub fn default_for(aes: Aes) -> Self {
        match aes {
            Aes::Color | Aes::Fill => Self::Color(Arc::new(ColorMapperProvider::default())),
            Aes::Shape => Self::Shape(Arc::new(ShapeMapperProvider::default())),
            Aes::LineType => Self::LineType(Arc::new(LineTypeMapperProvider)),
            Aes::Size => Self::Number(Arc::new(LinearNormalizingMapperProvider::size())),
            Aes::Alpha => Self::Number(Arc::new(LinearNormalizingMapperProvider::alpha())),
            Aes::Stroke => Self::Number(Arc::new(LinearNormalizingMapperProvider::stroke())),
            _ => Self::Number(Arc::new(IdentityMapperProvider)),
        }
    }

    /// Mapper for `scale`, output wrapped as [`AesValue`].
    pub fn create_mapper(&self, scale: &Scale) -> Result<GuideMapper<AesValue>> {
        match self {
            Self::Number(p) => Ok(create(p.as_ref(), scale)?.map_output(AesValue::Number)),
            Self::Color(p) => Ok(create(p.as_ref(), scale)?.map_output(AesValue::Color)),
            Self::Shape(p) => Ok(create(p.as_ref(), scale)?.map_output(AesValue::Shape)),
            Self::LineType(p) => Ok(create(p.as_ref(), scale)?.map_output(AesValue::LineType)),
        }
    }
}

fn create<T>(provider: &dyn MapperProvider<T>, scale: &Scale) -> Result<GuideMapper<T>> {
    match scale.domain() {
        ScaleDomain::Continuous { transform, domain } => {
            let domain = transform.ensure_applicable_domain(*domain);
            provider.create_continuous_mapper(domain, transform)
        }
        ScaleDomain::Discrete(levels) => provider.create_discrete_mapper(levels),
    }
}
