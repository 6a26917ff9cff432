//! Mappers from transformed domain values to visual values.

use crate::color::Rgba;
use crate::geometry::Span;
use crate::transform::DiscreteTransform;
use std::fmt;
use std::sync::Arc;

type MapFn<T> = Arc<dyn Fn(f64) -> Option<T> + Send + Sync>;

/// Pure function from a transformed value to a target value.
///
/// Missing, non-finite and unmappable inputs all yield the NA value.
#[derive(Clone)]
pub struct ScaleMapper<T> {
    f: MapFn<T>,
    na_value: T,
}

impl<T: fmt::Debug> fmt::Debug for ScaleMapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleMapper").field("na_value", &self.na_value).finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> ScaleMapper<T> {
    /// Mapper from a closure; `None` from the closure means NA.
    pub fn new(na_value: T, f: impl Fn(f64) -> Option<T> + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f), na_value }
    }

    /// Map a value.
    #[must_use]
    pub fn map(&self, value: Option<f64>) -> T {
        value
            .filter(|v| v.is_finite())
            .and_then(|v| (self.f)(v))
            .unwrap_or_else(|| self.na_value.clone())
    }

    /// Value used for NA.
    #[must_use]
    pub fn na_value(&self) -> &T {
        &self.na_value
    }

    /// Mapper producing `g(self.map(v))`.
    #[must_use]
    pub fn map_output<U: Clone + Send + Sync + 'static>(
        &self,
        g: impl Fn(T) -> U + Send + Sync + 'static,
    ) -> ScaleMapper<U> {
        let f = Arc::clone(&self.f);
        let na = g(self.na_value.clone());
        ScaleMapper::new(na, move |v| f(v).map(&g))
    }
}

/// A mapper that also knows whether its guide is continuous (colorbar) or
/// discrete (legend).
#[derive(Debug, Clone)]
pub struct GuideMapper<T> {
    mapper: ScaleMapper<T>,
    is_continuous: bool,
}

impl<T: Clone + Send + Sync + 'static> GuideMapper<T> {
    /// Wrap a mapper.
    #[must_use]
    pub fn new(mapper: ScaleMapper<T>, is_continuous: bool) -> Self {
        Self { mapper, is_continuous }
    }

    /// Map a value.
    #[must_use]
    pub fn map(&self, value: Option<f64>) -> T {
        self.mapper.map(value)
    }

    /// Whether the input domain is continuous.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.is_continuous
    }

    /// Underlying mapper.
    #[must_use]
    pub fn mapper(&self) -> &ScaleMapper<T> {
        &self.mapper
    }

    /// Value used for NA.
    #[must_use]
    pub fn na_value(&self) -> &T {
        self.mapper.na_value()
    }

    /// Same guide kind, output converted by `g`.
    #[must_use]
    pub fn map_output<U: Clone + Send + Sync + 'static>(
        &self,
        g: impl Fn(T) -> U + Send + Sync + 'static,
    ) -> GuideMapper<U> {
        GuideMapper::new(self.mapper.map_output(g), self.is_continuous)
    }
}

/// Factory functions for the standard mapper shapes.
#[derive(Debug)]
pub struct GuideMappers;

/// Relative tolerance for values sitting just outside a domain.
const DOMAIN_EPS: f64 = 1e-9;

fn normalize(domain: Span, v: f64) -> Option<f64> {
    let tol = domain.length().max(1.0) * DOMAIN_EPS;
    if v < domain.lower() - tol || v > domain.upper() + tol {
        return None;
    }
    if domain.is_degenerate() {
        return Some(0.0);
    }
    Some(((v - domain.lower()) / domain.length()).clamp(0.0, 1.0))
}

impl GuideMappers {
    /// Linear map of `domain` onto `output`; values outside `domain` are NA
    /// and a degenerate domain maps to the lower end of `output`.
    #[must_use]
    pub fn continuous_to_continuous(domain: Span, output: Span, na_value: f64) -> GuideMapper<f64> {
        let mapper = ScaleMapper::new(na_value, move |v| {
            normalize(domain, v).map(|t| output.lower() + t * output.length())
        });
        GuideMapper::new(mapper, true)
    }

    /// Level index to evenly spaced values across `output`.
    #[must_use]
    pub fn discrete_to_continuous(levels: &DiscreteTransform, output: Span, na_value: f64) -> GuideMapper<f64> {
        let n = levels.len();
        let step = if n > 1 { output.length() / (n - 1) as f64 } else { 0.0 };
        let mapper = ScaleMapper::new(na_value, move |v| {
            level_index(v, n).map(|i| output.lower() + step * i as f64)
        });
        GuideMapper::new(mapper, false)
    }

    /// Linear gradient from `low` to `high` across `domain`.
    #[must_use]
    pub fn continuous_to_color(domain: Span, low: Rgba, high: Rgba, na_value: Rgba) -> GuideMapper<Rgba> {
        let mapper = ScaleMapper::new(na_value, move |v| normalize(domain, v).map(|t| low.lerp(high, t)));
        GuideMapper::new(mapper, true)
    }

    /// Level index to a palette entry, cycling through the palette.
    #[must_use]
    pub fn discrete_to_palette<T: Clone + Send + Sync + 'static>(
        levels: &DiscreteTransform,
        palette: Vec<T>,
        na_value: T,
    ) -> GuideMapper<T> {
        let n = levels.len();
        let mapper = ScaleMapper::new(na_value, move |v| {
            if palette.is_empty() {
                return None;
            }
            level_index(v, n).map(|i| palette[i % palette.len()].clone())
        });
        GuideMapper::new(mapper, false)
    }
}

/// Integer level index in `0..n`.
pub(crate) fn level_index(v: f64, n: usize) -> Option<usize> {
    let i = v.round();
    (i >= 0.0 && (i as usize) < n && (v - i).abs() < 1e-6).then_some(i as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::DataValue;

    fn levels(n: usize) -> DiscreteTransform {
        DiscreteTransform::new((0..n).map(|i| DataValue::from(format!("l{i}"))).collect())
    }

    #[test]
    fn test_continuous_to_continuous() {
        let m = GuideMappers::continuous_to_continuous(Span::new(0.0, 10.0), Span::new(1.0, 6.0), 0.5);
        assert_eq!(m.map(Some(0.0)), 1.0);
        assert_eq!(m.map(Some(10.0)), 6.0);
        assert_eq!(m.map(Some(5.0)), 3.5);
        assert_eq!(m.map(Some(11.0)), 0.5);
        assert_eq!(m.map(None), 0.5);
        assert_eq!(m.map(Some(f64::NAN)), 0.5);
        assert!(m.is_continuous());
    }

    #[test]
    fn test_degenerate_domain_maps_to_lower() {
        let m = GuideMappers::continuous_to_continuous(Span::singleton(3.0), Span::new(1.0, 6.0), 0.0);
        assert_eq!(m.map(Some(3.0)), 1.0);
        let d = GuideMappers::discrete_to_continuous(&levels(1), Span::new(1.0, 6.0), 0.0);
        assert_eq!(d.map(Some(0.0)), 1.0);
    }

    #[test]
    fn test_discrete_to_continuous() {
        let m = GuideMappers::discrete_to_continuous(&levels(3), Span::new(0.0, 1.0), -1.0);
        assert_eq!(m.map(Some(0.0)), 0.0);
        assert_eq!(m.map(Some(1.0)), 0.5);
        assert_eq!(m.map(Some(2.0)), 1.0);
        assert_eq!(m.map(Some(3.0)), -1.0);
        assert_eq!(m.map(Some(0.5)), -1.0);
        assert!(!m.is_continuous());
    }

    #[test]
    fn test_gradient() {
        let m = GuideMappers::continuous_to_color(Span::new(0.0, 1.0), Rgba::BLACK, Rgba::WHITE, Rgba::RED);
        assert_eq!(m.map(Some(0.0)), Rgba::BLACK);
        assert_eq!(m.map(Some(1.0)), Rgba::WHITE);
        assert_eq!(m.map(Some(0.5)), Rgba::rgb(128, 128, 128));
        assert_eq!(m.map(None), Rgba::RED);
    }

    #[test]
    fn test_palette_cycles_within_levels() {
        let m = GuideMappers::discrete_to_palette(&levels(3), vec!['a', 'b'], '?');
        assert_eq!(m.map(Some(2.0)), 'a');
        assert_eq!(m.map(Some(3.0)), '?');
    }

    #[test]
    fn test_map_output() {
        let m = GuideMappers::continuous_to_continuous(Span::new(0.0, 1.0), Span::new(0.0, 2.0), 0.0);
        let s = m.map_output(|v| format!("{v:.1}"));
        assert_eq!(s.map(Some(0.5)), "1.0");
        assert_eq!(s.na_value(), "0.0");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn missing_maps_to_na(lo in -1e6f64..1e6, len in 0.0f64..1e6, na in -10.0f64..10.0, n in 0usize..12) {
                let c = GuideMappers::continuous_to_continuous(Span::new(lo, lo + len), Span::new(0.0, 1.0), na);
                prop_assert_eq!(c.map(None), na);
                let d = GuideMappers::discrete_to_continuous(&levels(n), Span::new(0.0, 1.0), na);
                prop_assert_eq!(d.map(None), na);
                prop_assert_eq!(d.map(Some(n as f64)), na);
            }
        }
    }
}
