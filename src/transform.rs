//! Scale transforms.
//!
//! A [`ContinuousTransform`] is applied to a variable before statistics and
//! scaling (log10, sqrt, reverse). A [`DiscreteTransform`] maps categorical
//! levels to their ordinal position in declared order.

use crate::grammar::DataValue;
use crate::geometry::Span;

/// Lower bound substituted for a non-positive log10 domain bound.
pub const LOG10_DOMAIN_FLOOR: f64 = 1e-10;

/// Kind of continuous transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformKind {
    /// No transformation.
    #[default]
    Identity,
    /// Base-10 logarithm. Defined for positive values only.
    Log10,
    /// Square root. Defined for non-negative values only.
    Sqrt,
    /// Negation, reverses the axis direction.
    Reverse,
}

impl TransformKind {
    /// Parse a transform name as used in plot specifications.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "identity" => Some(Self::Identity),
            "log10" => Some(Self::Log10),
            "sqrt" => Some(Self::Sqrt),
            "reverse" => Some(Self::Reverse),
            _ => None,
        }
    }
}

/// Bidirectional numeric transform with optional explicit limits.
///
/// Limits are stored in data space. When set they replace the computed data
/// range for mapper construction (see [`range_with_limits_after_transform`]).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContinuousTransform {
    kind: TransformKind,
    lower_limit: Option<f64>,
    upper_limit: Option<f64>,
}

impl ContinuousTransform {
    /// Identity transform.
    pub const IDENTITY: Self = Self::new(TransformKind::Identity);
    /// Log10 transform.
    pub const LOG10: Self = Self::new(TransformKind::Log10);
    /// Square-root transform.
    pub const SQRT: Self = Self::new(TransformKind::Sqrt);
    /// Reverse transform.
    pub const REVERSE: Self = Self::new(TransformKind::Reverse);

    /// Transform without limits.
    #[must_use]
    pub const fn new(kind: TransformKind) -> Self {
        Self {
            kind,
            lower_limit: None,
            upper_limit: None,
        }
    }

    /// Same transform with explicit data-space limits.
    #[must_use]
    pub fn with_limits(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.lower_limit = lower.filter(|v| self.is_in_domain(*v));
        self.upper_limit = upper.filter(|v| self.is_in_domain(*v));
        self
    }

    /// The underlying transform with the limits removed.
    #[must_use]
    pub const fn unwrap_limits(self) -> Self {
        Self::new(self.kind)
    }

    /// Explicit limits, if any.
    #[must_use]
    pub fn defined_limits(&self) -> (Option<f64>, Option<f64>) {
        (self.lower_limit, self.upper_limit)
    }

    /// Whether any explicit limit is set.
    #[must_use]
    pub fn has_limits(&self) -> bool {
        self.lower_limit.is_some() || self.upper_limit.is_some()
    }

    /// Transform kind.
    #[must_use]
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    /// Identity transform without limits.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.kind == TransformKind::Identity
    }

    /// Whether `v` can be transformed.
    #[must_use]
    pub fn is_in_domain(&self, v: f64) -> bool {
        if !v.is_finite() {
            return false;
        }
        match self.kind {
            TransformKind::Identity | TransformKind::Reverse => true,
            TransformKind::Log10 => v > 0.0,
            TransformKind::Sqrt => v >= 0.0,
        }
    }

    /// Apply the transform. Values outside the domain yield `None`.
    #[must_use]
    pub fn apply(&self, v: f64) -> Option<f64> {
        if !self.is_in_domain(v) {
            return None;
        }
        Some(match self.kind {
            TransformKind::Identity => v,
            TransformKind::Log10 => v.log10(),
            TransformKind::Sqrt => v.sqrt(),
            TransformKind::Reverse => -v,
        })
    }

    /// Apply the transform to a series, propagating missing values.
    #[must_use]
    pub fn apply_all(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values.iter().map(|v| v.and_then(|v| self.apply(v))).collect()
    }

    /// Map a transformed value back to data space.
    #[must_use]
    pub fn apply_inverse(&self, v: f64) -> f64 {
        match self.kind {
            TransformKind::Identity => v,
            TransformKind::Log10 => 10f64.powf(v),
            TransformKind::Sqrt => v * v,
            TransformKind::Reverse => -v,
        }
    }

    /// A data-space domain this transform can work with.
    ///
    /// A missing domain becomes a default one, a degenerate domain is widened
    /// around its single value, and bounds outside the transform's domain are
    /// clipped.
    #[must_use]
    pub fn ensure_applicable_domain(&self, domain: Option<Span>) -> Span {
        let default = match self.kind {
            TransformKind::Log10 => Span::new(1.0, 10.0),
            TransformKind::Sqrt => Span::new(0.0, 1.0),
            TransformKind::Identity | TransformKind::Reverse => Span::new(-0.5, 0.5),
        };
        let Some(domain) = domain else {
            return default;
        };
        let lower = if self.is_in_domain(domain.lower()) {
            domain.lower()
        } else {
            match self.kind {
                TransformKind::Log10 => LOG10_DOMAIN_FLOOR,
                _ => 0.0,
            }
        };
        let upper = domain.upper().max(lower);
        if upper > lower {
            return Span::new(lower, upper);
        }
        match self.kind {
            TransformKind::Log10 => Span::new(lower / 10.0, lower * 10.0),
            TransformKind::Sqrt => Span::new((lower - 0.5).max(0.0), lower + 0.5),
            TransformKind::Identity | TransformKind::Reverse => {
                let pad = if lower == 0.0 { 0.5 } else { lower.abs() * 0.1 };
                Span::new(lower - pad, lower + pad)
            }
        }
    }
}

/// Transformed-space range used to build a continuous mapper.
///
/// Explicit limits on the transform replace the corresponding bound of the
/// data-space `domain` before transforming.
#[must_use]
pub fn range_with_limits_after_transform(domain: Span, transform: &ContinuousTransform) -> Span {
    let (lower_limit, upper_limit) = transform.defined_limits();
    let lower = lower_limit.unwrap_or(domain.lower());
    let upper = upper_limit.unwrap_or(domain.upper());
    let plain = transform.unwrap_limits();
    let tl = plain.apply(lower).unwrap_or(lower);
    let tu = plain.apply(upper).unwrap_or(upper);
    Span::new(tl, tu)
}

/// Ordered level list for a discrete scale.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscreteTransform {
    levels: Vec<DataValue>,
}

impl DiscreteTransform {
    /// Levels in the given order; duplicates keep their first position.
    #[must_use]
    pub fn new(levels: Vec<DataValue>) -> Self {
        let mut unique: Vec<DataValue> = Vec::with_capacity(levels.len());
        for v in levels {
            if !v.is_null() && !unique.contains(&v) {
                unique.push(v);
            }
        }
        Self { levels: unique }
    }

    /// Extend with levels not seen yet, keeping existing order.
    #[must_use]
    pub fn with_more_levels<I: IntoIterator<Item = DataValue>>(mut self, more: I) -> Self {
        for v in more {
            if !v.is_null() && !self.levels.contains(&v) {
                self.levels.push(v);
            }
        }
        self
    }

    /// Levels in order.
    #[must_use]
    pub fn levels(&self) -> &[DataValue] {
        &self.levels
    }

    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// No levels at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Ordinal position of a level.
    #[must_use]
    pub fn index_of(&self, v: &DataValue) -> Option<usize> {
        self.levels.iter().position(|l| l == v)
    }

    /// Ordinal position as a transformed value.
    #[must_use]
    pub fn apply(&self, v: &DataValue) -> Option<f64> {
        self.index_of(v).map(|i| i as f64)
    }

    /// Level at a transformed value, if it is an in-range integer.
    #[must_use]
    pub fn apply_inverse(&self, v: f64) -> Option<&DataValue> {
        if !v.is_finite() || v < 0.0 || v.fract() != 0.0 {
            return None;
        }
        self.levels.get(v as usize)
    }

    /// Transformed span covered by the levels.
    #[must_use]
    pub fn transformed_span(&self) -> Option<Span> {
        match self.levels.len() {
            0 => None,
            n => Some(Span::new(0.0, (n - 1) as f64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_log10_round_trip() {
        let t = ContinuousTransform::LOG10;
        assert_relative_eq!(t.apply(100.0).unwrap(), 2.0);
        assert_relative_eq!(t.apply_inverse(2.0), 100.0);
        assert_eq!(t.apply(0.0), None);
        assert_eq!(t.apply(-1.0), None);
    }

    #[test]
    fn test_sqrt_and_reverse() {
        assert_eq!(ContinuousTransform::SQRT.apply(9.0), Some(3.0));
        assert_eq!(ContinuousTransform::SQRT.apply(-9.0), None);
        assert_eq!(ContinuousTransform::REVERSE.apply(4.0), Some(-4.0));
        assert_eq!(ContinuousTransform::REVERSE.apply_inverse(-4.0), 4.0);
    }

    #[test]
    fn test_apply_all_propagates_missing() {
        let out = ContinuousTransform::LOG10.apply_all(&[Some(10.0), None, Some(-1.0), Some(f64::NAN)]);
        assert_eq!(out, vec![Some(1.0), None, None, None]);
    }

    #[test]
    fn test_limits_drop_out_of_domain() {
        let t = ContinuousTransform::LOG10.with_limits(Some(-5.0), Some(1000.0));
        assert_eq!(t.defined_limits(), (None, Some(1000.0)));
        assert!(t.has_limits());
        assert!(!t.unwrap_limits().has_limits());
    }

    #[test]
    fn test_range_with_limits_after_transform() {
        let t = ContinuousTransform::LOG10.with_limits(Some(1.0), None);
        let r = range_with_limits_after_transform(Span::new(10.0, 1000.0), &t);
        assert_relative_eq!(r.lower(), 0.0);
        assert_relative_eq!(r.upper(), 3.0);

        let rev = range_with_limits_after_transform(Span::new(1.0, 5.0), &ContinuousTransform::REVERSE);
        assert_eq!(rev, Span::new(-5.0, -1.0));
    }

    #[test]
    fn test_ensure_applicable_domain() {
        let id = ContinuousTransform::IDENTITY;
        assert_eq!(id.ensure_applicable_domain(None), Span::new(-0.5, 0.5));
        assert_eq!(id.ensure_applicable_domain(Some(Span::singleton(0.0))), Span::new(-0.5, 0.5));
        assert_eq!(id.ensure_applicable_domain(Some(Span::new(1.0, 2.0))), Span::new(1.0, 2.0));

        let log = ContinuousTransform::LOG10;
        assert_eq!(log.ensure_applicable_domain(Some(Span::singleton(10.0))), Span::new(1.0, 100.0));
        let clipped = log.ensure_applicable_domain(Some(Span::new(-3.0, 10.0)));
        assert_eq!(clipped, Span::new(LOG10_DOMAIN_FLOOR, 10.0));
        // eleven decades, not three hundred
        approx::assert_relative_eq!(log.apply(clipped.lower()).unwrap(), -10.0);
    }

    #[test]
    fn test_discrete_transform_order() {
        let t = DiscreteTransform::new(vec!["b".into(), "a".into(), "b".into(), DataValue::Null]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.apply(&"b".into()), Some(0.0));
        assert_eq!(t.apply(&"a".into()), Some(1.0));
        assert_eq!(t.apply(&"c".into()), None);
        assert_eq!(t.apply_inverse(1.0), Some(&DataValue::from("a")));
        assert_eq!(t.apply_inverse(1.5), None);
        assert_eq!(t.apply_inverse(2.0), None);

        let more = t.with_more_levels(vec!["c".into(), "a".into()]);
        assert_eq!(more.len(), 3);
        assert_eq!(more.transformed_span(), Some(Span::new(0.0, 2.0)));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(TransformKind::from_name("Log10"), Some(TransformKind::Log10));
        assert_eq!(TransformKind::from_name("cube"), None);
    }
}
