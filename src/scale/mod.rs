//! Scales: per-aesthetic domain, transform, breaks and expansion.
//!
//! A [`Scale`] is immutable once built. Its breaks are computed on first
//! request and cached; [`Scale::with_domain`] and [`Scale::with`] produce a
//! new scale with an empty cache.

mod breaks;
mod mapper;
mod provider;

pub use breaks::{
    format_fixed, format_significant, nice_step, nice_ticks, BreaksGenerator, LabelFormatter,
    NiceBreaksGenerator, DEFAULT_BREAK_COUNT,
};
pub use mapper::{GuideMapper, GuideMappers, ScaleMapper};
pub use provider::{
    AesMapperProvider, ColorGradientMapperProvider, ColorHueMapperProvider, ColorMapperProvider,
    IdentityMapperProvider, LineTypeMapperProvider, LinearNormalizingMapperProvider, MapperProvider,
    ShapeMapperProvider, DEF_GRADIENT_HIGH, DEF_GRADIENT_LOW, DEF_NA_COLOR,
};

use crate::geometry::Span;
use crate::grammar::{Aes, DataValue};
use crate::transform::{ContinuousTransform, DiscreteTransform};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Multiplicative expansion of continuous scales.
pub const DEF_CONTINUOUS_EXPAND: f64 = 0.05;
/// Additive expansion of discrete scales, in level units.
pub const DEF_DISCRETE_EXPAND: f64 = 0.6;

/// Breaks of a scale: domain value, transformed value and label per break.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScaleBreaks {
    domain_values: Vec<DataValue>,
    transformed_values: Vec<f64>,
    labels: Vec<String>,
}

impl ScaleBreaks {
    /// Breaks from parallel lists; extra entries of longer lists are dropped.
    #[must_use]
    pub fn new(domain_values: Vec<DataValue>, transformed_values: Vec<f64>, labels: Vec<String>) -> Self {
        let n = domain_values.len().min(transformed_values.len()).min(labels.len());
        let mut breaks = Self { domain_values, transformed_values, labels };
        breaks.domain_values.truncate(n);
        breaks.transformed_values.truncate(n);
        breaks.labels.truncate(n);
        breaks
    }

    /// Append one break.
    pub fn push(&mut self, domain_value: DataValue, transformed_value: f64, label: String) {
        self.domain_values.push(domain_value);
        self.transformed_values.push(transformed_value);
        self.labels.push(label);
    }

    /// Data-space values.
    #[must_use]
    pub fn domain_values(&self) -> &[DataValue] {
        &self.domain_values
    }

    /// Transformed values.
    #[must_use]
    pub fn transformed_values(&self) -> &[f64] {
        &self.transformed_values
    }

    /// Labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of breaks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// No breaks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(domain value, transformed value, label)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&DataValue, f64, &str)> {
        self.domain_values
            .iter()
            .zip(&self.transformed_values)
            .zip(&self.labels)
            .map(|((d, t), l)| (d, *t, l.as_str()))
    }
}

/// Domain of a scale.
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleDomain {
    /// Numeric values under a transform; the span is in data space once known.
    Continuous {
        /// Transform applied before mapping.
        transform: ContinuousTransform,
        /// Data-space domain.
        domain: Option<Span>,
    },
    /// Ordered levels.
    Discrete(DiscreteTransform),
}

/// Per-aesthetic mapping configuration.
#[derive(Clone)]
pub struct Scale {
    name: String,
    aes: Aes,
    domain: ScaleDomain,
    explicit_breaks: Option<Vec<DataValue>>,
    explicit_labels: Option<Vec<String>>,
    label_formatter: Option<LabelFormatter>,
    multiplicative_expand: f64,
    additive_expand: f64,
    breaks_generator: Arc<dyn BreaksGenerator>,
    break_count: usize,
    breaks: OnceLock<ScaleBreaks>,
}

impl fmt::Debug for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scale")
            .field("name", &self.name)
            .field("aes", &self.aes)
            .field("domain", &self.domain)
            .field("explicit_breaks", &self.explicit_breaks)
            .field("explicit_labels", &self.explicit_labels)
            .field("multiplicative_expand", &self.multiplicative_expand)
            .field("additive_expand", &self.additive_expand)
            .finish_non_exhaustive()
    }
}

impl Scale {
    /// Builder for a continuous scale with an identity transform.
    #[must_use]
    pub fn continuous(aes: Aes) -> ScaleBuilder {
        ScaleBuilder::new(
            aes,
            ScaleDomain::Continuous {
                transform: ContinuousTransform::IDENTITY,
                domain: None,
            },
        )
    }

    /// Builder for a discrete scale over `levels`.
    #[must_use]
    pub fn discrete(aes: Aes, levels: DiscreteTransform) -> ScaleBuilder {
        ScaleBuilder::new(aes, ScaleDomain::Discrete(levels))
    }

    /// Scale name, used as axis or legend title.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aesthetic this scale serves.
    #[must_use]
    pub fn aes(&self) -> Aes {
        self.aes
    }

    /// Domain description.
    #[must_use]
    pub fn domain(&self) -> &ScaleDomain {
        &self.domain
    }

    /// Whether the domain is numeric.
    #[must_use]
    pub fn is_continuous_domain(&self) -> bool {
        matches!(self.domain, ScaleDomain::Continuous { .. })
    }

    /// Whether both domain and range are continuous.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.is_continuous_domain() && !matches!(self.aes, Aes::Shape | Aes::LineType)
    }

    /// Continuous transform, if the domain is numeric.
    #[must_use]
    pub fn continuous_transform(&self) -> Option<&ContinuousTransform> {
        match &self.domain {
            ScaleDomain::Continuous { transform, .. } => Some(transform),
            ScaleDomain::Discrete(_) => None,
        }
    }

    /// Level list, if the domain is discrete.
    #[must_use]
    pub fn discrete_transform(&self) -> Option<&DiscreteTransform> {
        match &self.domain {
            ScaleDomain::Discrete(levels) => Some(levels),
            ScaleDomain::Continuous { .. } => None,
        }
    }

    /// Data-space span of a continuous domain, when known.
    #[must_use]
    pub fn continuous_domain(&self) -> Option<Span> {
        match &self.domain {
            ScaleDomain::Continuous { domain, .. } => *domain,
            ScaleDomain::Discrete(_) => None,
        }
    }

    /// Transformed-space span of the domain (level indices for discrete scales).
    #[must_use]
    pub fn transformed_domain(&self) -> Option<Span> {
        match &self.domain {
            ScaleDomain::Continuous { transform, domain } => {
                domain.map(|d| crate::transform::range_with_limits_after_transform(d, transform))
            }
            ScaleDomain::Discrete(levels) => levels.transformed_span(),
        }
    }

    /// Multiplicative expansion.
    #[must_use]
    pub fn multiplicative_expand(&self) -> f64 {
        self.multiplicative_expand
    }

    /// Additive expansion.
    #[must_use]
    pub fn additive_expand(&self) -> f64 {
        self.additive_expand
    }

    /// Widen a transformed range by this scale's expansion factors.
    #[must_use]
    pub fn expand(&self, range: Span) -> Span {
        let pad = range.length() * self.multiplicative_expand + self.additive_expand;
        Span::new(range.lower() - pad, range.upper() + pad)
    }

    /// Same scale with a new data-space domain (continuous) and a fresh break cache.
    #[must_use]
    pub fn with_domain(&self, span: Span) -> Scale {
        let mut scale = self.with().build();
        if let ScaleDomain::Continuous { domain, .. } = &mut scale.domain {
            *domain = Some(span);
        }
        scale
    }

    /// Same scale with more discrete levels appended and a fresh break cache.
    #[must_use]
    pub fn with_more_levels(&self, more: Vec<DataValue>) -> Scale {
        let mut scale = self.with().build();
        if let ScaleDomain::Discrete(levels) = &scale.domain {
            scale.domain = ScaleDomain::Discrete(levels.clone().with_more_levels(more));
        }
        scale
    }

    /// Map data values into transformed space.
    ///
    /// Continuous: values outside the transform domain become `None`.
    /// Discrete: the level index, `None` for unknown levels.
    #[must_use]
    pub fn transform_values(&self, values: &[DataValue]) -> Vec<Option<f64>> {
        match &self.domain {
            ScaleDomain::Continuous { transform, .. } => {
                let plain = transform.unwrap_limits();
                values.iter().map(|v| v.as_f64().and_then(|v| plain.apply(v))).collect()
            }
            ScaleDomain::Discrete(levels) => values.iter().map(|v| levels.apply(v)).collect(),
        }
    }

    /// Whether breaks are set explicitly or can be generated from the domain.
    #[must_use]
    pub fn has_breaks(&self) -> bool {
        match &self.domain {
            _ if self.explicit_breaks.is_some() => true,
            ScaleDomain::Continuous { domain, .. } => domain.is_some(),
            ScaleDomain::Discrete(levels) => !levels.is_empty(),
        }
    }

    /// Break generator of a continuous scale.
    #[must_use]
    pub fn breaks_generator(&self) -> &dyn BreaksGenerator {
        self.breaks_generator.as_ref()
    }

    /// Breaks, computed on first call.
    pub fn scale_breaks(&self) -> &ScaleBreaks {
        self.breaks.get_or_init(|| self.compute_breaks())
    }

    /// Label of a data-space value.
    #[must_use]
    pub fn format(&self, value: &DataValue) -> String {
        match (value, &self.label_formatter) {
            (DataValue::Number(v), Some(f)) => f(*v),
            (DataValue::Number(v), None) if self.is_continuous_domain() => format_significant(*v),
            _ => value.to_string(),
        }
    }

    /// Builder initialised from this scale.
    #[must_use]
    pub fn with(&self) -> ScaleBuilder {
        ScaleBuilder {
            scale: Scale {
                breaks: OnceLock::new(),
                ..self.clone()
            },
        }
    }

    fn compute_breaks(&self) -> ScaleBreaks {
        if let Some(explicit) = &self.explicit_breaks {
            return self.explicit_scale_breaks(explicit);
        }
        match &self.domain {
            ScaleDomain::Continuous { transform, domain } => {
                let Some(domain) = domain else {
                    return ScaleBreaks::default();
                };
                let transformed = crate::transform::range_with_limits_after_transform(*domain, transform);
                let mut breaks = self
                    .breaks_generator
                    .generate_breaks(transformed, transform, self.break_count);
                if let Some(f) = &self.label_formatter {
                    breaks.labels = breaks
                        .domain_values
                        .iter()
                        .map(|v| v.as_f64().map_or_else(|| v.to_string(), |v| f(v)))
                        .collect();
                }
                self.apply_explicit_labels(breaks)
            }
            ScaleDomain::Discrete(levels) => {
                let mut breaks = ScaleBreaks::default();
                for (i, level) in levels.levels().iter().enumerate() {
                    breaks.push(level.clone(), i as f64, self.format(level));
                }
                self.apply_explicit_labels(breaks)
            }
        }
    }

    fn explicit_scale_breaks(&self, explicit: &[DataValue]) -> ScaleBreaks {
        let transformed = self.transform_values(explicit);
        let mut breaks = ScaleBreaks::default();
        for (value, t) in explicit.iter().zip(transformed) {
            if let Some(t) = t {
                breaks.push(value.clone(), t, self.format(value));
            }
        }
        self.apply_explicit_labels(breaks)
    }

    fn apply_explicit_labels(&self, mut breaks: ScaleBreaks) -> ScaleBreaks {
        if let Some(labels) = &self.explicit_labels {
            for (slot, label) in breaks.labels.iter_mut().zip(labels) {
                slot.clone_from(label);
            }
        }
        breaks
    }
}

/// Accumulates scale settings.
#[derive(Debug, Clone)]
pub struct ScaleBuilder {
    scale: Scale,
}

impl ScaleBuilder {
    fn new(aes: Aes, domain: ScaleDomain) -> Self {
        let (mult, add) = match domain {
            ScaleDomain::Continuous { .. } => (DEF_CONTINUOUS_EXPAND, 0.0),
            ScaleDomain::Discrete(_) => (0.0, DEF_DISCRETE_EXPAND),
        };
        Self {
            scale: Scale {
                name: aes.name().to_string(),
                aes,
                domain,
                explicit_breaks: None,
                explicit_labels: None,
                label_formatter: None,
                multiplicative_expand: mult,
                additive_expand: add,
                breaks_generator: Arc::new(NiceBreaksGenerator),
                break_count: DEFAULT_BREAK_COUNT,
                breaks: OnceLock::new(),
            },
        }
    }

    /// Scale name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.scale.name = name.into();
        self
    }

    /// Explicit breaks (data-space values); the generator is skipped.
    #[must_use]
    pub fn breaks(mut self, breaks: Vec<DataValue>) -> Self {
        self.scale.explicit_breaks = Some(breaks);
        self
    }

    /// Explicit labels, matched to breaks by position.
    #[must_use]
    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.scale.explicit_labels = Some(labels);
        self
    }

    /// Formatter for numeric break labels.
    #[must_use]
    pub fn label_formatter(mut self, f: LabelFormatter) -> Self {
        self.scale.label_formatter = Some(f);
        self
    }

    /// Multiplicative expansion.
    #[must_use]
    pub fn multiplicative_expand(mut self, v: f64) -> Self {
        self.scale.multiplicative_expand = v;
        self
    }

    /// Additive expansion.
    #[must_use]
    pub fn additive_expand(mut self, v: f64) -> Self {
        self.scale.additive_expand = v;
        self
    }

    /// Transform of a continuous scale; ignored for discrete scales.
    #[must_use]
    pub fn continuous_transform(mut self, t: ContinuousTransform) -> Self {
        if let ScaleDomain::Continuous { transform, .. } = &mut self.scale.domain {
            *transform = t;
        }
        self
    }

    /// Data-space domain of a continuous scale.
    #[must_use]
    pub fn domain(mut self, span: Span) -> Self {
        if let ScaleDomain::Continuous { domain, .. } = &mut self.scale.domain {
            *domain = Some(span);
        }
        self
    }

    /// Break generator.
    #[must_use]
    pub fn breaks_generator(mut self, g: Arc<dyn BreaksGenerator>) -> Self {
        self.scale.breaks_generator = g;
        self
    }

    /// Number of breaks the generator aims for.
    #[must_use]
    pub fn break_count(mut self, n: usize) -> Self {
        self.scale.break_count = n.max(1);
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> Scale {
        Scale {
            breaks: OnceLock::new(),
            ..self.scale
        }
    }
}
