//! Break generation and label formatting.

use super::ScaleBreaks;
use crate::geometry::Span;
use crate::grammar::DataValue;
use crate::transform::{ContinuousTransform, TransformKind};
use std::fmt::Debug;
use std::sync::Arc;

/// Formats a data-space value for an axis or legend label.
pub type LabelFormatter = Arc<dyn Fn(f64) -> String + Send + Sync>;

/// Default number of breaks requested by axes and legends.
pub const DEFAULT_BREAK_COUNT: usize = 5;

/// Produces breaks for a continuous scale.
pub trait BreaksGenerator: Debug + Send + Sync {
    /// Breaks inside `domain` (transformed space), about `target_count` of them.
    fn generate_breaks(&self, domain: Span, transform: &ContinuousTransform, target_count: usize) -> ScaleBreaks;

    /// Formatter matching the breaks this generator would produce.
    fn label_formatter(&self, domain: Span, transform: &ContinuousTransform, target_count: usize) -> LabelFormatter;
}

/// Round-number ticks (1, 2, 5 and 10 times a power of ten) in transformed space.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiceBreaksGenerator;

impl BreaksGenerator for NiceBreaksGenerator {
    fn generate_breaks(&self, domain: Span, transform: &ContinuousTransform, target_count: usize) -> ScaleBreaks {
        let ticks = nice_ticks(domain, target_count);
        let format = self.label_formatter(domain, transform, target_count);
        let plain = transform.unwrap_limits();
        let mut breaks = ScaleBreaks::default();
        for t in ticks {
            let v = plain.apply_inverse(t);
            breaks.push(DataValue::Number(v), t, format(v));
        }
        breaks
    }

    fn label_formatter(&self, domain: Span, transform: &ContinuousTransform, target_count: usize) -> LabelFormatter {
        match transform.kind() {
            TransformKind::Identity | TransformKind::Reverse => {
                let step = nice_step(domain.length() / target_count.max(1) as f64);
                let decimals = decimals_for_step(step);
                Arc::new(move |v| format_fixed(v, decimals))
            }
            TransformKind::Log10 | TransformKind::Sqrt => Arc::new(format_significant),
        }
    }
}

/// Ticks that are multiples of a nice step and fall inside `domain`.
///
/// A degenerate domain yields its single value.
#[must_use]
pub fn nice_ticks(domain: Span, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if domain.is_degenerate() {
        return vec![domain.lower()];
    }
    let step = nice_step(domain.length() / count as f64);
    if step == 0.0 {
        return vec![domain.lower(), domain.upper()];
    }
    // Tolerate float noise at the domain ends.
    let eps = step * 1e-9;
    let start = ((domain.lower() - eps) / step).ceil();
    let stop = ((domain.upper() + eps) / step).floor();
    if stop < start {
        return Vec::new();
    }
    let n = ((stop - start) as usize).min(10_000);
    (0..=n)
        .map(|i| {
            let v = (start + i as f64) * step;
            if v.abs() < eps { 0.0 } else { v }
        })
        .collect()
}

/// Round a raw step up or down to 1, 2, 5 or 10 times a power of ten.
#[must_use]
pub fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

fn decimals_for_step(step: f64) -> usize {
    if step <= 0.0 || step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    }
}

/// Fixed number of decimals, without a negative zero.
#[must_use]
pub fn format_fixed(v: f64, decimals: usize) -> String {
    let s = format!("{v:.decimals$}");
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

/// Three significant digits, trailing zeros trimmed.
#[must_use]
pub fn format_significant(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let magnitude = v.abs().log10().floor() as i32;
    if !(-4..6).contains(&magnitude) {
        return format!("{v:.2e}");
    }
    let decimals = (2 - magnitude).max(0) as usize;
    let s = format!("{v:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
