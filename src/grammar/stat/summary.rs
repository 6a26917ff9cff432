//! Per-x aggregation of y values.

use super::{bin_by_key, empty_result, has_required_values, numeric_or, vars, Stat, StatContext};
use crate::error::Result;
use crate::grammar::aes::Aes;
use crate::grammar::data::{DataFrame, Variable};
use std::collections::BTreeMap;

/// Aggregation applied to one sorted bin of y values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateFunction {
    /// Number of values.
    Count,
    /// Sum.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Median (quantile 0.5).
    Median,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Quantile at the given probability.
    Quantile(f64),
}

impl AggregateFunction {
    /// Parse a function name (`mean`, `median`, `q1`, `q3`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.trim().to_ascii_lowercase().as_str() {
            "count" => Self::Count,
            "sum" => Self::Sum,
            "mean" => Self::Mean,
            "median" => Self::Median,
            "min" => Self::Min,
            "max" => Self::Max,
            "q1" | "lq" => Self::Quantile(0.25),
            "q3" | "uq" => Self::Quantile(0.75),
            _ => return None,
        })
    }

    /// Apply to ascending values; `None` for an empty bin.
    #[must_use]
    pub fn apply(self, sorted: &[f64]) -> Option<f64> {
        if sorted.is_empty() {
            return None;
        }
        Some(match self {
            Self::Count => sorted.len() as f64,
            Self::Sum => sorted.iter().sum(),
            Self::Mean => sorted.iter().sum::<f64>() / sorted.len() as f64,
            Self::Median => quantile(sorted, 0.5),
            Self::Min => sorted[0],
            Self::Max => sorted[sorted.len() - 1],
            Self::Quantile(p) => quantile(sorted, p),
        })
    }
}

/// Quantile with linear interpolation between order statistics at rank `p * (n - 1)`.
#[must_use]
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Groups finite `(x, y)` pairs by exact x and aggregates each bin.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStat {
    y_function: AggregateFunction,
    y_min_function: AggregateFunction,
    y_max_function: AggregateFunction,
    quantiles: (f64, f64, f64),
}

impl Default for SummaryStat {
    fn default() -> Self {
        Self {
            y_function: AggregateFunction::Mean,
            y_min_function: AggregateFunction::Min,
            y_max_function: AggregateFunction::Max,
            quantiles: (0.25, 0.5, 0.75),
        }
    }
}

impl SummaryStat {
    /// Mean with min/max bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Functions for `..y..`, `..ymin..` and `..ymax..`.
    #[must_use]
    pub fn with_functions(
        mut self,
        y: AggregateFunction,
        y_min: AggregateFunction,
        y_max: AggregateFunction,
    ) -> Self {
        self.y_function = y;
        self.y_min_function = y_min;
        self.y_max_function = y_max;
        self
    }

    /// Probabilities for `..lower..`, `..middle..` and `..upper..`.
    #[must_use]
    pub fn with_quantiles(mut self, lower: f64, middle: f64, upper: f64) -> Self {
        self.quantiles = (lower, middle, upper);
        self
    }

    fn extra_function(&self, var: &Variable) -> Option<AggregateFunction> {
        let (lower, middle, upper) = self.quantiles;
        if *var == vars::LOWER {
            Some(AggregateFunction::Quantile(lower))
        } else if *var == vars::MIDDLE {
            Some(AggregateFunction::Quantile(middle))
        } else if *var == vars::UPPER {
            Some(AggregateFunction::Quantile(upper))
        } else {
            None
        }
    }
}

impl Stat for SummaryStat {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn consumes(&self) -> Vec<Aes> {
        vec![Aes::X, Aes::Y]
    }

    fn default_mapping(&self) -> BTreeMap<Aes, Variable> {
        BTreeMap::from([
            (Aes::X, vars::X),
            (Aes::Y, vars::Y),
            (Aes::YMin, vars::Y_MIN),
            (Aes::YMax, vars::Y_MAX),
        ])
    }

    fn apply(
        &self,
        data: &DataFrame,
        ctx: &StatContext,
        _messages: &mut dyn FnMut(String),
    ) -> Result<DataFrame> {
        if !has_required_values(data, &[Aes::Y]) {
            return Ok(empty_result(self));
        }
        let ys = numeric_or(data, Aes::Y, f64::NAN);
        let xs = numeric_or(data, Aes::X, 0.0);

        let pairs = xs.iter().zip(&ys).filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        });
        let mut bins = bin_by_key(pairs);
        if bins.is_empty() {
            return Ok(empty_result(self));
        }
        for (_, values) in &mut bins {
            values.sort_by(f64::total_cmp);
        }

        let mut outputs: Vec<(Variable, AggregateFunction)> = vec![
            (vars::Y, self.y_function),
            (vars::Y_MIN, self.y_min_function),
            (vars::Y_MAX, self.y_max_function),
        ];
        for var in ctx.mapped_stat_variables() {
            if let Some(f) = self.extra_function(var) {
                if !outputs.iter().any(|(v, _)| v == var) {
                    outputs.push((var.clone(), f));
                }
            }
        }

        let mut builder =
            DataFrame::builder().put_numeric(vars::X, bins.iter().map(|(x, _)| Some(*x)).collect());
        for (var, f) in outputs {
            let values = bins.iter().map(|(_, ys)| f.apply(ys)).collect();
            builder = builder.put_numeric(var, values);
        }
        builder.build()
    }
}
