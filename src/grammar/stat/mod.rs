//! Statistical transformations.
//!
//! A stat turns a layer's data (already holding transformed aesthetic values
//! under [`Variable::transform`] names) into derived series, and declares
//! which aesthetics those series feed by default.
//!
//! Stats never fail on sparse data: when the aesthetics they consume are
//! absent or non-numeric they return a frame holding every output variable
//! and zero rows.

mod bin;
mod correlation;
mod count;
mod smooth;
mod summary;

pub use bin::BinStat;
pub use correlation::{CorrelationMethod, CorrelationStat, MatrixType};
pub use count::{Count2dStat, CountStat};
pub use smooth::SmoothStat;
pub use summary::{AggregateFunction, SummaryStat};

use super::aes::Aes;
use super::data::{DataFrame, Variable};
use crate::error::{Error, Result};
use crate::geometry::Span;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Stat output variables.
pub mod vars {
    use crate::grammar::data::Variable;

    /// Computed x.
    pub const X: Variable = Variable::stat("..x..", "x");
    /// Computed y.
    pub const Y: Variable = Variable::stat("..y..", "y");
    /// Number of observations.
    pub const COUNT: Variable = Variable::stat("..count..", "count");
    /// Share of observations.
    pub const PROP: Variable = Variable::stat("..prop..", "prop");
    /// Density estimate.
    pub const DENSITY: Variable = Variable::stat("..density..", "density");
    /// Lower bound of y.
    pub const Y_MIN: Variable = Variable::stat("..ymin..", "ymin");
    /// Upper bound of y.
    pub const Y_MAX: Variable = Variable::stat("..ymax..", "ymax");
    /// Lower hinge.
    pub const LOWER: Variable = Variable::stat("..lower..", "lower");
    /// Median.
    pub const MIDDLE: Variable = Variable::stat("..middle..", "middle");
    /// Upper hinge.
    pub const UPPER: Variable = Variable::stat("..upper..", "upper");
    /// Standard error.
    pub const SE: Variable = Variable::stat("..se..", "se");
    /// Bin width.
    pub const WIDTH: Variable = Variable::stat("..width..", "width");
    /// Correlation coefficient.
    pub const CORR: Variable = Variable::stat("..corr..", "corr");
    /// Absolute correlation coefficient.
    pub const CORR_ABS: Variable = Variable::stat("..corr_abs..", "corr_abs");

    /// Every stat variable.
    pub const ALL: [Variable; 14] = [
        X, Y, COUNT, PROP, DENSITY, Y_MIN, Y_MAX, LOWER, MIDDLE, UPPER, SE, WIDTH, CORR, CORR_ABS,
    ];

    /// Find a stat variable by name (`..count..`).
    #[must_use]
    pub fn by_name(name: &str) -> Option<Variable> {
        ALL.into_iter().find(|v| v.name() == name)
    }
}

/// Information a stat may need beyond its own data.
#[derive(Debug, Clone, Default)]
pub struct StatContext {
    x_range: Option<Span>,
    y_range: Option<Span>,
    mapped_stat_variables: Vec<Variable>,
}

impl StatContext {
    /// Context with overall transformed ranges.
    #[must_use]
    pub fn new(x_range: Option<Span>, y_range: Option<Span>) -> Self {
        Self {
            x_range,
            y_range,
            mapped_stat_variables: Vec::new(),
        }
    }

    /// Stat variables the user bound explicitly (`y = "..middle.."`).
    #[must_use]
    pub fn with_mapped_stat_variables(mut self, vars: Vec<Variable>) -> Self {
        self.mapped_stat_variables = vars;
        self
    }

    /// Overall transformed x range across the stitched layers.
    #[must_use]
    pub fn x_range(&self) -> Option<Span> {
        self.x_range
    }

    /// Overall transformed y range across the stitched layers.
    #[must_use]
    pub fn y_range(&self) -> Option<Span> {
        self.y_range
    }

    /// Stat variables mapped explicitly.
    #[must_use]
    pub fn mapped_stat_variables(&self) -> &[Variable] {
        &self.mapped_stat_variables
    }
}

/// A statistical transformation.
pub trait Stat: Debug + Send + Sync {
    /// Short name, as used in plot specifications.
    fn name(&self) -> &'static str;

    /// Aesthetics read from the input frame.
    fn consumes(&self) -> Vec<Aes>;

    /// Output variable feeding each aesthetic unless the caller overrides it.
    fn default_mapping(&self) -> BTreeMap<Aes, Variable>;

    /// Compute the derived frame.
    ///
    /// `messages` receives human-readable notes (dropped rows, fallbacks).
    fn apply(
        &self,
        data: &DataFrame,
        ctx: &StatContext,
        messages: &mut dyn FnMut(String),
    ) -> Result<DataFrame>;

    /// Whether the stat maps `aes` by default.
    fn has_default_mapping(&self, aes: Aes) -> bool {
        self.default_mapping().contains_key(&aes)
    }

    /// Default variable for `aes`.
    fn default_mapping_for(&self, aes: Aes) -> Option<Variable> {
        self.default_mapping().remove(&aes)
    }

    /// Whether this stat passes its input through unchanged.
    fn is_identity(&self) -> bool {
        false
    }
}

/// Passes data through.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStat;

impl Stat for IdentityStat {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn consumes(&self) -> Vec<Aes> {
        Vec::new()
    }

    fn default_mapping(&self) -> BTreeMap<Aes, Variable> {
        BTreeMap::new()
    }

    fn apply(&self, data: &DataFrame, _: &StatContext, _: &mut dyn FnMut(String)) -> Result<DataFrame> {
        Ok(data.clone())
    }

    fn is_identity(&self) -> bool {
        true
    }
}

/// Stat with default settings, by the name used in plot specifications.
///
/// # Errors
///
/// Returns [`Error::InvalidSpec`] for an unknown name.
pub fn from_name(name: &str) -> Result<Arc<dyn Stat>> {
    Ok(match name.trim().to_ascii_lowercase().as_str() {
        "identity" => Arc::new(IdentityStat),
        "count" => Arc::new(CountStat),
        "count2d" => Arc::new(Count2dStat),
        "bin" => Arc::new(BinStat::new()),
        "smooth" => Arc::new(SmoothStat::new()),
        "summary" => Arc::new(SummaryStat::new()),
        "corr" => Arc::new(CorrelationStat::new()),
        other => return Err(Error::InvalidSpec(format!("unknown stat '{other}'"))),
    })
}

/// Whether every aesthetic has a numeric transformed series in `data`.
pub(crate) fn has_required_values(data: &DataFrame, aes: &[Aes]) -> bool {
    aes.iter().all(|a| data.is_numeric(&Variable::transform(*a)))
}

/// Zero-row frame holding `vars`.
pub(crate) fn empty_frame(vars: &[Variable]) -> DataFrame {
    vars.iter()
        .fold(DataFrame::builder(), |b, v| b.put_numeric(v.clone(), Vec::new()))
        .build()
        .unwrap_or_default()
}

/// Zero-row frame holding every variable a stat maps by default.
pub(crate) fn empty_result(stat: &dyn Stat) -> DataFrame {
    let mut vars: Vec<Variable> = Vec::new();
    for v in stat.default_mapping().into_values() {
        if !vars.contains(&v) {
            vars.push(v);
        }
    }
    empty_frame(&vars)
}

/// Numeric transformed series of `aes`, or a constant series when absent.
pub(crate) fn numeric_or(data: &DataFrame, aes: Aes, fallback: f64) -> Vec<Option<f64>> {
    data.numeric(&Variable::transform(aes))
        .map_or_else(|| vec![Some(fallback); data.row_count()], <[Option<f64>]>::to_vec)
}

/// Split `(key, value)` pairs into bins by exact key, bins in first-encounter order.
pub(crate) fn bin_by_key<K: PartialEq + Copy>(pairs: impl IntoIterator<Item = (K, f64)>) -> Vec<(K, Vec<f64>)> {
    let mut bins: Vec<(K, Vec<f64>)> = Vec::new();
    for (k, v) in pairs {
        match bins.iter_mut().find(|(key, _)| *key == k) {
            Some((_, values)) => values.push(v),
            None => bins.push((k, vec![v])),
        }
    }
    bins
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Frame with transformed series for the given aesthetics.
    pub(crate) fn frame(columns: &[(Aes, Vec<Option<f64>>)]) -> DataFrame {
        columns
            .iter()
            .fold(DataFrame::builder(), |b, (aes, values)| {
                b.put_numeric(Variable::transform(*aes), values.clone())
            })
            .build()
            .expect("equal lengths")
    }

    pub(crate) fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|v| Some(*v)).collect()
    }

    pub(crate) fn apply(stat: &dyn Stat, data: &DataFrame) -> DataFrame {
        stat.apply(data, &StatContext::default(), &mut |_| {}).expect("stat applies")
    }
}
