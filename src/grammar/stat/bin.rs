//! Histogram binning.

use super::{empty_result, has_required_values, numeric_or, vars, Stat, StatContext};
use crate::error::Result;
use crate::geometry::Span;
use crate::grammar::aes::Aes;
use crate::grammar::data::{DataFrame, Variable};
use std::collections::BTreeMap;

const DEF_BIN_COUNT: usize = 30;

/// Counts observations in equal-width bins along x.
///
/// Bin width is explicit or derived from the bin count so that the first and
/// last bins are centered on the data extremes. `center` or `boundary` shift
/// the bin grid; `boundary` wins when both are set.
#[derive(Debug, Clone, PartialEq)]
pub struct BinStat {
    bin_count: usize,
    bin_width: Option<f64>,
    center: Option<f64>,
    boundary: Option<f64>,
}

impl Default for BinStat {
    fn default() -> Self {
        Self {
            bin_count: DEF_BIN_COUNT,
            bin_width: None,
            center: None,
            boundary: None,
        }
    }
}

impl BinStat {
    /// Thirty bins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bins (ignored when a width is set).
    #[must_use]
    pub fn bins(mut self, count: usize) -> Self {
        self.bin_count = count.max(1);
        self
    }

    /// Explicit bin width.
    #[must_use]
    pub fn bin_width(mut self, width: f64) -> Self {
        self.bin_width = Some(width).filter(|w| w.is_finite() && *w > 0.0);
        self
    }

    /// Center of one of the bins.
    #[must_use]
    pub fn center(mut self, center: f64) -> Self {
        self.center = Some(center);
        self
    }

    /// Edge of one of the bins.
    #[must_use]
    pub fn boundary(mut self, boundary: f64) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Start and width of the bin grid plus the number of bins covering `range`.
    fn grid(&self, range: Span) -> (f64, f64, usize) {
        let width = match self.bin_width {
            Some(w) => w,
            None if range.is_degenerate() => 1.0,
            None if self.bin_count > 1 => range.length() / (self.bin_count - 1) as f64,
            None => range.length(),
        };
        let boundary = self
            .boundary
            .or_else(|| self.center.map(|c| c - width / 2.0))
            .unwrap_or(range.lower() - width / 2.0);
        let start = boundary + ((range.lower() - boundary) / width).floor() * width;
        let count = (((range.upper() - start) / width).floor() as usize + 1).max(1);
        (start, width, count)
    }
}

impl Stat for BinStat {
    fn name(&self) -> &'static str {
        "bin"
    }

    fn consumes(&self) -> Vec<Aes> {
        vec![Aes::X, Aes::Weight]
    }

    fn default_mapping(&self) -> BTreeMap<Aes, Variable> {
        BTreeMap::from([(Aes::X, vars::X), (Aes::Y, vars::COUNT)])
    }

    fn apply(&self, data: &DataFrame, _: &StatContext, messages: &mut dyn FnMut(String)) -> Result<DataFrame> {
        if !has_required_values(data, &[Aes::X]) {
            return Ok(empty_result(self));
        }
        let xs = numeric_or(data, Aes::X, f64::NAN);
        let weights = numeric_or(data, Aes::Weight, 1.0);
        let Some(range) = Span::encloses(xs.iter().flatten().copied()) else {
            return Ok(empty_result(self));
        };

        let (start, width, count) = self.grid(range);
        if self.bin_width.is_none() && self.bin_count == DEF_BIN_COUNT {
            messages(format!("bin: using {count} bins, pick better value with `binwidth`"));
        }

        let mut counts = vec![0.0; count];
        for (x, w) in xs.iter().zip(&weights) {
            let Some(x) = x.filter(|x| x.is_finite()) else { continue };
            let i = (((x - start) / width).floor() as usize).min(count - 1);
            counts[i] += w.filter(|w| w.is_finite()).unwrap_or(0.0);
        }
        let total: f64 = counts.iter().sum();

        let centers = (0..count).map(|i| Some(start + width * (i as f64 + 0.5))).collect();
        let density = counts
            .iter()
            .map(|c| (total > 0.0).then(|| c / (total * width)))
            .collect();
        DataFrame::builder()
            .put_numeric(vars::X, centers)
            .put_numeric(vars::COUNT, counts.iter().map(|c| Some(*c)).collect())
            .put_numeric(vars::DENSITY, density)
            .put_numeric(vars::WIDTH, vec![Some(width); count])
            .build()
    }
}
