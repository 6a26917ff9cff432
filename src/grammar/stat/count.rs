//! Counting stats.

use super::{bin_by_key, empty_result, has_required_values, numeric_or, vars, Stat, StatContext};
use crate::error::Result;
use crate::grammar::aes::Aes;
use crate::grammar::data::{DataFrame, Variable};
use std::collections::BTreeMap;

/// Weighted count per distinct x, sorted by x.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountStat;

impl Stat for CountStat {
    fn name(&self) -> &'static str {
        "count"
    }

    fn consumes(&self) -> Vec<Aes> {
        vec![Aes::X, Aes::Weight]
    }

    fn default_mapping(&self) -> BTreeMap<Aes, Variable> {
        BTreeMap::from([(Aes::X, vars::X), (Aes::Y, vars::COUNT)])
    }

    fn apply(&self, data: &DataFrame, _: &StatContext, _: &mut dyn FnMut(String)) -> Result<DataFrame> {
        if !has_required_values(data, &[Aes::X]) {
            return Ok(empty_result(self));
        }
        let xs = numeric_or(data, Aes::X, f64::NAN);
        let weights = numeric_or(data, Aes::Weight, 1.0);
        let pairs = xs.iter().zip(&weights).filter_map(|(x, w)| match x {
            Some(x) if x.is_finite() => Some((*x, w.filter(|w| w.is_finite()).unwrap_or(0.0))),
            _ => None,
        });
        let mut bins = bin_by_key(pairs);
        bins.sort_by(|a, b| a.0.total_cmp(&b.0));

        let counts: Vec<f64> = bins.iter().map(|(_, w)| w.iter().sum()).collect();
        let total: f64 = counts.iter().sum();
        DataFrame::builder()
            .put_numeric(vars::X, bins.iter().map(|(x, _)| Some(*x)).collect())
            .put_numeric(vars::COUNT, counts.iter().map(|c| Some(*c)).collect())
            .put_numeric(vars::PROP, counts.iter().map(|c| proportion(*c, total)).collect())
            .build()
    }
}

/// Weighted count per distinct `(x, y)` pair, in first-encounter order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count2dStat;

impl Stat for Count2dStat {
    fn name(&self) -> &'static str {
        "count2d"
    }

    fn consumes(&self) -> Vec<Aes> {
        vec![Aes::X, Aes::Y, Aes::Weight]
    }

    fn default_mapping(&self) -> BTreeMap<Aes, Variable> {
        BTreeMap::from([
            (Aes::X, vars::X),
            (Aes::Y, vars::Y),
            (Aes::Slice, vars::COUNT),
        ])
    }

    fn apply(&self, data: &DataFrame, _: &StatContext, _: &mut dyn FnMut(String)) -> Result<DataFrame> {
        if !has_required_values(data, &[Aes::X, Aes::Y]) {
            return Ok(empty_result(self));
        }
        let xs = numeric_or(data, Aes::X, f64::NAN);
        let ys = numeric_or(data, Aes::Y, f64::NAN);
        let weights = numeric_or(data, Aes::Weight, 1.0);
        let triples = xs.iter().zip(&ys).zip(&weights).filter_map(|((x, y), w)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                Some(((*x, *y), w.filter(|w| w.is_finite()).unwrap_or(0.0)))
            }
            _ => None,
        });
        let bins = bin_by_key(triples);

        let counts: Vec<f64> = bins.iter().map(|(_, w)| w.iter().sum()).collect();
        let total: f64 = counts.iter().sum();
        DataFrame::builder()
            .put_numeric(vars::X, bins.iter().map(|((x, _), _)| Some(*x)).collect())
            .put_numeric(vars::Y, bins.iter().map(|((_, y), _)| Some(*y)).collect())
            .put_numeric(vars::COUNT, counts.iter().map(|c| Some(*c)).collect())
            .put_numeric(vars::PROP, counts.iter().map(|c| proportion(*c, total)).collect())
            .build()
    }
}

fn proportion(count: f64, total: f64) -> Option<f64> {
    (total > 0.0).then(|| count / total)
}
