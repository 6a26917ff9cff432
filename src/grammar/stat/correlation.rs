//! Correlation matrix over the numeric columns of a layer.

use super::{vars, Stat, StatContext};
use crate::error::{Error, Result};
use crate::grammar::aes::Aes;
use crate::grammar::data::{DataFrame, DataValue, Variable};
use std::collections::BTreeMap;
use std::fmt;

/// Correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationMethod {
    /// Pearson product-moment correlation.
    #[default]
    Pearson,
    /// Spearman rank correlation (not implemented).
    Spearman,
    /// Kendall rank correlation (not implemented).
    Kendall,
}

impl CorrelationMethod {
    /// Parse a method name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pearson" => Some(Self::Pearson),
            "spearman" => Some(Self::Spearman),
            "kendall" => Some(Self::Kendall),
            _ => None,
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
            Self::Kendall => "kendall",
        })
    }
}

/// Which part of the matrix is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixType {
    /// Every pair.
    #[default]
    Full,
    /// Pairs above the diagonal.
    Upper,
    /// Pairs below the diagonal.
    Lower,
}

impl MatrixType {
    /// Parse a matrix type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "upper" => Some(Self::Upper),
            "lower" => Some(Self::Lower),
            _ => None,
        }
    }
}

/// Emits one row per variable pair: `..x..`, `..y..` (variable labels),
/// `..corr..` and `..corr_abs..`.
///
/// Cell `(x = vars[j], y = vars[i])` belongs to the upper triangle when
/// `j > i`. With `fill_diagonal` the diagonal cells are emitted with 1.0,
/// otherwise they are left out.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationStat {
    method: CorrelationMethod,
    matrix_type: MatrixType,
    fill_diagonal: bool,
}

impl Default for CorrelationStat {
    fn default() -> Self {
        Self {
            method: CorrelationMethod::Pearson,
            matrix_type: MatrixType::Full,
            fill_diagonal: true,
        }
    }
}

impl CorrelationStat {
    /// Full Pearson matrix with a filled diagonal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method.
    #[must_use]
    pub fn method(mut self, method: CorrelationMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the matrix part.
    #[must_use]
    pub fn matrix_type(mut self, matrix_type: MatrixType) -> Self {
        self.matrix_type = matrix_type;
        self
    }

    /// Emit diagonal cells.
    #[must_use]
    pub fn fill_diagonal(mut self, fill: bool) -> Self {
        self.fill_diagonal = fill;
        self
    }

    fn keeps(&self, i: usize, j: usize) -> bool {
        if i == j {
            return self.fill_diagonal;
        }
        match self.matrix_type {
            MatrixType::Full => true,
            MatrixType::Upper => j > i,
            MatrixType::Lower => j < i,
        }
    }
}

/// Pearson correlation over rows where both values are finite.
///
/// `None` with fewer than two complete rows or a constant series.
#[must_use]
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

impl Stat for CorrelationStat {
    fn name(&self) -> &'static str {
        "corr"
    }

    fn consumes(&self) -> Vec<Aes> {
        Vec::new()
    }

    fn default_mapping(&self) -> BTreeMap<Aes, Variable> {
        BTreeMap::from([
            (Aes::X, vars::X),
            (Aes::Y, vars::Y),
            (Aes::Color, vars::CORR),
            (Aes::Fill, vars::CORR),
            (Aes::Label, vars::CORR),
            (Aes::Size, vars::CORR_ABS),
        ])
    }

    fn apply(
        &self,
        data: &DataFrame,
        _ctx: &StatContext,
        _messages: &mut dyn FnMut(String),
    ) -> Result<DataFrame> {
        if self.method != CorrelationMethod::Pearson {
            return Err(Error::UnsupportedCorrelationMethod(self.method.to_string()));
        }

        let numeric: Vec<(&Variable, &[Option<f64>])> = data
            .variables()
            .filter(|v| v.is_origin())
            .filter_map(|v| data.numeric(v).map(|s| (v, s)))
            .collect();

        let mut xs: Vec<DataValue> = Vec::new();
        let mut ys: Vec<DataValue> = Vec::new();
        let mut corr: Vec<Option<f64>> = Vec::new();
        for (i, (row_var, row)) in numeric.iter().enumerate() {
            for (j, (col_var, col)) in numeric.iter().enumerate() {
                if !self.keeps(i, j) {
                    continue;
                }
                let r = if i == j { Some(1.0) } else { pearson(col, row) };
                xs.push(col_var.label().into());
                ys.push(row_var.label().into());
                corr.push(r);
            }
        }

        let corr_abs = corr.iter().map(|c| c.map(f64::abs)).collect();
        DataFrame::builder()
            .put_discrete(vars::X, xs)
            .put_discrete(vars::Y, ys)
            .put_numeric(vars::CORR, corr)
            .put_numeric(vars::CORR_ABS, corr_abs)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn data() -> DataFrame {
        DataFrame::builder()
            .put_numeric(Variable::origin("a"), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)])
            .put_numeric(Variable::origin("b"), vec![Some(2.0), Some(4.0), Some(6.0), Some(8.0)])
            .put_numeric(Variable::origin("c"), vec![Some(4.0), Some(3.0), Some(2.0), Some(1.0)])
            .put(Variable::origin("name"), vec!["p".into(), "q".into(), "r".into(), "s".into()])
            .build()
            .unwrap()
    }

    fn run(stat: &CorrelationStat) -> Result<DataFrame> {
        stat.apply(&data(), &StatContext::default(), &mut |_| {})
    }

    #[test]
    fn test_pearson() {
        let a = [Some(1.0), Some(2.0), Some(3.0)];
        assert_relative_eq!(pearson(&a, &[Some(2.0), Some(4.0), Some(6.0)]).unwrap(), 1.0);
        assert_relative_eq!(pearson(&a, &[Some(3.0), Some(2.0), Some(1.0)]).unwrap(), -1.0);
        assert_eq!(pearson(&a, &[Some(1.0), Some(1.0), Some(1.0)]), None);
        assert_eq!(pearson(&a[..1], &[Some(1.0)]), None);
    }

    #[test]
    fn test_full_matrix() {
        let out = run(&CorrelationStat::new()).unwrap();
        assert_eq!(out.row_count(), 9);
        let corr = out.numeric(&vars::CORR).unwrap();
        assert_relative_eq!(corr[1].unwrap(), 1.0); // (x=b, y=a)
        assert_relative_eq!(corr[2].unwrap(), -1.0); // (x=c, y=a)
        assert_eq!(out.value(&vars::X, 2), Some("c".into()));
        assert_eq!(out.value(&vars::Y, 2), Some("a".into()));
        assert!(!out.is_numeric(&vars::X));
        assert_relative_eq!(out.numeric(&vars::CORR_ABS).unwrap()[2].unwrap(), 1.0);
    }

    #[test]
    fn test_upper_without_diagonal() {
        let out = run(&CorrelationStat::new().matrix_type(MatrixType::Upper).fill_diagonal(false)).unwrap();
        assert_eq!(out.row_count(), 3);
        let pairs: Vec<(String, String)> = (0..3)
            .map(|i| {
                (
                    out.value(&vars::X, i).unwrap().to_string(),
                    out.value(&vars::Y, i).unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("b".to_string(), "a".to_string()),
                ("c".to_string(), "a".to_string()),
                ("c".to_string(), "b".to_string())
            ]
        );
    }

    #[test]
    fn test_lower_with_diagonal() {
        let out = run(&CorrelationStat::new().matrix_type(MatrixType::Lower)).unwrap();
        assert_eq!(out.row_count(), 6);
    }

    #[test]
    fn test_unsupported_method_fails() {
        let err = run(&CorrelationStat::new().method(CorrelationMethod::Spearman)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported correlation method: spearman (only Pearson is currently available)"
        );
    }

    #[test]
    fn test_consumes_nothing() {
        assert!(CorrelationStat::new().consumes().is_empty());
        assert_eq!(CorrelationStat::new().default_mapping_for(Aes::Fill), Some(vars::CORR));
    }
}
