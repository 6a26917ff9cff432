//! Linear regression smoother.

use super::{empty_result, has_required_values, numeric_or, vars, Stat, StatContext};
use crate::error::Result;
use crate::grammar::aes::Aes;
use crate::grammar::data::{DataFrame, Variable};
use std::collections::BTreeMap;

/// Least-squares line evaluated on an evenly spaced x grid, with a
/// confidence band (`..ymin..`, `..ymax..`) and standard error (`..se..`).
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothStat {
    points: usize,
    se: bool,
    level: f64,
}

impl Default for SmoothStat {
    fn default() -> Self {
        Self {
            points: 80,
            se: true,
            level: 0.95,
        }
    }
}

impl SmoothStat {
    /// 80 points with a 95% band.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of evaluation points.
    #[must_use]
    pub fn points(mut self, n: usize) -> Self {
        self.points = n.max(2);
        self
    }

    /// Emit the confidence band.
    #[must_use]
    pub fn se(mut self, se: bool) -> Self {
        self.se = se;
        self
    }

    /// Confidence level of the band.
    #[must_use]
    pub fn level(mut self, level: f64) -> Self {
        self.level = level.clamp(0.5, 0.999);
        self
    }
}

/// Result of an ordinary least squares fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Intercept.
    pub intercept: f64,
    /// Slope.
    pub slope: f64,
    /// Residual standard error.
    pub sigma: f64,
    /// Number of observations.
    pub n: usize,
    /// Mean of x.
    pub mean_x: f64,
    /// Sum of squared x deviations.
    pub sxx: f64,
}

impl LinearFit {
    /// Fit `y = a + b x`; `None` with fewer than three points or constant x.
    #[must_use]
    pub fn fit(pairs: &[(f64, f64)]) -> Option<Self> {
        let n = pairs.len();
        if n < 3 {
            return None;
        }
        let nf = n as f64;
        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;
        let sxx: f64 = pairs.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = pairs.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let sse: f64 = pairs
            .iter()
            .map(|p| (p.1 - intercept - slope * p.0).powi(2))
            .sum();
        Some(Self {
            intercept,
            slope,
            sigma: (sse / (nf - 2.0)).sqrt(),
            n,
            mean_x,
            sxx,
        })
    }

    /// Predicted y.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Standard error of the fitted mean at `x`.
    #[must_use]
    pub fn se_fit(&self, x: f64) -> f64 {
        self.sigma * (1.0 / self.n as f64 + (x - self.mean_x).powi(2) / self.sxx).sqrt()
    }
}

/// Inverse of the standard normal CDF (Acklam's rational approximation).
fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };
    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// Student t quantile via the Cornish-Fisher expansion around the normal quantile.
fn t_quantile(p: f64, df: f64) -> f64 {
    let z = normal_quantile(p);
    let z3 = z.powi(3);
    let z5 = z.powi(5);
    let z7 = z.powi(7);
    z + (z3 + z) / (4.0 * df)
        + (5.0 * z5 + 16.0 * z3 + 3.0 * z) / (96.0 * df * df)
        + (3.0 * z7 + 19.0 * z5 + 17.0 * z3 - 15.0 * z) / (384.0 * df.powi(3))
}

impl Stat for SmoothStat {
    fn name(&self) -> &'static str {
        "smooth"
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

    fn apply(&self, data: &DataFrame, _: &StatContext, messages: &mut dyn FnMut(String)) -> Result<DataFrame> {
        if !has_required_values(data, &[Aes::X, Aes::Y]) {
            return Ok(empty_result(self));
        }
        let xs = numeric_or(data, Aes::X, f64::NAN);
        let ys = numeric_or(data, Aes::Y, f64::NAN);
        let pairs: Vec<(f64, f64)> = xs
            .iter()
            .zip(&ys)
            .filter_map(|(x, y)| match (x, y) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
                _ => None,
            })
            .collect();
        let Some(fit) = LinearFit::fit(&pairs) else {
            messages(format!("smooth: {} usable points, need at least 3 distinct x", pairs.len()));
            return Ok(empty_result(self));
        };

        let (lo, hi) = pairs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
        let step = (hi - lo) / (self.points - 1) as f64;
        let grid: Vec<f64> = (0..self.points).map(|i| lo + step * i as f64).collect();
        let crit = t_quantile((1.0 + self.level) / 2.0, (fit.n - 2) as f64);

        let y: Vec<Option<f64>> = grid.iter().map(|x| Some(fit.predict(*x))).collect();
        let se: Vec<Option<f64>> = grid.iter().map(|x| Some(fit.se_fit(*x))).collect();
        let band = |sign: f64| -> Vec<Option<f64>> {
            grid.iter()
                .map(|x| self.se.then(|| fit.predict(*x) + sign * crit * fit.se_fit(*x)))
                .collect()
        };
        DataFrame::builder()
            .put_numeric(vars::X, grid.iter().map(|x| Some(*x)).collect())
            .put_numeric(vars::Y, y)
            .put_numeric(vars::Y_MIN, band(-1.0))
            .put_numeric(vars::Y_MAX, band(1.0))
            .put_numeric(vars::SE, se)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_exact_line() {
        let pairs: Vec<(f64, f64)> = (0..5).map(|i| (f64::from(i), 2.0 * f64::from(i) + 1.0)).collect();
        let fit = LinearFit::fit(&pairs).unwrap();
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.sigma, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_requires_spread() {
        assert!(LinearFit::fit(&[(1.0, 1.0), (1.0, 2.0), (1.0, 3.0)]).is_none());
        assert!(LinearFit::fit(&[(1.0, 1.0), (2.0, 2.0)]).is_none());
    }

    #[test]
    fn test_quantiles() {
        assert_relative_eq!(normal_quantile(0.975), 1.959_964, epsilon = 1e-5);
        assert_relative_eq!(normal_quantile(0.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(t_quantile(0.975, 30.0), 2.0423, epsilon = 1e-3);
    }

    #[test]
    fn test_smooth_grid_and_band() {
        let data = frame(&[
            (Aes::X, some(&[0.0, 1.0, 2.0, 3.0, 4.0])),
            (Aes::Y, some(&[0.1, 0.9, 2.2, 2.8, 4.1])),
        ]);
        let out = apply(&SmoothStat::new().points(5), &data);
        assert_eq!(out.row_count(), 5);
        let x = out.numeric(&vars::X).unwrap();
        assert_eq!(x[0], Some(0.0));
        assert_eq!(x[4], Some(4.0));
        let y = out.numeric(&vars::Y).unwrap();
        let lo = out.numeric(&vars::Y_MIN).unwrap();
        let hi = out.numeric(&vars::Y_MAX).unwrap();
        for i in 0..5 {
            assert!(lo[i].unwrap() < y[i].unwrap());
            assert!(hi[i].unwrap() > y[i].unwrap());
        }
    }

    #[test]
    fn test_smooth_without_band() {
        let data = frame(&[(Aes::X, some(&[0.0, 1.0, 2.0])), (Aes::Y, some(&[0.0, 1.0, 3.0]))]);
        let out = apply(&SmoothStat::new().se(false), &data);
        assert!(out.numeric(&vars::Y_MIN).unwrap().iter().all(Option::is_none));
    }

    #[test]
    fn test_too_few_points() {
        let mut notes = Vec::new();
        let data = frame(&[(Aes::X, some(&[0.0, 1.0])), (Aes::Y, some(&[0.0, 1.0]))]);
        let out = SmoothStat::new()
            .apply(&data, &StatContext::default(), &mut |m| notes.push(m))
            .unwrap();
        assert_eq!(out.row_count(), 0);
        assert_eq!(notes.len(), 1);
    }
}
