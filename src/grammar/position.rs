//! Position adjustments applied to mapped aesthetics before geoms render.

use super::aes::{Aes, AesValue};
use super::aesthetics::{Aesthetics, DataPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Moves data points that would otherwise overlap.
///
/// Widths and offsets are in units of the x resolution (the smallest gap
/// between distinct x values of the layer).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionAdjustment {
    /// Leave positions alone.
    #[default]
    Identity,
    /// Stack y values sharing an x; positive and negative values stack apart.
    Stack,
    /// Place groups sharing an x side by side.
    Dodge {
        /// Total dodge width; the point's width when unset.
        width: Option<f64>,
    },
    /// Random offsets.
    Jitter {
        /// Largest horizontal offset.
        width: f64,
        /// Largest vertical offset (y data units).
        height: f64,
        /// Random seed.
        seed: u64,
    },
}

impl PositionAdjustment {
    /// Jitter with the usual 0.4 resolution spread.
    #[must_use]
    pub fn jitter() -> Self {
        Self::Jitter { width: 0.4, height: 0.0, seed: 42 }
    }

    /// Parse `identity`, `stack`, `dodge` or `jitter`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "identity" => Some(Self::Identity),
            "stack" => Some(Self::Stack),
            "dodge" => Some(Self::Dodge { width: None }),
            "jitter" => Some(Self::jitter()),
            _ => None,
        }
    }

    /// Name as used in plot specifications.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Stack => "stack",
            Self::Dodge { .. } => "dodge",
            Self::Jitter { .. } => "jitter",
        }
    }

    /// Adjusted copy of `aesthetics`.
    #[must_use]
    pub fn apply(&self, aesthetics: &Aesthetics, x_resolution: f64) -> Aesthetics {
        match *self {
            Self::Identity => aesthetics.clone(),
            Self::Stack => stack(aesthetics),
            Self::Dodge { width } => dodge(aesthetics, width),
            Self::Jitter { width, height, seed } => jitter(aesthetics, width * x_resolution, height, seed),
        }
    }
}

fn stack(aesthetics: &Aesthetics) -> Aesthetics {
    // Per x: running top of the positive and the negative stack.
    let mut tops: HashMap<u64, (f64, f64)> = HashMap::new();
    let points = aesthetics
        .points()
        .iter()
        .map(|p| {
            let (Some(x), Some(y)) = (p.x(), p.y()) else {
                return p.clone();
            };
            let (pos, neg) = tops.entry(x.to_bits()).or_insert((0.0, 0.0));
            let base = if y >= 0.0 { pos } else { neg };
            let lower = *base;
            *base += y;
            let mut q = p.clone();
            q.set(Aes::Y, AesValue::Number(*base));
            q.set(Aes::YMin, AesValue::Number(lower.min(*base)));
            q.set(Aes::YMax, AesValue::Number(lower.max(*base)));
            q
        })
        .collect();
    Aesthetics::new(points)
}

fn dodge(aesthetics: &Aesthetics, width: Option<f64>) -> Aesthetics {
    let mut groups: Vec<usize> = Vec::new();
    for p in aesthetics.points() {
        if !groups.contains(&p.group()) {
            groups.push(p.group());
        }
    }
    let n = groups.len();
    if n < 2 {
        return aesthetics.clone();
    }
    let points = aesthetics
        .points()
        .iter()
        .map(|p| {
            let Some(x) = p.x() else {
                return p.clone();
            };
            let own = p.number(Aes::Width).unwrap_or(0.9);
            let total = width.unwrap_or(own);
            let slot = groups.iter().position(|g| *g == p.group()).unwrap_or(0);
            let step = total / n as f64;
            let mut q: DataPoint = p.clone();
            q.set(Aes::X, AesValue::Number(x - total / 2.0 + step * (slot as f64 + 0.5)));
            q.set(Aes::Width, AesValue::Number(own / n as f64));
            q
        })
        .collect();
    Aesthetics::new(points)
}

fn jitter(aesthetics: &Aesthetics, dx: f64, dy: f64, seed: u64) -> Aesthetics {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut offset = |spread: f64| if spread > 0.0 { rng.random_range(-spread..=spread) } else { 0.0 };
    let points = aesthetics
        .points()
        .iter()
        .map(|p| {
            let mut q = p.clone();
            let (ox, oy) = (offset(dx), offset(dy));
            if let Some(x) = p.x() {
                q.set(Aes::X, AesValue::Number(x + ox));
            }
            if let Some(y) = p.y() {
                q.set(Aes::Y, AesValue::Number(y + oy));
            }
            q
        })
        .collect();
    Aesthetics::new(points)
}
