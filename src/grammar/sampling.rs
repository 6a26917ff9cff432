//! Row sampling applied to a layer's post-stat data.

use super::data::DataFrame;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

/// Sampling strategy; applies only when the population exceeds the sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sampling {
    /// Keep every row.
    #[default]
    None,
    /// First `n` rows.
    Pick(usize),
    /// Every k-th row so that at most `n` rows remain.
    Systematic(usize),
    /// `n` rows chosen at random, original order kept.
    Random {
        /// Sample size.
        n: usize,
        /// Seed for reproducible samples.
        seed: u64,
    },
}

impl Sampling {
    /// Default seed of random sampling.
    pub const DEFAULT_SEED: u64 = 37;

    /// Parse `none`, `pick`, `systematic` or `random`.
    #[must_use]
    pub fn from_name(name: &str, n: usize, seed: Option<u64>) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "pick" => Some(Self::Pick(n)),
            "systematic" => Some(Self::Systematic(n)),
            "random" => Some(Self::Random { n, seed: seed.unwrap_or(Self::DEFAULT_SEED) }),
            _ => None,
        }
    }

    /// Text form, as shown in messages.
    #[must_use]
    pub fn expression_text(&self) -> String {
        match self {
            Self::None => "none".to_string(),
            Self::Pick(n) => format!("sampling_pick(n={n})"),
            Self::Systematic(n) => format!("sampling_systematic(n={n})"),
            Self::Random { n, seed } => format!("sampling_random(n={n}, seed={seed})"),
        }
    }

    fn sample_size(&self) -> Option<usize> {
        match *self {
            Self::None => None,
            Self::Pick(n) | Self::Systematic(n) | Self::Random { n, .. } => Some(n),
        }
    }

    /// Whether sampling would drop rows of `population`.
    #[must_use]
    pub fn is_applicable(&self, population: &DataFrame) -> bool {
        self.sample_size().is_some_and(|n| population.row_count() > n)
    }

    /// Sampled frame; `population` itself when not applicable.
    #[must_use]
    pub fn apply(&self, population: &DataFrame) -> DataFrame {
        if !self.is_applicable(population) {
            return population.clone();
        }
        let count = population.row_count();
        let sampled = match *self {
            Self::None => population.clone(),
            Self::Pick(n) => population.slice_by_rows(0, n),
            Self::Systematic(n) => {
                let step = count.div_ceil(n.max(1));
                let rows: Vec<usize> = (0..count).step_by(step.max(1)).take(n).collect();
                population.select_indices(&rows)
            }
            Self::Random { n, seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut rows = index::sample(&mut rng, count, n).into_vec();
                rows.sort_unstable();
                population.select_indices(&rows)
            }
        };
        log::warn!(
            "{}: {} of {} rows kept",
            self.expression_text(),
            sampled.row_count(),
            count
        );
        sampled
    }
}
