// Synthetic sample feed - uniform random values within a chart's domain
use crate::application::sample_source::SampleSource;
use crate::domain::chart::ValueDomain;
use crate::domain::observation::Observation;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

/// Distribution of generated values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Whole numbers in `[ceil(min), floor(max)]`.
    #[default]
    Integer,
    /// Reals in `[min, max]`.
    Real,
}

/// Uniform random feed standing in for a real sensor.
#[derive(Debug, Clone)]
pub struct RandomSampleGenerator<R = StdRng> {
    domain: ValueDomain,
    kind: ValueKind,
    rng: R,
}

impl RandomSampleGenerator<StdRng> {
    pub fn seeded(domain: ValueDomain, kind: ValueKind, seed: u64) -> Self {
        Self::with_rng(domain, kind, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(domain: ValueDomain, kind: ValueKind) -> Self {
        Self::with_rng(domain, kind, StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSampleGenerator<R> {
    pub fn with_rng(domain: ValueDomain, kind: ValueKind, rng: R) -> Self {
        Self { domain, kind, rng }
    }

    fn draw(&mut self) -> f64 {
        let ValueDomain { min, max } = self.domain;
        match self.kind {
            ValueKind::Integer => {
                let (lo, hi) = (min.ceil() as i64, max.floor() as i64);
                if lo > hi {
                    return min;
                }
                self.rng.gen_range(lo..=hi) as f64
            }
            ValueKind::Real => {
                if min >= max {
                    return min;
                }
                self.rng.gen_range(min..=max)
            }
        }
    }
}

impl<R: Rng + Send> SampleSource for RandomSampleGenerator<R> {
    fn next(&mut self, now: DateTime<Utc>) -> Observation {
        Observation::new(self.draw(), now)
    }
}
