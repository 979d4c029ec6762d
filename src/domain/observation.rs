// Observation domain model
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One sampled value and the instant it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    value: f64,
    timestamp: DateTime<Utc>,
}

impl Observation {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
