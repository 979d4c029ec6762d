// Sample source and clock traits for the producer side
use crate::domain::observation::Observation;
use chrono::{DateTime, Utc};

/// Produces one observation per tick.
///
/// Stands in for any external sensor or event feed. `now` is the call instant
/// supplied by the scheduler's clock and becomes the observation timestamp.
pub trait SampleSource: Send {
    fn next(&mut self, now: DateTime<Utc>) -> Observation;
}

impl<F> SampleSource for F
where
    F: FnMut(DateTime<Utc>) -> Observation + Send,
{
    fn next(&mut self, now: DateTime<Utc>) -> Observation {
        self(now)
    }
}

/// Source of "now" for timestamps and tick rate limiting.
///
/// Implementations must never go backwards.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
