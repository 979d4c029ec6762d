// Window buffer - fixed-capacity, oldest-first ring of observations
use super::chart::MAX_TICK_COUNT;
use super::observation::Observation;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::VecDeque;

/// Sliding window holding exactly `capacity` observations, oldest first.
///
/// The window is never empty and never grows: every push evicts exactly one
/// observation. Timestamps are non-decreasing in buffer order.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    observations: VecDeque<Observation>,
    capacity: usize,
}

impl Window {
    /// Seed a window with `capacity` observations spaced one `tick` apart, the
    /// newest taken exactly at `start`.
    ///
    /// # Panics
    /// Panics if `capacity < 2` or `capacity > MAX_TICK_COUNT`.
    pub fn initialize<F>(capacity: usize, start: DateTime<Utc>, tick: TimeDelta, mut sample: F) -> Self
    where
        F: FnMut(DateTime<Utc>) -> Observation,
    {
        assert!(capacity >= 2, "window capacity must be at least 2, got {capacity}");
        let newest = i32::try_from(capacity - 1)
            .ok()
            .filter(|&n| n < MAX_TICK_COUNT as i32)
            .unwrap_or_else(|| panic!("window capacity {capacity} exceeds {MAX_TICK_COUNT}"));

        let observations = (0..=newest)
            .map(|i| sample(start - tick * (newest - i)))
            .collect();

        let window = Self {
            observations,
            capacity,
        };
        window.assert_ordered();
        window
    }

    /// Build a window from an explicit oldest-first sequence.
    ///
    /// # Panics
    /// Panics on fewer than two observations or out-of-order timestamps.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        assert!(
            observations.len() >= 2,
            "window capacity must be at least 2, got {}",
            observations.len()
        );
        let capacity = observations.len();
        let window = Self {
            observations: observations.into(),
            capacity,
        };
        window.assert_ordered();
        window
    }

    /// Append `observation` as the newest entry and evict the oldest one.
    ///
    /// # Panics
    /// Panics if `observation` is older than the current newest entry; the
    /// scheduler must only ever move time forward.
    pub fn push(&mut self, observation: Observation) -> Observation {
        let newest = self.newest().timestamp();
        assert!(
            observation.timestamp() >= newest,
            "non-monotonic push: {} is older than newest {}",
            observation.timestamp(),
            newest
        );

        // Overwrite the oldest slot, then rotate it to the back.
        let evicted = std::mem::replace(&mut self.observations[0], observation);
        self.observations.rotate_left(1);
        evicted
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Observation> + '_ {
        self.observations.iter()
    }

    pub fn oldest(&self) -> &Observation {
        &self.observations[0]
    }

    pub fn newest(&self) -> &Observation {
        &self.observations[self.observations.len() - 1]
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(Observation::value).collect()
    }

    fn assert_ordered(&self) {
        let ordered = self
            .observations
            .iter()
            .zip(self.observations.iter().skip(1))
            .all(|(a, b)| a.timestamp() <= b.timestamp());
        assert!(ordered, "window observations must be oldest-first");
    }
}

impl<'a> IntoIterator for &'a Window {
    type Item = &'a Observation;
    type IntoIter = std::collections::vec_deque::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
