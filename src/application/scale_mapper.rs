// Scale mapper - linear time/value scales from domain units to canvas pixels
use crate::domain::chart::{ChartParams, PixelRange};
use crate::domain::geometry::ScaledPoint;
use crate::domain::observation::Observation;
use chrono::{DateTime, TimeDelta, Utc};

/// Strictly linear map from a numeric domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: PixelRange,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: PixelRange) -> Self {
        Self { domain, range }
    }

    /// Map `x` into pixel space. Both domain bounds land exactly on the range
    /// bounds; a zero-width domain maps everything to the range midpoint.
    /// Values outside the domain extrapolate past the range.
    pub fn map(&self, x: f64) -> f64 {
        let (lo, hi) = self.domain;
        if hi == lo {
            return self.range.midpoint();
        }
        let t = (x - lo) / (hi - lo);
        self.range.start * (1.0 - t) + self.range.end * t
    }
}

/// Time and value scales of one chart, frozen at a given instant.
///
/// The time domain trails `now` by `time_lag_ticks` and spans
/// `time_span_ticks`, so the visible window scrolls at a steady rate
/// regardless of the literal timestamps held in the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleMapper {
    time_start: DateTime<Utc>,
    time_end: DateTime<Utc>,
    time: LinearScale,
    value: LinearScale,
    grid_values: Vec<f64>,
}

impl ScaleMapper {
    pub fn at(params: &ChartParams, now: DateTime<Utc>) -> Self {
        let tick = params.tick_interval();
        let time_end = now - tick * tick_count(params.time_lag_ticks);
        let time_start = time_end - tick * tick_count(params.time_span_ticks);

        let time = LinearScale::new((0.0, seconds(time_end - time_start)), params.layout.x);
        let value = LinearScale::new(
            (params.value_domain.min, params.value_domain.max),
            params.layout.y,
        );

        Self {
            time_start,
            time_end,
            time,
            value,
            grid_values: params.grid_values(),
        }
    }

    pub fn time_domain(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.time_start, self.time_end)
    }

    pub fn map_time(&self, timestamp: DateTime<Utc>) -> f64 {
        self.time.map(seconds(timestamp - self.time_start))
    }

    pub fn map_value(&self, value: f64) -> f64 {
        self.value.map(value)
    }

    pub fn map_observation(&self, observation: &Observation) -> ScaledPoint {
        ScaledPoint::new(
            self.map_time(observation.timestamp()),
            self.map_value(observation.value()),
        )
    }

    /// Pixel-y of every configured gridline, in configuration order.
    pub fn grid_positions(&self) -> Vec<f64> {
        self.grid_values
            .iter()
            .map(|&value| self.map_value(value))
            .collect()
    }
}

/// Tick counts above `i32::MAX` are rejected by `ChartParams::validate`;
/// unvalidated ones saturate instead of wrapping negative.
fn tick_count(ticks: u32) -> i32 {
    i32::try_from(ticks).unwrap_or(i32::MAX)
}

fn seconds(delta: TimeDelta) -> f64 {
    delta
        .num_nanoseconds()
        .map_or_else(|| delta.num_milliseconds() as f64 / 1e3, |ns| ns as f64 / 1e9)
}
