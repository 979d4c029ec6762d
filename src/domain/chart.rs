// Chart domain model - identity, value domain and pixel layout of one chart
use crate::error::{PipelineError, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(String);

impl ChartId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChartId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Inclusive value span a chart's vertical axis covers. Fixed per chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueDomain {
    pub min: f64,
    pub max: f64,
}

impl ValueDomain {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Rescale a canonical 0..=100 tick into this domain.
    pub fn rescale_percent(&self, percent: f64) -> f64 {
        self.min + percent / 100.0 * self.span()
    }
}

/// Pixel span a scale maps onto. `start` receives the domain minimum, so
/// `start > end` expresses an inverted axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRange {
    pub start: f64,
    pub end: f64,
}

impl PixelRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Pixel ranges of the plotting area inside a chart canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLayout {
    pub x: PixelRange,
    /// Bottom to top: `y.start` is the larger pixel coordinate.
    pub y: PixelRange,
}

impl PlotLayout {
    pub fn new(x: PixelRange, y: PixelRange) -> Self {
        Self { x, y }
    }
}

/// Largest tick count (window capacity, lag, span) the time arithmetic accepts.
pub const MAX_TICK_COUNT: u32 = i32::MAX as u32;

/// Typed parameters of one chart instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartParams {
    pub id: ChartId,
    pub title: String,
    pub unit: Option<String>,
    pub window_capacity: usize,
    pub tick_rate_hz: f64,
    pub value_domain: ValueDomain,
    /// How many ticks the visible time domain trails the current instant.
    pub time_lag_ticks: u32,
    /// Width of the visible time domain, in ticks.
    pub time_span_ticks: u32,
    /// Canonical gridline ticks on a 0..=100 scale.
    pub grid_tick_values: Vec<f64>,
    pub layout: PlotLayout,
}

impl ChartParams {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(PipelineError::InvalidConfig(format!("chart `{}`: {reason}", self.id)));

        if self.window_capacity < 2 {
            return invalid(format!("window capacity must be at least 2, got {}", self.window_capacity));
        }
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return invalid(format!("tick rate must be positive, got {}", self.tick_rate_hz));
        }
        if !self.value_domain.min.is_finite() || !self.value_domain.max.is_finite() {
            return invalid("value domain bounds must be finite".to_string());
        }
        if self.value_domain.min > self.value_domain.max {
            return invalid(format!(
                "value domain min {} exceeds max {}",
                self.value_domain.min, self.value_domain.max
            ));
        }
        if self.window_capacity > MAX_TICK_COUNT as usize {
            return invalid(format!(
                "window capacity {} exceeds {MAX_TICK_COUNT}",
                self.window_capacity
            ));
        }
        if self.time_span_ticks == 0 {
            return invalid("time span must cover at least one tick".to_string());
        }
        let trailing = u64::from(self.time_lag_ticks) + u64::from(self.time_span_ticks);
        if trailing > u64::from(MAX_TICK_COUNT) {
            return invalid(format!(
                "time lag {} plus span {} exceeds {MAX_TICK_COUNT} ticks",
                self.time_lag_ticks, self.time_span_ticks
            ));
        }
        if self.grid_tick_values.iter().any(|t| !t.is_finite()) {
            return invalid("grid tick values must be finite".to_string());
        }
        Ok(())
    }

    /// Nominal interval between two ticks, `1 / tick_rate_hz`.
    pub fn tick_interval(&self) -> TimeDelta {
        TimeDelta::nanoseconds((1e9 / self.tick_rate_hz).round() as i64)
    }

    /// Gridline values in domain units, in `grid_tick_values` order.
    pub fn grid_values(&self) -> Vec<f64> {
        self.grid_tick_values
            .iter()
            .map(|&tick| self.value_domain.rescale_percent(tick))
            .collect()
    }

    /// Labels paired positionally with `PathGeometry::grid_positions`.
    /// Halves round up, so -2.5 is labelled "-2".
    pub fn grid_labels(&self) -> Vec<String> {
        self.grid_values()
            .into_iter()
            .map(|value| format!("{}", (value + 0.5).floor() as i64))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn params(capacity: usize, tick_rate_hz: f64, min: f64, max: f64) -> ChartParams {
        ChartParams {
            id: ChartId::new("temperature"),
            title: "Temperature".to_string(),
            unit: Some("°C".to_string()),
            window_capacity: capacity,
            tick_rate_hz,
            value_domain: ValueDomain::new(min, max),
            time_lag_ticks: 2,
            time_span_ticks: 36,
            grid_tick_values: vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0],
            layout: PlotLayout::new(PixelRange::new(0.0, 330.0), PixelRange::new(240.0, 20.0)),
        }
    }

    #[test]
    fn test_grid_labels_rescale_into_domain() {
        let chart = params(30, 60.0, 30.0, 80.0);
        assert_eq!(chart.grid_labels(), vec!["30", "40", "50", "60", "70", "80"]);

        let chart = params(30, 60.0, 15.0, 35.0);
        assert_eq!(chart.grid_values(), vec![15.0, 19.0, 23.0, 27.0, 31.0, 35.0]);
    }

    #[test]
    fn test_grid_labels_round_halves_up() {
        let mut chart = params(30, 60.0, -5.0, 5.0);
        chart.grid_tick_values = vec![25.0, 75.0];
        assert_eq!(chart.grid_values(), vec![-2.5, 2.5]);
        assert_eq!(chart.grid_labels(), vec!["-2", "3"]);

        let mut chart = params(30, 60.0, -1.0, 0.0);
        chart.grid_tick_values = vec![50.0];
        assert_eq!(chart.grid_labels(), vec!["0"]);
    }

    #[test]
    fn test_tick_interval_from_rate() {
        assert_eq!(params(30, 1.0, 0.0, 1.0).tick_interval(), TimeDelta::seconds(1));
        assert_eq!(params(30, 60.0, 0.0, 1.0).tick_interval(), TimeDelta::nanoseconds(16_666_667));
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        assert!(params(30, 60.0, 0.0, 100.0).validate().is_ok());
        assert!(params(50, 60.0, 50.0, 50.0).validate().is_ok());

        assert!(params(1, 60.0, 0.0, 100.0).validate().is_err());
        assert!(params(30, 0.0, 0.0, 100.0).validate().is_err());
        assert!(params(30, f64::NAN, 0.0, 100.0).validate().is_err());
        assert!(params(30, 60.0, 100.0, 0.0).validate().is_err());

        let mut chart = params(30, 60.0, 0.0, 100.0);
        chart.time_span_ticks = 0;
        assert!(matches!(chart.validate(), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_tick_counts_that_would_wrap() {
        let mut chart = params(30, 60.0, 15.0, 35.0);
        chart.time_lag_ticks = u32::MAX;
        assert!(matches!(chart.validate(), Err(PipelineError::InvalidConfig(_))));

        let mut chart = params(30, 60.0, 15.0, 35.0);
        chart.time_lag_ticks = MAX_TICK_COUNT - 10;
        chart.time_span_ticks = 36;
        assert!(matches!(chart.validate(), Err(PipelineError::InvalidConfig(_))));

        let mut chart = params(30, 60.0, 15.0, 35.0);
        chart.time_lag_ticks = MAX_TICK_COUNT - 36;
        chart.time_span_ticks = 36;
        assert!(chart.validate().is_ok());

        let chart = params(MAX_TICK_COUNT as usize + 1, 60.0, 15.0, 35.0);
        assert!(matches!(chart.validate(), Err(PipelineError::InvalidConfig(_))));
    }
}
