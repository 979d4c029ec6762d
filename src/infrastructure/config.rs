use crate::domain::chart::{ChartId, ChartParams, PixelRange, PlotLayout, ValueDomain};
use crate::error::PipelineError;
use crate::infrastructure::random_source::ValueKind;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/charts";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub window_capacity: usize,
    pub tick_rate_hz: f64,
    /// Cadence of the host frame callback driving the scheduler.
    pub frame_rate_hz: f64,
    /// Stop the demo after this many seconds; run until Ctrl-C when unset.
    pub run_for_secs: Option<u64>,
    pub canvas: CanvasConfig,
    pub renderer: RendererConfig,
    pub charts: Vec<ChartConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_capacity: 30,
            tick_rate_hz: 60.0,
            frame_rate_hz: 60.0,
            run_for_secs: None,
            canvas: CanvasConfig::default(),
            renderer: RendererConfig::default(),
            charts: vec![
                ChartConfig::new("temperature", "Temperature", Some("°C"), 15.0, 35.0),
                ChartConfig::new("humidity", "Humidity", Some("%"), 30.0, 80.0),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub left_inset: f64,
    pub right_inset: f64,
    pub top_inset: f64,
    pub bottom_inset: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 370.0,
            height: 280.0,
            left_inset: 0.0,
            right_inset: 40.0,
            top_inset: 20.0,
            bottom_inset: 40.0,
        }
    }
}

impl CanvasConfig {
    pub fn layout(&self) -> PlotLayout {
        PlotLayout::new(
            PixelRange::new(self.left_inset, self.width - self.right_inset),
            PixelRange::new(self.height - self.bottom_inset, self.top_inset),
        )
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    /// Print every rendered frame as a JSON line on stdout.
    pub emit_json: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub y_min: f64,
    pub y_max: f64,
    #[serde(default)]
    pub value_kind: ValueKind,
    #[serde(default = "default_time_lag_ticks")]
    pub time_lag_ticks: u32,
    #[serde(default = "default_time_span_ticks")]
    pub time_span_ticks: u32,
    #[serde(default = "default_grid_ticks")]
    pub grid_ticks: Vec<f64>,
    /// Fixed seed for the synthetic feed; entropy when unset.
    pub seed: Option<u64>,
}

impl ChartConfig {
    pub fn new(id: &str, title: &str, unit: Option<&str>, y_min: f64, y_max: f64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.map(str::to_string),
            y_min,
            y_max,
            value_kind: ValueKind::default(),
            time_lag_ticks: default_time_lag_ticks(),
            time_span_ticks: default_time_span_ticks(),
            grid_ticks: default_grid_ticks(),
            seed: None,
        }
    }

    pub fn value_domain(&self) -> ValueDomain {
        ValueDomain::new(self.y_min, self.y_max)
    }
}

fn default_time_lag_ticks() -> u32 {
    2
}

fn default_time_span_ticks() -> u32 {
    36
}

fn default_grid_ticks() -> Vec<f64> {
    vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]
}

impl PipelineConfig {
    /// Validate the whole configuration and derive typed per-chart params.
    pub fn chart_params(&self) -> Result<Vec<ChartParams>, PipelineError> {
        if self.charts.is_empty() {
            return Err(PipelineError::InvalidConfig("no charts configured".to_string()));
        }
        if !self.frame_rate_hz.is_finite() || self.frame_rate_hz <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "frame rate must be positive, got {}",
                self.frame_rate_hz
            )));
        }
        if self.canvas.layout().x.start >= self.canvas.layout().x.end {
            return Err(PipelineError::InvalidConfig(format!(
                "canvas width {} leaves no room for the plot",
                self.canvas.width
            )));
        }

        let mut seen = HashSet::new();
        let layout = self.canvas.layout();
        self.charts
            .iter()
            .map(|chart| {
                if !seen.insert(chart.id.as_str()) {
                    return Err(PipelineError::InvalidConfig(format!(
                        "duplicate chart id `{}`",
                        chart.id
                    )));
                }
                let params = ChartParams {
                    id: ChartId::new(chart.id.clone()),
                    title: chart.title.clone(),
                    unit: chart.unit.clone(),
                    window_capacity: self.window_capacity,
                    tick_rate_hz: self.tick_rate_hz,
                    value_domain: chart.value_domain(),
                    time_lag_ticks: chart.time_lag_ticks,
                    time_span_ticks: chart.time_span_ticks,
                    grid_tick_values: chart.grid_ticks.clone(),
                    layout,
                };
                params.validate()?;
                Ok(params)
            })
            .collect()
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate_hz)
    }
}

pub fn load_pipeline_config() -> anyhow::Result<PipelineConfig> {
    load_pipeline_config_from(DEFAULT_CONFIG_PATH)
}

/// Built-in defaults, overridden by the optional file at `path` (any format
/// the `config` crate recognises by extension).
pub fn load_pipeline_config_from(path: &str) -> anyhow::Result<PipelineConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_two_chart_screen() {
        let config = PipelineConfig::default();
        let params = config.chart_params().unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params[0].id, ChartId::new("temperature"));
        assert_eq!(params[0].value_domain, ValueDomain::new(15.0, 35.0));
        assert_eq!(params[1].value_domain, ValueDomain::new(30.0, 80.0));
        assert_eq!(params[0].window_capacity, 30);
        assert_eq!(params[0].layout.x, PixelRange::new(0.0, 330.0));
        assert_eq!(params[0].layout.y, PixelRange::new(240.0, 20.0));
        assert_eq!(params[0].grid_labels(), vec!["15", "19", "23", "27", "31", "35"]);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_pipeline_config_from("config/does-not-exist").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let raw = r#"
            window_capacity = 40
            tick_rate_hz = 30.0

            [canvas]
            width = 500.0

            [[charts]]
            id = "pressure"
            title = "Pressure"
            y_min = 950.0
            y_max = 1050.0
            value_kind = "real"
            time_lag_ticks = 1
            seed = 11
        "#;
        let config: PipelineConfig = toml::from_str(raw).unwrap();

        assert_eq!(config.frame_rate_hz, 60.0);
        assert_eq!(config.canvas.height, 280.0);
        assert_eq!(config.charts.len(), 1);

        let chart = &config.charts[0];
        assert_eq!(chart.value_kind, ValueKind::Real);
        assert_eq!(chart.time_lag_ticks, 1);
        assert_eq!(chart.time_span_ticks, 36);
        assert_eq!(chart.unit, None);
        assert_eq!(chart.seed, Some(11));

        let params = config.chart_params().unwrap();
        assert_eq!(params[0].window_capacity, 40);
        assert_eq!(params[0].layout.x.end, 460.0);
    }

    #[test]
    fn test_config_builder_reads_toml_source() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "frame_rate_hz = 120.0\n[renderer]\nemit_json = true\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: PipelineConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.frame_rate_hz, 120.0);
        assert!(config.renderer.emit_json);
        assert_eq!(config.charts.len(), 2);
        assert_eq!(config.frame_interval(), Duration::from_secs_f64(1.0 / 120.0));
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let mut config = PipelineConfig::default();
        config.charts[1].id = "temperature".to_string();
        assert!(config.chart_params().is_err());

        let mut config = PipelineConfig::default();
        config.charts.clear();
        assert!(config.chart_params().is_err());

        let mut config = PipelineConfig::default();
        config.window_capacity = 1;
        assert!(config.chart_params().is_err());

        let mut config = PipelineConfig::default();
        config.frame_rate_hz = 0.0;
        assert!(config.chart_params().is_err());

        let mut config = PipelineConfig::default();
        config.charts[0].y_min = 90.0;
        assert!(matches!(config.chart_params(), Err(PipelineError::InvalidConfig(_))));
    }
}
