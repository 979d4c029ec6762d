// Console renderer - pulls snapshots on its own thread at the frame rate
use live_chart::{ChartId, ChartParams, PathGeometry, RenderStateSynchronizer, SnapshotReader};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const SUMMARY_EVERY_FRAMES: u64 = 60;

/// One chart as drawn in one frame.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedChart {
    pub chart: ChartId,
    pub title: String,
    pub grid_labels: Vec<String>,
    pub svg_path: String,
    pub geometry: Arc<PathGeometry>,
}

struct ChartView {
    title: String,
    grid_labels: Vec<String>,
    reader: SnapshotReader,
}

/// Stand-in for the on-screen canvas. Never touches producer state; it only
/// reads whatever geometry was last published.
pub struct ConsoleRenderer {
    views: Vec<ChartView>,
    frame_interval: Duration,
    emit_json: bool,
    frames: u64,
}

impl ConsoleRenderer {
    pub fn new(
        render_state: &RenderStateSynchronizer,
        charts: &[ChartParams],
        frame_interval: Duration,
        emit_json: bool,
    ) -> Self {
        let views = charts
            .iter()
            .filter_map(|chart| {
                let reader = render_state.subscribe(&chart.id)?;
                Some(ChartView {
                    title: match &chart.unit {
                        Some(unit) => format!("{} ({})", chart.title, unit),
                        None => chart.title.clone(),
                    },
                    grid_labels: chart.grid_labels(),
                    reader,
                })
            })
            .collect();

        Self {
            views,
            frame_interval,
            emit_json,
            frames: 0,
        }
    }

    /// Draw one frame: every chart whose snapshot changed since the last frame.
    pub fn render_frame(&mut self) -> Vec<RenderedChart> {
        self.frames += 1;
        let drawn: Vec<RenderedChart> = self
            .views
            .iter_mut()
            .filter_map(|view| {
                let geometry = view.reader.latest_if_changed()?;
                Some(RenderedChart {
                    chart: view.reader.chart_id().clone(),
                    title: view.title.clone(),
                    grid_labels: view.grid_labels.clone(),
                    svg_path: geometry.to_svg_path(),
                    geometry,
                })
            })
            .collect();

        if self.frames % SUMMARY_EVERY_FRAMES == 0 {
            for view in &self.views {
                let geometry = view.reader.latest();
                tracing::info!(
                    "{}: {} path commands, gridlines {:?} at y={:?}",
                    view.title,
                    geometry.curve.len(),
                    view.grid_labels,
                    geometry.grid_positions
                );
            }
        }
        drawn
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run the draw loop on a dedicated thread until `stop` is raised.
    /// Returns the number of frames drawn.
    pub fn spawn(mut self, stop: Arc<AtomicBool>) -> thread::JoinHandle<u64> {
        thread::spawn(move || {
            while !stop.load(Ordering::Acquire) {
                for chart in self.render_frame() {
                    if self.emit_json {
                        match serde_json::to_string(&chart) {
                            Ok(line) => println!("{line}"),
                            Err(e) => tracing::warn!("Failed to encode frame for {}: {}", chart.chart, e),
                        }
                    } else {
                        tracing::debug!("Drew {} ({} bytes of path)", chart.chart, chart.svg_path.len());
                    }
                }
                thread::sleep(self.frame_interval);
            }
            self.frames
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use live_chart::domain::chart::{PixelRange, PlotLayout, ValueDomain};
    use live_chart::{PathCommand, ScaledPoint};

    fn chart(id: &str, unit: Option<&str>) -> ChartParams {
        ChartParams {
            id: ChartId::new(id),
            title: "Humidity".to_string(),
            unit: unit.map(str::to_string),
            window_capacity: 30,
            tick_rate_hz: 60.0,
            value_domain: ValueDomain::new(30.0, 80.0),
            time_lag_ticks: 2,
            time_span_ticks: 36,
            grid_tick_values: vec![0.0, 50.0, 100.0],
            layout: PlotLayout::new(PixelRange::new(0.0, 330.0), PixelRange::new(240.0, 20.0)),
        }
    }

    #[test]
    fn test_renders_only_changed_charts() {
        let humidity = chart("humidity", Some("%"));
        let render_state = RenderStateSynchronizer::new([humidity.id.clone()]);
        let mut renderer =
            ConsoleRenderer::new(&render_state, &[humidity.clone()], Duration::from_millis(16), false);

        assert!(renderer.render_frame().is_empty());

        let geometry = PathGeometry::new(
            vec![
                PathCommand::MoveTo(ScaledPoint::new(0.0, 240.0)),
                PathCommand::LineTo(ScaledPoint::new(10.0, 20.0)),
            ],
            vec![240.0, 130.0, 20.0],
        );
        render_state.publish(&humidity.id, geometry).unwrap();

        let drawn = renderer.render_frame();
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].title, "Humidity (%)");
        assert_eq!(drawn[0].grid_labels, vec!["30", "55", "80"]);
        assert_eq!(drawn[0].svg_path, "M0,240L10,20");

        assert!(renderer.render_frame().is_empty());
        assert_eq!(renderer.frames(), 3);
    }

    #[test]
    fn test_unregistered_charts_are_skipped() {
        let render_state = RenderStateSynchronizer::new([ChartId::new("humidity")]);
        let renderer = ConsoleRenderer::new(
            &render_state,
            &[chart("humidity", None), chart("pressure", None)],
            Duration::from_millis(16),
            true,
        );
        assert_eq!(renderer.views.len(), 1);
    }

    #[test]
    fn test_render_thread_stops_on_signal() {
        let humidity = chart("humidity", None);
        let render_state = RenderStateSynchronizer::new([humidity.id.clone()]);
        let renderer = ConsoleRenderer::new(&render_state, &[humidity], Duration::from_millis(1), false);
        let stop = Arc::new(AtomicBool::new(false));

        let handle = renderer.spawn(stop.clone());
        thread::sleep(Duration::from_millis(20));
        stop.store(true, Ordering::Release);

        assert!(handle.join().unwrap() > 0);
    }
}
