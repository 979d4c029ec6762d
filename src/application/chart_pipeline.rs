// Chart pipeline - one tick of sample, push, scale, curve and publish
use crate::application::curve_builder::CurveBuilder;
use crate::application::render_state::RenderStateSynchronizer;
use crate::application::sample_source::SampleSource;
use crate::application::scale_mapper::ScaleMapper;
use crate::domain::chart::{ChartId, ChartParams};
use crate::domain::geometry::PathGeometry;
use crate::domain::observation::Observation;
use crate::domain::window::Window;
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Producer-side state of a single chart. Owns its window exclusively.
pub struct ChartPipeline {
    params: ChartParams,
    source: Box<dyn SampleSource>,
    window: Window,
}

impl ChartPipeline {
    /// Validate `params` and seed the window from `source`, the newest seed
    /// sample taken at `start`.
    pub fn new(params: ChartParams, mut source: Box<dyn SampleSource>, start: DateTime<Utc>) -> Result<Self> {
        params.validate()?;
        let window = Window::initialize(params.window_capacity, start, params.tick_interval(), |at| {
            source.next(at)
        });

        Ok(Self {
            params,
            source,
            window,
        })
    }

    pub fn id(&self) -> &ChartId {
        &self.params.id
    }

    pub fn params(&self) -> &ChartParams {
        &self.params
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Take one sample at `now` and slide the window forward.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Observation {
        let observation = self.source.next(now);
        if !self.params.value_domain.contains(observation.value()) {
            tracing::warn!(
                "Sample {} for chart {} lies outside [{}, {}] and will be clipped",
                observation.value(),
                self.params.id,
                self.params.value_domain.min,
                self.params.value_domain.max
            );
        }
        self.window.push(observation);
        observation
    }

    /// Geometry of the current window as seen at `now`.
    pub fn geometry(&self, now: DateTime<Utc>) -> PathGeometry {
        CurveBuilder::build(&self.window, &ScaleMapper::at(&self.params, now))
    }
}

impl fmt::Debug for ChartPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartPipeline")
            .field("params", &self.params)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

/// Every chart on screen plus the render state they publish to.
#[derive(Debug)]
pub struct ChartSession {
    pipelines: Vec<ChartPipeline>,
    render_state: Arc<RenderStateSynchronizer>,
}

impl ChartSession {
    /// Registers one render slot per pipeline.
    pub fn new(pipelines: Vec<ChartPipeline>) -> Self {
        let render_state = Arc::new(RenderStateSynchronizer::new(
            pipelines.iter().map(|p| p.id().clone()),
        ));
        Self {
            pipelines,
            render_state,
        }
    }

    pub fn render_state(&self) -> Arc<RenderStateSynchronizer> {
        self.render_state.clone()
    }

    pub fn pipelines(&self) -> &[ChartPipeline] {
        &self.pipelines
    }

    pub fn pipeline(&self, id: &ChartId) -> Option<&ChartPipeline> {
        self.pipelines.iter().find(|p| p.id() == id)
    }

    /// Recompute and publish every chart without sampling.
    pub fn refresh(&self, now: DateTime<Utc>) -> Result<()> {
        for pipeline in &self.pipelines {
            self.render_state.publish(pipeline.id(), pipeline.geometry(now))?;
        }
        tracing::debug!("Published initial geometry for {} charts", self.pipelines.len());
        Ok(())
    }

    /// One full tick: sample every series, then recompute and publish.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<()> {
        for pipeline in &mut self.pipelines {
            let observation = pipeline.advance(now);
            let geometry = pipeline.geometry(now);
            tracing::trace!(
                "Tick for chart {}: value={} commands={}",
                pipeline.id(),
                observation.value(),
                geometry.curve.len()
            );
            self.render_state.publish(pipeline.id(), geometry)?;
        }
        Ok(())
    }
}
