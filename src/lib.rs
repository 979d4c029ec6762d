//! Real-time sliding-window chart pipeline.
//!
//! A periodic sampler feeds a fixed-capacity window per chart, the window is
//! mapped through time/value scales into a smoothed path, and the finished
//! geometry is published to a snapshot slot that any renderer thread can read
//! without waiting on the producer.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::chart_pipeline::{ChartPipeline, ChartSession};
pub use application::curve_builder::CurveBuilder;
pub use application::render_state::{RenderStateSynchronizer, SnapshotReader};
pub use application::sample_source::{Clock, SampleSource};
pub use application::scale_mapper::{LinearScale, ScaleMapper};
pub use application::tick_scheduler::{SchedulerState, SchedulerTiming, TickGate, TickScheduler};
pub use domain::chart::{ChartId, ChartParams, PixelRange, PlotLayout, ValueDomain};
pub use domain::geometry::{PathCommand, PathGeometry, ScaledPoint};
pub use domain::observation::Observation;
pub use domain::window::Window;
pub use error::{PipelineError, Result};
