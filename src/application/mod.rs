// Application layer - the tick pipeline and its collaborators
pub mod chart_pipeline;
pub mod curve_builder;
pub mod render_state;
pub mod sample_source;
pub mod scale_mapper;
pub mod tick_scheduler;
