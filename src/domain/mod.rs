// Domain layer - chart data model with no runtime dependencies
pub mod chart;
pub mod geometry;
pub mod observation;
pub mod window;
