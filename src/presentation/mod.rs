// Presentation layer - headless consumer of published chart geometry
pub mod console_renderer;
