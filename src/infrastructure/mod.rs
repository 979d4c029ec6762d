// Infrastructure layer - concrete clocks, sample feeds and configuration
pub mod clock;
pub mod config;
pub mod random_source;
