// Main entry point - wires the chart pipeline to a headless renderer
mod presentation;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use live_chart::application::tick_scheduler::SchedulerTiming;
use live_chart::infrastructure::clock::MonotonicClock;
use live_chart::infrastructure::config::load_pipeline_config;
use live_chart::infrastructure::random_source::RandomSampleGenerator;
use live_chart::{ChartPipeline, ChartSession, Clock, TickScheduler};
use tracing_subscriber::EnvFilter;

use crate::presentation::console_renderer::ConsoleRenderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("live_chart=info")),
        )
        .init();

    // Load configuration
    let config = load_pipeline_config()?;
    let charts = config.chart_params()?;
    let timing = SchedulerTiming::from_rates(config.tick_rate_hz, config.frame_rate_hz)?;
    tracing::info!(
        "Loaded {} charts: window {} samples at {} Hz",
        charts.len(),
        config.window_capacity,
        config.tick_rate_hz
    );

    // Seed one pipeline per chart from the synthetic feed
    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
    let start = clock.now();
    let pipelines = config
        .charts
        .iter()
        .zip(&charts)
        .map(|(chart_config, params)| {
            let domain = params.value_domain;
            let source = match chart_config.seed {
                Some(seed) => RandomSampleGenerator::seeded(domain, chart_config.value_kind, seed),
                None => RandomSampleGenerator::from_entropy(domain, chart_config.value_kind),
            };
            ChartPipeline::new(params.clone(), Box::new(source), start)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut scheduler = TickScheduler::new(ChartSession::new(pipelines), clock, timing);

    // Consumer side runs on its own thread and only sees published snapshots
    let renderer = ConsoleRenderer::new(
        &scheduler.render_state(),
        &charts,
        config.frame_interval(),
        config.renderer.emit_json,
    );
    let stop_renderer = Arc::new(AtomicBool::new(false));
    let render_thread = renderer.spawn(stop_renderer.clone());

    scheduler.start()?;

    match config.run_for_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl-C")?,
            }
        }
        None => tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?,
    }

    scheduler.stop().await?;
    stop_renderer.store(true, Ordering::Release);
    let frames = render_thread
        .join()
        .map_err(|_| anyhow::anyhow!("Renderer thread panicked"))?;

    tracing::info!("Shut down after {} ticks and {} frames", scheduler.ticks(), frames);
    Ok(())
}
