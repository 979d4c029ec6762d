// Tick scheduler - drives the chart session at a fixed rate off the frame clock
use crate::application::chart_pipeline::ChartSession;
use crate::application::render_state::RenderStateSynchronizer;
use crate::application::sample_source::Clock;
use crate::error::{PipelineError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Frame timers fire with sub-millisecond rounding against the nominal tick
/// interval; a frame this close to the deadline still counts as due.
const TICK_SLACK_MICROS: i64 = 500;

/// Rate limiter deciding whether enough time has passed for another tick.
///
/// Work happens at most once per interval. A late frame runs a single tick and
/// the next one is measured from that frame, so missed intervals coalesce
/// instead of bursting.
#[derive(Debug, Clone)]
pub struct TickGate {
    interval: TimeDelta,
    last: Option<DateTime<Utc>>,
}

impl TickGate {
    pub fn new(interval: TimeDelta) -> Self {
        Self { interval, last: None }
    }

    /// Record `now` as the last tick without asking.
    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last = Some(now);
    }

    pub fn ready(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last {
            if now - last + TimeDelta::microseconds(TICK_SLACK_MICROS) < self.interval {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

/// Tick and frame cadence. The two are independent: frames only offer the
/// scheduler a chance to tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerTiming {
    pub tick_interval: TimeDelta,
    pub frame_interval: Duration,
}

impl SchedulerTiming {
    pub fn from_rates(tick_rate_hz: f64, frame_rate_hz: f64) -> Result<Self> {
        for (name, hz) in [("tick", tick_rate_hz), ("frame", frame_rate_hz)] {
            if !hz.is_finite() || hz <= 0.0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} rate must be positive, got {hz}"
                )));
            }
        }
        Ok(Self {
            tick_interval: TimeDelta::nanoseconds((1e9 / tick_rate_hz).round() as i64),
            frame_interval: Duration::from_secs_f64(1.0 / frame_rate_hz),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

struct RunningTicker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<ChartSession>,
}

/// Idle/Running state machine owning the periodic tick task.
///
/// While idle the scheduler holds the chart session; `start` moves it into a
/// tokio task and `stop` cancels that task and takes the session back, so a
/// remounted chart resumes with its window intact.
pub struct TickScheduler {
    timing: SchedulerTiming,
    clock: Arc<dyn Clock>,
    render_state: Arc<RenderStateSynchronizer>,
    ticks: Arc<AtomicU64>,
    session: Option<ChartSession>,
    running: Option<RunningTicker>,
}

impl TickScheduler {
    pub fn new(session: ChartSession, clock: Arc<dyn Clock>, timing: SchedulerTiming) -> Self {
        Self {
            timing,
            clock,
            render_state: session.render_state(),
            ticks: Arc::new(AtomicU64::new(0)),
            session: Some(session),
            running: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.running.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    pub fn render_state(&self) -> Arc<RenderStateSynchronizer> {
        self.render_state.clone()
    }

    /// Ticks completed since construction, across restarts.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// The chart session, available while idle.
    pub fn session(&self) -> Option<&ChartSession> {
        self.session.as_ref()
    }

    /// Publish the current geometry of every chart and arm the periodic tick.
    pub fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Err(PipelineError::AlreadyRunning);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| PipelineError::NoRuntime)?;
        let session = self.session.as_ref().ok_or_else(|| {
            PipelineError::TickTaskFailed("chart session was lost by an earlier failed tick".to_string())
        })?;

        let started_at = self.clock.now();
        session.refresh(started_at)?;

        let session = self.session.take().ok_or(PipelineError::AlreadyRunning)?;
        let (shutdown, cancelled) = watch::channel(false);
        let handle = runtime.spawn(run_ticks(
            session,
            self.clock.clone(),
            self.timing,
            self.ticks.clone(),
            cancelled,
            started_at,
        ));
        self.running = Some(RunningTicker { shutdown, handle });

        tracing::info!(
            "Tick scheduler started (tick every {} ms, frame every {:?})",
            self.timing.tick_interval.num_milliseconds(),
            self.timing.frame_interval
        );
        Ok(())
    }

    /// Cancel the periodic tick and wait for the task to wind down. No tick
    /// runs after this returns. Stopping an idle scheduler does nothing.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };

        // The task may already be gone; the join below reports why.
        let _ = running.shutdown.send(true);
        match running.handle.await {
            Ok(session) => {
                self.session = Some(session);
                tracing::info!("Tick scheduler stopped after {} ticks", self.ticks());
                Ok(())
            }
            Err(e) => {
                tracing::error!("Tick task failed: {}", e);
                Err(PipelineError::TickTaskFailed(e.to_string()))
            }
        }
    }
}

/// Dropping a running scheduler cancels its task without waiting for it. On a
/// multi-threaded runtime a tick already in progress may still finish and
/// publish; only `stop().await` guarantees no tick runs afterwards.
impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown.send(true);
            running.handle.abort();
        }
    }
}

async fn run_ticks(
    mut session: ChartSession,
    clock: Arc<dyn Clock>,
    timing: SchedulerTiming,
    ticks: Arc<AtomicU64>,
    mut cancelled: watch::Receiver<bool>,
    started_at: DateTime<Utc>,
) -> ChartSession {
    let mut frames = tokio::time::interval(timing.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut gate = TickGate::new(timing.tick_interval);
    gate.mark(started_at);

    loop {
        tokio::select! {
            biased;
            _ = cancelled.changed() => break,
            _ = frames.tick() => {
                if *cancelled.borrow() {
                    break;
                }
                let now = clock.now();
                if !gate.ready(now) {
                    continue;
                }
                if let Err(e) = session.tick(now) {
                    tracing::warn!("Failed to publish tick: {}", e);
                }
                ticks.fetch_add(1, Ordering::AcqRel);
            }
        }
    }

    session
}
