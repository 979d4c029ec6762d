// Render state synchronizer - hands finished geometry from producer to renderers
use crate::domain::chart::ChartId;
use crate::domain::geometry::PathGeometry;
use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Latest published geometry per chart.
///
/// Each chart owns a single-slot channel holding an `Arc<PathGeometry>`. The
/// producer builds a complete geometry off to the side and swaps the whole
/// `Arc` in; readers clone the `Arc` out. A reader therefore sees either the
/// previous or the next complete geometry, never a partially written one, and
/// never waits on the producer's computation.
///
/// The chart set is fixed at construction, so the lookup table itself needs
/// no synchronisation.
#[derive(Debug)]
pub struct RenderStateSynchronizer {
    slots: HashMap<ChartId, watch::Sender<Arc<PathGeometry>>>,
}

impl RenderStateSynchronizer {
    pub fn new<I>(chart_ids: I) -> Self
    where
        I: IntoIterator<Item = ChartId>,
    {
        let slots = chart_ids
            .into_iter()
            .map(|id| {
                tracing::debug!("Registering render slot for chart {}", id);
                let (tx, _) = watch::channel(Arc::new(PathGeometry::empty()));
                (id, tx)
            })
            .collect();

        Self { slots }
    }

    pub fn chart_ids(&self) -> impl Iterator<Item = &ChartId> + '_ {
        self.slots.keys()
    }

    /// Replace the snapshot of `chart_id` with `geometry`.
    pub fn publish(&self, chart_id: &ChartId, geometry: PathGeometry) -> Result<()> {
        let slot = self
            .slots
            .get(chart_id)
            .ok_or_else(|| PipelineError::UnknownChart(chart_id.clone()))?;
        slot.send_replace(Arc::new(geometry));
        Ok(())
    }

    /// Current snapshot of `chart_id`; `None` for unregistered charts.
    pub fn read(&self, chart_id: &ChartId) -> Option<Arc<PathGeometry>> {
        self.slots.get(chart_id).map(|slot| slot.borrow().clone())
    }

    /// Consumer-side handle that can also wait for the next publish.
    pub fn subscribe(&self, chart_id: &ChartId) -> Option<SnapshotReader> {
        self.slots.get(chart_id).map(|slot| SnapshotReader {
            chart_id: chart_id.clone(),
            rx: slot.subscribe(),
        })
    }
}

/// Read handle for one chart's snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    chart_id: ChartId,
    rx: watch::Receiver<Arc<PathGeometry>>,
}

impl SnapshotReader {
    pub fn chart_id(&self) -> &ChartId {
        &self.chart_id
    }

    pub fn latest(&self) -> Arc<PathGeometry> {
        self.rx.borrow().clone()
    }

    /// The snapshot if it changed since this reader last looked, for renderers
    /// that skip redrawing unchanged frames.
    pub fn latest_if_changed(&mut self) -> Option<Arc<PathGeometry>> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Wait for the next publish. `None` once the synchronizer is gone.
    pub async fn changed(&mut self) -> Option<Arc<PathGeometry>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::{PathCommand, ScaledPoint};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    fn stamped(i: usize) -> PathGeometry {
        let v = i as f64;
        let curve = (0..32)
            .map(|k| PathCommand::LineTo(ScaledPoint::new(k as f64, v)))
            .collect();
        PathGeometry::new(curve, vec![v; 16])
    }

    fn stamp_of(geometry: &PathGeometry) -> Option<usize> {
        let v = *geometry.grid_positions.first()?;
        let consistent = geometry.grid_positions.iter().all(|&g| g == v)
            && geometry.curve.iter().all(|c| match c {
                PathCommand::LineTo(p) => p.y == v,
                _ => false,
            });
        consistent.then_some(v as usize)
    }

    #[test]
    fn test_publish_and_read() {
        let id = ChartId::new("temperature");
        let sync = RenderStateSynchronizer::new([id.clone()]);

        assert!(sync.read(&id).unwrap().is_empty());
        sync.publish(&id, stamped(7)).unwrap();
        assert_eq!(*sync.read(&id).unwrap(), stamped(7));
    }

    #[test]
    fn test_unknown_chart() {
        let sync = RenderStateSynchronizer::new([ChartId::new("temperature")]);
        let humidity = ChartId::new("humidity");

        assert!(sync.read(&humidity).is_none());
        assert!(sync.subscribe(&humidity).is_none());
        assert!(matches!(
            sync.publish(&humidity, stamped(1)),
            Err(PipelineError::UnknownChart(id)) if id == humidity
        ));
    }

    #[test]
    fn test_charts_are_independent() {
        let temperature = ChartId::new("temperature");
        let humidity = ChartId::new("humidity");
        let sync = RenderStateSynchronizer::new([temperature.clone(), humidity.clone()]);

        sync.publish(&temperature, stamped(3)).unwrap();

        assert_eq!(stamp_of(&sync.read(&temperature).unwrap()), Some(3));
        assert!(sync.read(&humidity).unwrap().is_empty());
        assert_eq!(sync.chart_ids().count(), 2);
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_geometry() {
        const PUBLISHES: usize = 5_000;
        const READERS: usize = 8;

        let id = ChartId::new("temperature");
        let sync = Arc::new(RenderStateSynchronizer::new([id.clone()]));
        sync.publish(&id, stamped(0)).unwrap();
        let done = AtomicBool::new(false);

        thread::scope(|scope| {
            for _ in 0..READERS {
                let sync = &sync;
                let done = &done;
                let id = &id;
                scope.spawn(move || {
                    let mut last_seen = 0;
                    let mut reads = 0usize;
                    while !done.load(Ordering::Acquire) || reads == 0 {
                        let geometry = sync.read(id).unwrap();
                        let stamp = stamp_of(&geometry).expect("torn or foreign geometry");
                        assert!(stamp < PUBLISHES);
                        assert!(stamp >= last_seen, "snapshot went backwards");
                        last_seen = stamp;
                        reads += 1;
                    }
                });
            }

            for i in 1..PUBLISHES {
                sync.publish(&id, stamped(i)).unwrap();
            }
            done.store(true, Ordering::Release);
        });

        assert_eq!(stamp_of(&sync.read(&id).unwrap()), Some(PUBLISHES - 1));
    }

    #[tokio::test]
    async fn test_subscriber_wakes_on_publish() {
        let id = ChartId::new("humidity");
        let sync = Arc::new(RenderStateSynchronizer::new([id.clone()]));
        let mut reader = sync.subscribe(&id).unwrap();
        assert!(reader.latest_if_changed().is_none());

        let producer = {
            let sync = sync.clone();
            let id = id.clone();
            tokio::spawn(async move { sync.publish(&id, stamped(42)).unwrap() })
        };

        let geometry = reader.changed().await.unwrap();
        producer.await.unwrap();
        assert_eq!(stamp_of(&geometry), Some(42));
        assert_eq!(reader.chart_id(), &id);
        assert!(reader.latest_if_changed().is_none());
        assert_eq!(stamp_of(&reader.latest()), Some(42));
    }
}
