use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tracing::debug;

use super::event::TelemetryEvent;
use super::metrics::TelemetrySnapshot;
use super::recorder::TelemetryRecorder;
use crate::config::PipelineConfig;
use crate::kernel::event::{RenderQualityEvent, ResultRecord};

/// Identifies one start..stop session. Results from an older epoch are stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionEpoch(pub u64);

#[derive(Debug)]
struct HubState {
    recorder: TelemetryRecorder,
    epoch: SessionEpoch,
}

/// Single writer of the published TelemetrySnapshot and of the ResultRecord feed.
///
/// The recorder lock is only held to apply one event and rebuild the snapshot,
/// so publication order always matches recording order.
#[derive(Debug)]
pub struct TelemetryHub {
    state: Mutex<HubState>,
    snapshot_tx: watch::Sender<Arc<TelemetrySnapshot>>,
    results_tx: broadcast::Sender<ResultRecord>,
}

impl TelemetryHub {
    pub fn new(config: &PipelineConfig) -> Self {
        let recorder = TelemetryRecorder::from_config(config);
        let (snapshot_tx, _) = watch::channel(Arc::new(recorder.snapshot()));
        let (results_tx, _) = broadcast::channel(config.effective_result_feed_capacity());
        Self {
            state: Mutex::new(HubState {
                recorder,
                epoch: SessionEpoch::default(),
            }),
            snapshot_tx,
            results_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clears all history and opens a new epoch. Anything tagged with an older epoch is rejected from now on.
    pub fn begin_session(&self) -> SessionEpoch {
        let mut state = self.lock();
        state.recorder.clear();
        state.epoch = SessionEpoch(state.epoch.0 + 1);
        self.publish(&state);
        state.epoch
    }

    /// Returns false if the record belongs to a stale session and was discarded.
    pub fn record_result(&self, epoch: SessionEpoch, record: ResultRecord) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            debug!(
                "Discarded stale result {} (epoch {:?} vs current {:?})",
                record.sequence, epoch, state.epoch
            );
            return false;
        }
        state.recorder.record(TelemetryEvent::ResultRecorded(record));
        self.publish(&state);
        // No subscribers is not an error.
        let _ = self.results_tx.send(record);
        true
    }

    pub fn record_drop(&self, epoch: SessionEpoch) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            return false;
        }
        state.recorder.record(TelemetryEvent::UnitDropped);
        self.publish(&state);
        true
    }

    /// Render-quality events are tracked independently of the session.
    pub fn record_render_quality(&self, event: RenderQualityEvent) {
        let mut state = self.lock();
        state.recorder.record(TelemetryEvent::RenderQuality(event));
        self.publish(&state);
    }

    pub fn snapshot(&self) -> Arc<TelemetrySnapshot> {
        self.snapshot_tx.borrow().clone()
    }

    /// Latest snapshot immediately, then every new one. No replay beyond the capped log.
    pub fn subscribe(&self) -> watch::Receiver<Arc<TelemetrySnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Live ResultRecord feed. A subscriber more than
    /// [`PipelineConfig::effective_result_feed_capacity`] records behind loses the oldest.
    pub fn subscribe_results(&self) -> broadcast::Receiver<ResultRecord> {
        self.results_tx.subscribe()
    }

    pub fn latency_bounds(&self) -> Option<(u64, u64)> {
        let state = self.lock();
        let latency = state.recorder.latency();
        latency.min().zip(latency.max())
    }

    fn publish(&self, state: &HubState) {
        self.snapshot_tx.send_replace(Arc::new(state.recorder.snapshot()));
    }
}
