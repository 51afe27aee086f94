use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::queue::{BoundedWorkQueue, EnqueueOutcome};
use crate::kernel::cadence::CadenceController;
use crate::kernel::event::WorkUnit;
use crate::kernel::state::PipelineState;
use crate::kernel::telemetry::hub::{SessionEpoch, TelemetryHub};
use crate::kernel::time::SequenceNumber;

/// Assigns sequence numbers and enqueues under one lock, so enqueue order always
/// matches sequence order even when an outgoing producer overlaps its replacement.
#[derive(Debug, Default)]
pub struct FrameSequencer {
    last: Mutex<SequenceNumber>,
}

impl FrameSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, queue: &BoundedWorkQueue, load: u32) -> (WorkUnit, EnqueueOutcome) {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        *last = last.next();
        let unit = WorkUnit { sequence: *last, load };
        (unit, queue.try_enqueue(unit))
    }

    pub fn last(&self) -> SequenceNumber {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Periodic ticker: one WorkUnit per tick, drop-and-continue on a full queue.
pub struct FrameProducer {
    pub epoch: SessionEpoch,
    pub queue: Arc<BoundedWorkQueue>,
    pub sequencer: Arc<FrameSequencer>,
    pub state: watch::Receiver<PipelineState>,
    pub cadence: CadenceController,
    pub telemetry: Arc<TelemetryHub>,
    pub token: CancellationToken,
}

impl FrameProducer {
    pub async fn run(self) {
        info!("Frame producer started (epoch {:?})", self.epoch);

        loop {
            if self.token.is_cancelled() {
                break;
            }
            let iteration_start = Instant::now();

            // Copy out so the whole iteration sees one consistent state.
            let state = *self.state.borrow();
            let params = self.cadence.parameters(state.mode, state.configured_load);

            let (unit, outcome) = self.sequencer.emit(&self.queue, params.effective_load);
            if outcome == EnqueueOutcome::Rejected {
                self.telemetry.record_drop(self.epoch);
                debug!("Frame {} dropped due to backpressure", unit.sequence);
            }

            // Deadline is anchored at the iteration start so time spent above doesn't accumulate drift.
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = sleep_until(iteration_start + params.interval) => {}
            }
        }

        info!("Frame producer stopped at frame {}", self.sequencer.last());
    }
}
