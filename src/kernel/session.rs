use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::cadence::CadenceController;
use super::state::PipelineState;
use super::telemetry::hub::{SessionEpoch, TelemetryHub};
use crate::compute::workload::Workload;
use crate::pipeline::producer::{FrameProducer, FrameSequencer};
use crate::pipeline::queue::BoundedWorkQueue;
use crate::pipeline::worker::ComputeWorker;

/// Everything a producer/worker pair needs from its owner.
pub struct SessionContext {
    pub runtime: Handle,
    pub state: watch::Receiver<PipelineState>,
    pub cadence: CadenceController,
    pub telemetry: Arc<TelemetryHub>,
    pub workload: Arc<dyn Workload>,
    pub grid_size: usize,
}

/// One live producer/worker pair and the token that cancels both.
#[derive(Debug)]
struct TaskPair {
    token: CancellationToken,
    producer: JoinHandle<()>,
    worker: JoinHandle<()>,
}

/// A start..stop session: the queue and sequence counter survive restarts,
/// the task pair is replaced on every restart.
#[derive(Debug)]
pub struct Session {
    epoch: SessionEpoch,
    queue: Arc<BoundedWorkQueue>,
    sequencer: Arc<FrameSequencer>,
    tasks: Option<TaskPair>,
}

impl Session {
    pub fn new(epoch: SessionEpoch, queue_capacity: usize) -> Self {
        Self {
            epoch,
            queue: Arc::new(BoundedWorkQueue::new(queue_capacity)),
            sequencer: Arc::new(FrameSequencer::new()),
            tasks: None,
        }
    }

    pub fn queue(&self) -> &Arc<BoundedWorkQueue> {
        &self.queue
    }

    pub fn sequencer(&self) -> &Arc<FrameSequencer> {
        &self.sequencer
    }

    /// Spawns a fresh producer/worker pair, cancelling any previous one first.
    /// The outgoing worker finishes its in-flight unit before exiting.
    pub fn spawn(&mut self, ctx: &SessionContext) {
        self.cancel();

        let token = CancellationToken::new();
        let producer = FrameProducer {
            epoch: self.epoch,
            queue: self.queue.clone(),
            sequencer: self.sequencer.clone(),
            state: ctx.state.clone(),
            cadence: ctx.cadence,
            telemetry: ctx.telemetry.clone(),
            token: token.clone(),
        };
        let worker = ComputeWorker {
            epoch: self.epoch,
            queue: self.queue.clone(),
            telemetry: ctx.telemetry.clone(),
            workload: ctx.workload.clone(),
            grid_size: ctx.grid_size,
            token: token.clone(),
        };

        self.tasks = Some(TaskPair {
            token,
            producer: ctx.runtime.spawn(producer.run()),
            worker: ctx.runtime.spawn(worker.run()),
        });
    }

    /// Signals the pair to stop without waiting. Returns the handles for callers that do want to wait.
    pub fn cancel(&mut self) -> Vec<JoinHandle<()>> {
        match self.tasks.take() {
            Some(pair) => {
                pair.token.cancel();
                vec![pair.producer, pair.worker]
            }
            None => Vec::new(),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel();
    }
}
