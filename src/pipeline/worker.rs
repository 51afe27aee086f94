use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::queue::BoundedWorkQueue;
use crate::compute::workload::Workload;
use crate::kernel::event::ResultRecord;
use crate::kernel::telemetry::hub::{SessionEpoch, TelemetryHub};
use crate::kernel::time::epoch_millis;

/// Single serial consumer: one WorkUnit in flight at a time.
pub struct ComputeWorker {
    pub epoch: SessionEpoch,
    pub queue: Arc<BoundedWorkQueue>,
    pub telemetry: Arc<TelemetryHub>,
    pub workload: Arc<dyn Workload>,
    pub grid_size: usize,
    pub token: CancellationToken,
}

impl ComputeWorker {
    pub async fn run(self) {
        info!("Compute worker started (epoch {:?})", self.epoch);

        loop {
            let mut consumer = tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                consumer = self.queue.consumer() => consumer,
            };
            let unit = tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                unit = consumer.recv() => match unit {
                    Some(unit) => unit,
                    None => break,
                },
            };

            // The execution is never interrupted; a stop is observed once it returns.
            let workload = self.workload.clone();
            let (grid_size, load) = (self.grid_size, unit.load);
            let outcome = tokio::task::spawn_blocking(move || workload.execute(grid_size, load)).await;

            match outcome {
                Ok(stats) => {
                    let record = ResultRecord::from_execution(&unit, &stats, epoch_millis());
                    debug!("{} (load {})", record, record.load);
                    self.telemetry.record_result(self.epoch, record);
                }
                Err(err) => {
                    warn!("Frame {} failed, skipping: {}", unit.sequence, err);
                }
            }

            drop(consumer);
        }

        info!("Compute worker stopped (epoch {:?})", self.epoch);
    }
}
