use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::kernel::controller::PipelineController;
use crate::kernel::event::RenderQualityEvent;
use crate::kernel::time::epoch_millis;

/// A frame counts as jank when its interval exceeds the budget by this factor.
pub const JANK_FACTOR: f64 = 1.5;

/// Forwards events from an external observer until its channel closes.
pub fn spawn_render_forwarder(
    controller: Arc<PipelineController>,
    mut events: mpsc::Receiver<RenderQualityEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            controller.on_render_quality_event(event);
        }
    })
}

/// Stand-in for a platform frame-metrics observer: ticks at the display refresh
/// rate and flags a frame as jank when it arrived late.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    budget: Duration,
}

impl FramePacer {
    pub fn new(refresh_hz: u32) -> Self {
        Self {
            budget: Duration::from_secs_f64(1.0 / f64::from(refresh_hz.max(1))),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Pure classification of one observed frame interval.
    pub fn classify(&self, frame_interval: Duration) -> bool {
        frame_interval.as_secs_f64() > self.budget.as_secs_f64() * JANK_FACTOR
    }

    pub fn spawn(self, controller: Arc<PipelineController>, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Frame pacer started ({:?} budget)", self.budget);
            let mut cadence = tokio::time::interval(self.budget);
            // Late frames must stay late; bursting would hide them.
            cadence.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_frame: Option<Instant> = None;

            loop {
                let now = tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = cadence.tick() => Instant::now(),
                };
                if let Some(previous) = last_frame {
                    controller.on_render_quality_event(RenderQualityEvent {
                        timestamp_ms: epoch_millis(),
                        is_jank: self.classify(now - previous),
                    });
                }
                last_frame = Some(now);
            }
        })
    }
}
