use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::kernel::controller::PipelineController;
use crate::kernel::event::Mode;

/// Default polling period for platform power-save flags.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(5);

/// Something that can report the platform's current mode on demand.
pub trait ModeProbe: Send + Sync + 'static {
    fn current_mode(&self) -> Mode;
}

/// Probe backed by a shared flag, e.g. set from a platform callback.
#[derive(Debug, Clone, Default)]
pub struct PowerSaveFlag {
    enabled: Arc<AtomicBool>,
}

impl PowerSaveFlag {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::Relaxed)
    }
}

impl ModeProbe for PowerSaveFlag {
    fn current_mode(&self) -> Mode {
        if self.enabled.load(Ordering::Relaxed) {
            Mode::PowerSave
        } else {
            Mode::Normal
        }
    }
}

/// Polls `probe` every `period` and forwards the reading.
/// Repeated identical readings are absorbed by the controller's idempotence.
pub fn spawn_mode_poller<P: ModeProbe>(
    controller: Arc<PipelineController>,
    probe: P,
    period: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Mode poller started ({}ms period)", period.as_millis());
        let mut cadence = tokio::time::interval(period);
        cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = cadence.tick() => {}
            }
            let mode = probe.current_mode();
            debug!("Mode probe reads {:?}", mode);
            controller.on_mode_changed(mode);
        }
    })
}

/// Forwards every value published on a mode watch channel, including the current one.
pub fn spawn_mode_forwarder(
    controller: Arc<PipelineController>,
    mut modes: watch::Receiver<Mode>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let mode = *modes.borrow_and_update();
            controller.on_mode_changed(mode);
            if modes.changed().await.is_err() {
                // Mode source went away.
                break;
            }
        }
    })
}
