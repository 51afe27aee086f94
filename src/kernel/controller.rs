use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::cadence::{CadenceController, CadenceParameters};
use super::event::{Mode, RenderQualityEvent, ResultRecord};
use super::lifecycle::{LifecycleAction, LifecycleGraph, LifecycleRequest, PipelineStatus};
use super::session::{Session, SessionContext};
use super::state::{PipelineState, StateDelta};
use super::telemetry::hub::TelemetryHub;
use super::telemetry::metrics::TelemetrySnapshot;
use super::time::SequenceNumber;
use crate::compute::workload::{ConvolutionWorkload, Workload};
use crate::config::PipelineConfig;
use crate::error::{ConfigError, PipelineError};

#[derive(Debug, Default)]
struct ControllerInner {
    session: Option<Session>,
    shut_down: bool,
}

/// Owns PipelineState and the producer/worker lifecycle.
///
/// Every control call is synchronous and idempotent: illegal transitions are
/// no-ops. Observers read state through watch/broadcast subscriptions.
pub struct PipelineController {
    config: PipelineConfig,
    cadence: CadenceController,
    telemetry: Arc<TelemetryHub>,
    workload: Arc<dyn Workload>,
    state_tx: watch::Sender<PipelineState>,
    runtime: Handle,
    inner: Mutex<ControllerInner>,
}

impl PipelineController {
    /// Binds to the ambient Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime; use [`Self::with_runtime`] there.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        Self::with_runtime(config, Handle::current())
    }

    pub fn with_runtime(config: PipelineConfig, runtime: Handle) -> Result<Self, ConfigError> {
        config.validate()?;
        let (state_tx, _) = watch::channel(PipelineState::new(Mode::Normal, config.default_load));
        Ok(Self {
            cadence: CadenceController::from_config(&config),
            telemetry: Arc::new(TelemetryHub::new(&config)),
            workload: Arc::new(ConvolutionWorkload),
            config,
            state_tx,
            runtime,
            inner: Mutex::new(ControllerInner::default()),
        })
    }

    /// Replaces the executor run for every unit. Takes effect from the next start.
    pub fn with_workload(mut self, workload: Arc<dyn Workload>) -> Self {
        self.workload = workload;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn validate_load(&self, load: u32) -> Result<(), PipelineError> {
        if self.config.load_range().contains(&load) {
            Ok(())
        } else {
            warn!("Rejected load {} (accepted {:?})", load, self.config.load_range());
            Err(PipelineError::InvalidLoad {
                load,
                min: self.config.min_load,
                max: self.config.max_load,
            })
        }
    }

    fn session_context(&self) -> SessionContext {
        SessionContext {
            runtime: self.runtime.clone(),
            state: self.state_tx.subscribe(),
            cadence: self.cadence,
            telemetry: self.telemetry.clone(),
            workload: self.workload.clone(),
            grid_size: self.config.grid_size,
        }
    }

    // === Control surface ===

    /// Stopped -> Running. Resets telemetry history. A no-op while already running.
    pub fn start(&self, load: u32) -> Result<(), PipelineError> {
        self.validate_load(load)?;
        let mut inner = self.lock();
        if inner.shut_down {
            return Err(PipelineError::ShutDown);
        }
        self.apply(&mut inner, LifecycleRequest::Start { load });
        Ok(())
    }

    /// Running -> Stopped. Does not wait for an in-flight execution; keeps telemetry history.
    pub fn stop(&self) {
        let mut inner = self.lock();
        self.apply(&mut inner, LifecycleRequest::Stop);
    }

    /// Takes effect on the producer's next iteration. A no-op while stopped.
    pub fn set_load(&self, load: u32) -> Result<(), PipelineError> {
        self.validate_load(load)?;
        let mut inner = self.lock();
        if inner.shut_down {
            return Err(PipelineError::ShutDown);
        }
        self.apply(&mut inner, LifecycleRequest::UpdateLoad { load });
        Ok(())
    }

    // === External collaborators ===

    /// Mode source entry point. Duplicate notifications of the current mode are no-ops.
    pub fn on_mode_changed(&self, mode: Mode) {
        let mut inner = self.lock();
        if inner.shut_down {
            return;
        }
        if self.state_tx.borrow().mode == mode {
            debug!("Mode {:?} already active", mode);
            return;
        }
        self.state_tx.send_modify(|s| s.reduce(StateDelta::ModeObserved(mode)));
        info!("Mode changed to {:?}", mode);
        self.apply(&mut inner, LifecycleRequest::ModeChanged(mode));
    }

    /// Render-quality observer entry point.
    pub fn on_render_quality_event(&self, event: RenderQualityEvent) {
        if self.lock().shut_down {
            return;
        }
        self.telemetry.record_render_quality(event);
    }

    /// Teardown: cancels every task, waits for them to exit and releases the queue.
    /// All later control calls fail with [`PipelineError::ShutDown`] or are ignored.
    pub async fn shutdown(&self) {
        let handles = {
            let mut inner = self.lock();
            if inner.shut_down {
                return;
            }
            inner.shut_down = true;
            self.state_tx.send_modify(|s| s.reduce(StateDelta::Stopped));
            match inner.session.take() {
                Some(mut session) => session.cancel(),
                None => Vec::new(),
            }
        };

        for handle in handles {
            if let Err(err) = handle.await {
                warn!("Pipeline task ended abnormally: {}", err);
            }
        }
        info!("Pipeline shut down");
    }

    fn apply(&self, inner: &mut ControllerInner, request: LifecycleRequest) -> Option<LifecycleAction> {
        let status = self.status();
        let Some(action) = LifecycleGraph::transition(status, request) else {
            debug!("Ignored {:?} while {:?}", request, status);
            return None;
        };

        match action {
            LifecycleAction::Launch { load } => {
                let epoch = self.telemetry.begin_session();
                self.state_tx.send_modify(|s| s.reduce(StateDelta::Started { load }));
                let mut session = Session::new(epoch, self.config.queue_capacity);
                session.spawn(&self.session_context());
                // Replacing the previous session drops its (already cancelled) queue.
                inner.session = Some(session);
                let params = self.current_parameters();
                info!(
                    "Pipeline started: load {}, interval {}ms, effective load {}",
                    load,
                    params.interval_ms(),
                    params.effective_load
                );
            }
            LifecycleAction::Halt => {
                if let Some(session) = inner.session.as_mut() {
                    session.cancel();
                }
                self.state_tx.send_modify(|s| s.reduce(StateDelta::Stopped));
                info!("Pipeline stopped");
            }
            LifecycleAction::Restart { mode } => {
                if let Some(session) = inner.session.as_mut() {
                    session.spawn(&self.session_context());
                }
                let params = self.current_parameters();
                info!(
                    "Pipeline restarted for {:?}: interval {}ms, effective load {}",
                    mode,
                    params.interval_ms(),
                    params.effective_load
                );
            }
            LifecycleAction::Retune { load } => {
                self.state_tx.send_modify(|s| s.reduce(StateDelta::LoadUpdated(load)));
                info!("Configured load set to {}", load);
            }
        }

        debug_assert_eq!(self.status(), LifecycleGraph::next_status(status, action));
        Some(action)
    }

    // === Read-only views ===

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus::from_running(self.state_tx.borrow().running)
    }

    pub fn state(&self) -> PipelineState {
        *self.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PipelineState> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> Arc<TelemetrySnapshot> {
        self.telemetry.snapshot()
    }

    pub fn subscribe_telemetry(&self) -> watch::Receiver<Arc<TelemetrySnapshot>> {
        self.telemetry.subscribe()
    }

    pub fn subscribe_results(&self) -> broadcast::Receiver<ResultRecord> {
        self.telemetry.subscribe_results()
    }

    /// Parameters the producer derives on its next iteration.
    pub fn current_parameters(&self) -> CadenceParameters {
        let state = self.state();
        self.cadence.parameters(state.mode, state.configured_load)
    }

    /// Units rejected by the current session's queue.
    pub fn dropped_units(&self) -> u64 {
        self.lock()
            .session
            .as_ref()
            .map(|s| s.queue().dropped())
            .unwrap_or(0)
    }

    pub fn last_sequence(&self) -> SequenceNumber {
        self.lock()
            .session
            .as_ref()
            .map(|s| s.sequencer().last())
            .unwrap_or_default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
