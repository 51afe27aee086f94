use serde::{Deserialize, Serialize};

use super::event::Mode;

/// The two lifecycle states of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStatus {
    /// No producer or worker task is live. Telemetry history is kept for inspection.
    #[default]
    Stopped,
    /// Producer and worker are live and bound to the current session.
    Running,
}

impl PipelineStatus {
    pub fn from_running(running: bool) -> Self {
        if running {
            Self::Running
        } else {
            Self::Stopped
        }
    }
}

/// Requests that may cause a lifecycle transition.
/// These are REQUESTS, not forces. The graph validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleRequest {
    Start { load: u32 },
    Stop,
    ModeChanged(Mode),
    UpdateLoad { load: u32 },
}

/// What the controller must do to honor an accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Reset telemetry, open a new session and spawn producer + worker.
    Launch { load: u32 },
    /// Cancel producer + worker, keep telemetry history.
    Halt,
    /// Respawn producer + worker for the new mode, keep telemetry history.
    Restart { mode: Mode },
    /// Update the configured load; the producer picks it up on its next iteration.
    Retune { load: u32 },
}

/// The state machine that governs start/stop/reconfigure transitions.
pub struct LifecycleGraph;

impl LifecycleGraph {
    /// Pure function: (Current Status, Request) -> Action.
    /// Returns None if the request is illegal in the current status, which callers treat as a no-op.
    pub fn transition(current: PipelineStatus, request: LifecycleRequest) -> Option<LifecycleAction> {
        use LifecycleRequest::*;
        use PipelineStatus::*;

        match (current, request) {
            (Stopped, Start { load }) => Some(LifecycleAction::Launch { load }),

            (Running, Stop) => Some(LifecycleAction::Halt),
            (Running, ModeChanged(mode)) => Some(LifecycleAction::Restart { mode }),
            (Running, UpdateLoad { load }) => Some(LifecycleAction::Retune { load }),

            // Duplicate start, or stop/reconfigure while idle.
            _ => None,
        }
    }

    pub fn next_status(current: PipelineStatus, action: LifecycleAction) -> PipelineStatus {
        match action {
            LifecycleAction::Launch { .. } => PipelineStatus::Running,
            LifecycleAction::Halt => PipelineStatus::Stopped,
            LifecycleAction::Restart { .. } | LifecycleAction::Retune { .. } => current,
        }
    }
}
