use serde::{Deserialize, Serialize};

use super::event::Mode;

/// Published pipeline state. Owned by the controller; everyone else reads copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    pub running: bool,
    pub mode: Mode,
    pub configured_load: u32,
}

impl PipelineState {
    pub fn new(mode: Mode, configured_load: u32) -> Self {
        Self {
            running: false,
            mode,
            configured_load,
        }
    }

    /// Pure reduction: State + Delta -> Mutated State.
    pub fn reduce(&mut self, delta: StateDelta) {
        match delta {
            StateDelta::Started { load } => {
                self.running = true;
                self.configured_load = load;
            }
            StateDelta::Stopped => {
                self.running = false;
            }
            StateDelta::ModeObserved(mode) => {
                self.mode = mode;
            }
            StateDelta::LoadUpdated(load) => {
                self.configured_load = load;
            }
        }
    }
}

/// Strict state delta. This is the ONLY way PipelineState mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateDelta {
    Started { load: u32 },
    Stopped,
    ModeObserved(Mode),
    LoadUpdated(u32),
}
