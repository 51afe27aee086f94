use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::time::SequenceNumber;
use crate::compute::workload::WorkloadStats;

/// Power/ambient mode reported by the platform. The core observes it, it does not own it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Normal,
    PowerSave,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Mode::Normal),
            "power-save" | "powersave" | "power_save" => Ok(Mode::PowerSave),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

/// One scheduled, not-yet-executed request for the workload executor.
/// Consumed exactly once by the worker or dropped by the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    pub sequence: SequenceNumber,
    pub load: u32,
}

/// Output of executing one WorkUnit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub sequence: SequenceNumber,
    /// Effective load the unit was executed with.
    pub load: u32,
    pub elapsed_ms: u64,
    pub mean: f64,
    pub stddev: f64,
    pub completed_at_ms: u64,
}

impl ResultRecord {
    pub fn from_execution(unit: &WorkUnit, stats: &WorkloadStats, completed_at_ms: u64) -> Self {
        Self {
            sequence: unit.sequence,
            load: unit.load,
            elapsed_ms: stats.elapsed.as_millis() as u64,
            mean: stats.mean,
            stddev: stats.stddev,
            completed_at_ms,
        }
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame {} • {}ms", self.sequence, self.elapsed_ms)
    }
}

/// Frame pacing sample from the render-quality observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderQualityEvent {
    pub timestamp_ms: u64,
    pub is_jank: bool,
}
