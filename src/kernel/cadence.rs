use std::time::Duration;

use super::event::Mode;
use crate::config::PipelineConfig;

/// Producer parameters for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceParameters {
    pub interval: Duration,
    pub effective_load: u32,
}

impl CadenceParameters {
    pub fn interval_ms(&self) -> u64 {
        self.interval.as_millis() as u64
    }
}

/// Derives emission rate and effective load from the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceController {
    normal_rate_hz: u32,
    power_save_rate_hz: u32,
}

impl Default for CadenceController {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl CadenceController {
    pub fn new(normal_rate_hz: u32, power_save_rate_hz: u32) -> Self {
        Self {
            normal_rate_hz: normal_rate_hz.max(1),
            power_save_rate_hz: power_save_rate_hz.max(1),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.normal_rate_hz, config.power_save_rate_hz)
    }

    /// Pure Projection: Mode + Base Load -> Interval + Effective Load
    pub fn parameters(&self, mode: Mode, base_load: u32) -> CadenceParameters {
        match mode {
            Mode::Normal => CadenceParameters {
                interval: interval_for(self.normal_rate_hz),
                effective_load: base_load,
            },
            Mode::PowerSave => CadenceParameters {
                interval: interval_for(self.power_save_rate_hz),
                effective_load: base_load.saturating_sub(1).max(1),
            },
        }
    }
}

fn interval_for(rate_hz: u32) -> Duration {
    Duration::from_millis(1000 / u64::from(rate_hz))
}
