use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

use crate::error::ConfigError;

/// Environment variable the binaries read an optional JSON config path from.
pub const CONFIG_ENV: &str = "TELEMETRY_LAB_CONFIG";

pub const DEFAULT_QUEUE_CAPACITY: usize = 10;
pub const DEFAULT_RESULT_FEED_CAPACITY: usize = 10;
pub const DEFAULT_NORMAL_RATE_HZ: u32 = 20;
pub const DEFAULT_POWER_SAVE_RATE_HZ: u32 = 10;
pub const DEFAULT_GRID_SIZE: usize = 256;
pub const DEFAULT_LATENCY_HISTORY: usize = 100;
pub const DEFAULT_LOG_CAPACITY: usize = 50;
pub const DEFAULT_JANK_WINDOW_MS: u64 = 30_000;

/// Upper bound on `result_feed_capacity`.
pub const MAX_RESULT_FEED_CAPACITY: usize = 1 << 16;

/// Every tunable of the pipeline. Missing keys fall back to the defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ingress queue capacity (drop-newest on overflow).
    pub queue_capacity: usize,
    /// Result feed buffer per subscriber (drop-oldest on lag).
    /// Rounded up to a power of two, see [`PipelineConfig::effective_result_feed_capacity`].
    pub result_feed_capacity: usize,
    pub normal_rate_hz: u32,
    pub power_save_rate_hz: u32,
    /// Side length of the square workload grid.
    pub grid_size: usize,
    pub latency_history: usize,
    pub log_capacity: usize,
    pub jank_window_ms: u64,
    pub min_load: u32,
    pub max_load: u32,
    pub default_load: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            result_feed_capacity: DEFAULT_RESULT_FEED_CAPACITY,
            normal_rate_hz: DEFAULT_NORMAL_RATE_HZ,
            power_save_rate_hz: DEFAULT_POWER_SAVE_RATE_HZ,
            grid_size: DEFAULT_GRID_SIZE,
            latency_history: DEFAULT_LATENCY_HISTORY,
            log_capacity: DEFAULT_LOG_CAPACITY,
            jank_window_ms: DEFAULT_JANK_WINDOW_MS,
            min_load: 1,
            max_load: 5,
            default_load: 2,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Loads from `TELEMETRY_LAB_CONFIG` when set, defaults otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Records a lagging subscriber can fall behind before it starts losing the oldest.
    /// The broadcast ring only comes in power-of-two sizes, so 10 keeps 16.
    pub fn effective_result_feed_capacity(&self) -> usize {
        self.result_feed_capacity.next_power_of_two()
    }

    pub fn load_range(&self) -> RangeInclusive<u32> {
        self.min_load..=self.max_load
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let nonzero = [
            ("queue_capacity", self.queue_capacity),
            ("result_feed_capacity", self.result_feed_capacity),
            ("latency_history", self.latency_history),
            ("log_capacity", self.log_capacity),
        ];
        for (name, value) in nonzero {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if self.result_feed_capacity > MAX_RESULT_FEED_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "result_feed_capacity {} exceeds {}",
                self.result_feed_capacity, MAX_RESULT_FEED_CAPACITY
            )));
        }
        if self.normal_rate_hz == 0 || self.power_save_rate_hz == 0 {
            return Err(ConfigError::Invalid("tick rates must be positive".into()));
        }
        if self.grid_size < 3 {
            return Err(ConfigError::Invalid(format!(
                "grid_size {} is smaller than the 3x3 kernel",
                self.grid_size
            )));
        }
        if self.min_load == 0 || self.min_load > self.max_load {
            return Err(ConfigError::Invalid(format!(
                "load range {}..={} is empty or includes zero",
                self.min_load, self.max_load
            )));
        }
        if !self.load_range().contains(&self.default_load) {
            return Err(ConfigError::Invalid(format!(
                "default_load {} is outside {}..={}",
                self.default_load, self.min_load, self.max_load
            )));
        }
        Ok(())
    }
}
