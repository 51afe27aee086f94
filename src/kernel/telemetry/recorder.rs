use super::event::TelemetryEvent;
use super::metrics::{JankWindow, LatencyWindow, LogEntry, ProcessingLog, TelemetrySnapshot};
use crate::config::PipelineConfig;

/// Owns the rolling windows. Single-threaded; the hub serializes access.
#[derive(Debug)]
pub struct TelemetryRecorder {
    latency: LatencyWindow,
    jank: JankWindow,
    log: ProcessingLog,
    current_latency_ms: u64,
    total_frames_processed: u64,
    dropped_units: u64,
}

impl TelemetryRecorder {
    pub fn new(latency_history: usize, log_capacity: usize, jank_window_ms: u64) -> Self {
        Self {
            latency: LatencyWindow::new(latency_history),
            jank: JankWindow::new(jank_window_ms),
            log: ProcessingLog::new(log_capacity),
            current_latency_ms: 0,
            total_frames_processed: 0,
            dropped_units: 0,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.latency_history, config.log_capacity, config.jank_window_ms)
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::ResultRecorded(record) => {
                self.current_latency_ms = record.elapsed_ms;
                self.latency.push(record.elapsed_ms);
                self.log.prepend(LogEntry::from(&record));
                self.total_frames_processed += 1;
            }
            TelemetryEvent::RenderQuality(frame) => {
                self.jank.observe(&frame);
            }
            TelemetryEvent::UnitDropped => {
                self.dropped_units += 1;
            }
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            current_latency_ms: self.current_latency_ms,
            average_latency_ms: self.latency.average(),
            jank_percentage: self.jank.percentage(),
            jank_count: self.jank.jank_frames(),
            jank_window_frames: self.jank.total_frames(),
            total_frames_processed: self.total_frames_processed,
            dropped_units: self.dropped_units,
            recent_log: self.log.to_vec(),
        }
    }

    pub fn latency(&self) -> &LatencyWindow {
        &self.latency
    }

    /// Clears every window and counter; called when a new session starts.
    pub fn clear(&mut self) {
        self.latency.clear();
        self.jank.reset();
        self.log.clear();
        self.current_latency_ms = 0;
        self.total_frames_processed = 0;
        self.dropped_units = 0;
    }
}
