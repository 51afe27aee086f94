use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::kernel::event::{RenderQualityEvent, ResultRecord};
use crate::kernel::time::SequenceNumber;

/// Read-only view rebuilt after every contributing event. Never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub current_latency_ms: u64,
    /// Mean over the latency ring (at most `latency_history` results).
    pub average_latency_ms: f64,
    pub jank_percentage: f64,
    pub jank_count: u64,
    /// Frames observed in the current jank window.
    pub jank_window_frames: u64,
    pub total_frames_processed: u64,
    pub dropped_units: u64,
    /// Newest first.
    pub recent_log: Vec<LogEntry>,
}

/// Processing log line derived from one ResultRecord.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub sequence: SequenceNumber,
    pub load: u32,
    pub elapsed_ms: u64,
    pub mean: f64,
    pub stddev: f64,
    pub timestamp_ms: u64,
}

impl From<&ResultRecord> for LogEntry {
    fn from(record: &ResultRecord) -> Self {
        Self {
            sequence: record.sequence,
            load: record.load,
            elapsed_ms: record.elapsed_ms,
            mean: record.mean,
            stddev: record.stddev,
            timestamp_ms: record.completed_at_ms,
        }
    }
}

/// Fixed-capacity FIFO of latencies; evicts the oldest on overflow.
#[derive(Debug, Clone)]
pub struct LatencyWindow {
    samples: VecDeque<u64>,
    capacity: usize,
    sum: u64,
}

impl LatencyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            sum: 0,
        }
    }

    pub fn push(&mut self, latency_ms: u64) {
        if self.samples.len() >= self.capacity {
            if let Some(evicted) = self.samples.pop_front() {
                self.sum -= evicted;
            }
        }
        self.samples.push_back(latency_ms);
        self.sum += latency_ms;
    }

    /// Arithmetic mean of the current contents, 0 when empty.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum as f64 / self.samples.len() as f64
        }
    }

    pub fn min(&self) -> Option<u64> {
        self.samples.iter().copied().min()
    }

    pub fn max(&self) -> Option<u64> {
        self.samples.iter().copied().max()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.sum = 0;
    }
}

/// Time-bounded jank counter.
///
/// The window restarts (counts zeroed, start moved to the event's timestamp)
/// when it has not started yet or when more than `window_ms` elapsed since its start.
#[derive(Debug, Clone)]
pub struct JankWindow {
    window_ms: u64,
    window_start: Option<u64>,
    total_frames: u64,
    jank_frames: u64,
}

impl JankWindow {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            window_start: None,
            total_frames: 0,
            jank_frames: 0,
        }
    }

    pub fn observe(&mut self, event: &RenderQualityEvent) {
        let expired = match self.window_start {
            None => true,
            Some(start) => event.timestamp_ms.saturating_sub(start) > self.window_ms,
        };
        if expired {
            self.window_start = Some(event.timestamp_ms);
            self.total_frames = 0;
            self.jank_frames = 0;
        }

        self.total_frames += 1;
        if event.is_jank {
            self.jank_frames += 1;
        }
    }

    /// Always within [0, 100].
    pub fn percentage(&self) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            100.0 * self.jank_frames as f64 / self.total_frames as f64
        }
    }

    pub fn jank_frames(&self) -> u64 {
        self.jank_frames
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn window_start(&self) -> Option<u64> {
        self.window_start
    }

    pub fn reset(&mut self) {
        self.window_start = None;
        self.total_frames = 0;
        self.jank_frames = 0;
    }
}

/// Newest-first log capped at `capacity`; the oldest entry falls off.
#[derive(Debug, Clone)]
pub struct ProcessingLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl ProcessingLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn prepend(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
