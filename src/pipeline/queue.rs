use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, Mutex, MutexGuard};

use crate::kernel::event::WorkUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Accepted,
    /// Queue was full; the offered unit was dropped (drop-newest).
    Rejected,
}

/// Fixed-capacity FIFO between producer and worker.
///
/// Overflow policy is reject-newest: a full queue refuses the offered unit,
/// leaves its contents untouched and bumps the drop counter.
#[derive(Debug)]
pub struct BoundedWorkQueue {
    tx: mpsc::Sender<WorkUnit>,
    rx: Mutex<mpsc::Receiver<WorkUnit>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl BoundedWorkQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Never blocks.
    pub fn try_enqueue(&self, unit: WorkUnit) -> EnqueueOutcome {
        match self.tx.try_send(unit) {
            Ok(()) => EnqueueOutcome::Accepted,
            // The receiver lives as long as the queue, so Closed cannot happen here.
            Err(mpsc::error::TrySendError::Full(_)) | Err(mpsc::error::TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                EnqueueOutcome::Rejected
            }
        }
    }

    /// Exclusive consumer handle. Holding it across an execution keeps results in
    /// enqueue order even when a replacement worker is already waiting.
    pub async fn consumer(&self) -> WorkConsumer<'_> {
        WorkConsumer {
            rx: self.rx.lock().await,
        }
    }

    /// Suspends while the queue is empty.
    pub async fn dequeue(&self) -> Option<WorkUnit> {
        self.consumer().await.recv().await
    }

    pub fn len(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

pub struct WorkConsumer<'a> {
    rx: MutexGuard<'a, mpsc::Receiver<WorkUnit>>,
}

impl WorkConsumer<'_> {
    pub async fn recv(&mut self) -> Option<WorkUnit> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<WorkUnit> {
        self.rx.try_recv().ok()
    }
}
