use std::time::Duration;
use telemetry_lab::kernel::event::WorkUnit;
use telemetry_lab::kernel::time::SequenceNumber;
use telemetry_lab::pipeline::producer::FrameSequencer;
use telemetry_lab::pipeline::queue::{BoundedWorkQueue, EnqueueOutcome};

fn unit(seq: u64) -> WorkUnit {
    WorkUnit { sequence: SequenceNumber(seq), load: 2 }
}

#[tokio::test]
async fn test_burst_of_fifteen_drops_five() {
    let queue = BoundedWorkQueue::new(10);

    let rejected = (1..=15)
        .map(|seq| queue.try_enqueue(unit(seq)))
        .filter(|outcome| *outcome == EnqueueOutcome::Rejected)
        .count();

    assert_eq!(rejected, 5);
    assert_eq!(queue.dropped(), 5);
    assert_eq!(queue.len(), 10);
}

#[tokio::test]
async fn test_full_queue_rejects_newest_and_keeps_contents() {
    let queue = BoundedWorkQueue::new(10);
    for seq in 1..=10 {
        assert_eq!(queue.try_enqueue(unit(seq)), EnqueueOutcome::Accepted);
    }
    assert_eq!(queue.try_enqueue(unit(11)), EnqueueOutcome::Rejected);

    let mut consumer = queue.consumer().await;
    let drained: Vec<u64> = std::iter::from_fn(|| consumer.try_recv())
        .map(|u| u.sequence.value())
        .collect();
    assert_eq!(drained, (1..=10).collect::<Vec<_>>(), "FIFO, newest rejected");
}

#[tokio::test]
async fn test_dequeue_suspends_when_empty() {
    let queue = BoundedWorkQueue::new(4);
    let waited = tokio::time::timeout(Duration::from_millis(50), queue.dequeue()).await;
    assert!(waited.is_err(), "dequeue on an empty queue must wait");

    queue.try_enqueue(unit(1));
    let got = tokio::time::timeout(Duration::from_millis(50), queue.dequeue())
        .await
        .expect("unit available");
    assert_eq!(got, Some(unit(1)));
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_sequencer_is_strictly_increasing() {
    let queue = BoundedWorkQueue::new(2);
    let sequencer = FrameSequencer::new();

    let emitted: Vec<(WorkUnit, EnqueueOutcome)> = (0..5).map(|_| sequencer.emit(&queue, 3)).collect();
    for pair in emitted.windows(2) {
        assert!(pair[1].0.sequence > pair[0].0.sequence);
    }
    assert_eq!(emitted[0].0.sequence, SequenceNumber(1));
    assert_eq!(sequencer.last(), SequenceNumber(5));

    // Rejected units still consume a sequence number.
    let outcomes: Vec<_> = emitted.iter().map(|(_, o)| *o).collect();
    assert_eq!(outcomes.iter().filter(|o| **o == EnqueueOutcome::Rejected).count(), 3);
}
