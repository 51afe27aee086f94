//! Runtime tasks: the bounded ingress queue, the periodic producer and the serial worker.

pub mod producer;
pub mod queue;
pub mod worker;
