//! Telemetry aggregation
//!
//! # INVARIANT
//! Telemetry is a READ-ONLY side-effect layer for the pipeline.
//! The producer and worker write into it but never read from it.
//!
//! Snapshots are rebuilt after every contributing event and published as
//! immutable `Arc`s; subscribers always see the latest one.

pub mod event;
pub mod hub;
pub mod metrics;
pub mod recorder;
