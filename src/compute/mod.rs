//! CPU-bound synthetic workload executed once per WorkUnit.

pub mod workload;
