pub mod cadence;
pub mod controller;
pub mod event;
pub mod lifecycle;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod time;
