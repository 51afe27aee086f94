pub mod config;
pub mod error;
pub mod kernel;
pub mod pipeline;
pub mod compute;
pub mod drivers;

// Re-export specific items for convenient access
pub use config::PipelineConfig;
pub use error::{ConfigError, PipelineError};
pub use kernel::controller::PipelineController;
pub use kernel::event::{Mode, RenderQualityEvent, ResultRecord, WorkUnit};
pub use kernel::telemetry::metrics::TelemetrySnapshot;
