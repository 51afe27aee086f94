use thiserror::Error;

/// Errors reported synchronously by the control surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("load {load} is outside the accepted range {min}..={max}")]
    InvalidLoad { load: u32, min: u32, max: u32 },

    #[error("pipeline has been shut down")]
    ShutDown,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
