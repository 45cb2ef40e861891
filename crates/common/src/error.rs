use thiserror::Error;

/// Top-level error type for FloodAware startup and wiring. Per-request
/// failures are page state, not errors of this type.
#[derive(Debug, Error)]
pub enum FloodAwareError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for FloodAware operations.
pub type Result<T> = std::result::Result<T, FloodAwareError>;
