//! Error types for the cityscape renderer and its HTTP service

use thiserror::Error;

/// Result type alias for renderer and service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to callers for any drawing or encoding fault.
pub const RENDER_FAILURE_MESSAGE: &str = "Failed to generate cityscape";

/// Message returned to callers for faults nobody classified.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Errors that can occur while rendering or serving a cityscape
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied bad input (bad/negative/non-numeric dimension)
    #[error("{0}")]
    ValidationError(String),

    /// A drawing primitive failed (surface allocation, degenerate geometry)
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// The finished surface could not be encoded
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// No route matched the request
    #[error("{0}")]
    NotFound(String),

    /// Failed to start the service
    #[error("Initialization failed: {0}")]
    InitializationError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status code associated with this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::ValidationError(_) => 400,
            Error::NotFound(_) => 404,
            Error::RenderError(_)
            | Error::EncodeError(_)
            | Error::InitializationError(_)
            | Error::ConfigError(_)
            | Error::Other(_) => 500,
        }
    }

    /// Whether the error is a classified, expected failure.
    ///
    /// Anything else is answered with [`UNEXPECTED_ERROR_MESSAGE`].
    pub fn is_operational(&self) -> bool {
        !matches!(self, Error::Other(_))
    }

    /// Whether the error belongs to the render-failure class.
    pub fn is_render_failure(&self) -> bool {
        matches!(self, Error::RenderError(_) | Error::EncodeError(_))
    }

    /// The message that may be shown to a caller.
    ///
    /// Client errors are passed through; server-side causes never are.
    pub fn public_message(&self) -> String {
        match self {
            Error::ValidationError(msg) | Error::NotFound(msg) => msg.clone(),
            Error::RenderError(_) | Error::EncodeError(_) => RENDER_FAILURE_MESSAGE.to_string(),
            Error::InitializationError(_) | Error::ConfigError(_) | Error::Other(_) => {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl From<png::EncodingError> for Error {
    fn from(err: png::EncodingError) -> Self {
        Error::EncodeError(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Error::RenderError(format!("surface allocation failed: {}", err))
    }
}
