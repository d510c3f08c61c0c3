//! Error types for the visualization engine

use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum Error {
    /// Capture access was denied or no capture device matched
    #[error("capture permission error: {0}")]
    Permission(String),

    /// Media element missing, wrong type, or lacking a playable source
    #[error("invalid source: {0}")]
    InvalidSource(String),

    /// Unregistered visualization mode
    #[error("unknown visualization mode: {0}")]
    UnknownMode(String),

    /// No usable audio API/host available at all
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    /// A renderer failed to instantiate
    #[error("renderer load error for mode {mode}: {reason}")]
    RendererLoad {
        /// Mode whose renderer could not be built
        mode: String,
        /// Failure detail
        reason: String,
    },

    /// Invalid analysis or style configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (WAV decoding, PNG export)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV decode error
    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for errors raised by the capture-permission path
    pub fn is_permission(&self) -> bool {
        matches!(self, Error::Permission(_))
    }

    /// True for errors raised by media-element validation
    pub fn is_invalid_source(&self) -> bool {
        matches!(self, Error::InvalidSource(_))
    }

    /// True for unrecognized mode tags
    pub fn is_unknown_mode(&self) -> bool {
        matches!(self, Error::UnknownMode(_))
    }
}
