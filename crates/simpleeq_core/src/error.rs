//! Engine Error Types

use thiserror::Error;

/// Errors that can occur outside the audio path
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("DSP error: {0}")]
    Dsp(#[from] simpleeq_dsp::DspError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid value {value} for parameter '{parameter}'")]
    InvalidValue { parameter: &'static str, value: f32 },

    #[error("Failed to (de)serialize state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to spawn thread: {0}")]
    ThreadSpawn(String),

    #[error("Channel receive error - sender dropped")]
    ChannelRecvError,
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
