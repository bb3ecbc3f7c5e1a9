//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during DSP operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("Frequency {frequency}Hz is outside (0, Nyquist) at sample rate {sample_rate}Hz")]
    FrequencyOutOfRange { frequency: f32, sample_rate: f32 },

    #[error("Quality factor must be positive and finite, got {0}")]
    InvalidQuality(f32),

    #[error("Gain must be finite, got {0}dB")]
    InvalidGain(f32),

    #[error("Invalid slope ordinal: {0} (must be 0-3)")]
    InvalidSlope(u32),

    #[error("Invalid filter coefficients for frequency {frequency}Hz at sample rate {sample_rate}Hz")]
    InvalidCoefficients { frequency: f32, sample_rate: f32 },

    #[error("Block size must be positive, got {0}")]
    InvalidBlockSize(usize),

    #[error("Buffer size mismatch: expected {expected}, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },

    #[error("Processor has not been prepared with a sample rate")]
    NotPrepared,
}
