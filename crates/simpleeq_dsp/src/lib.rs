//! SimpleEQ DSP - Digital Signal Processing Module
//!
//! This crate provides the filter chain of a three-band parametric equalizer:
//! - Butterworth low-cut and high-cut filters at 12/24/36/48 dB per octave
//! - A parametric peak/notch filter between them
//! - Independent left and right chains updated identically every block
//! - Frequency response evaluation for drawing curves off the audio thread
//!
//! # Architecture
//!
//! ```text
//! ChainSettings ──▶ design ──▶ coefficient blocks ──▶ MonoChain (L)
//!                                                 └─▶ MonoChain (R)
//!
//! MonoChain: CutFilter (low-cut, 4 stages) ─▶ FilterStage (peak) ─▶ CutFilter (high-cut, 4 stages)
//! ```
//!
//! The processing path follows a strict "no allocation in audio callback" rule.
//! Coefficient blocks are replaced whole between samples, never edited in place.

mod chain;
mod cut;
pub mod design;
mod error;
mod processor;
mod response;
mod settings;
mod stage;

pub use chain::{ChainPosition, MonoChain};
pub use cut::CutFilter;
pub use design::{
    db_to_gain, design_high_cut, design_low_cut, design_peak, CutCoefficients, CutKind,
    MAX_SECTIONS,
};
pub use error::DspError;
pub use processor::{AudioProcessor, ProcessSpec, ProcessorState, StereoProcessor};
pub use response::{log_frequency, magnitude_for_frequency, ResponseCurve};
pub use settings::{ChainSettings, SettingsSource, Slope};
pub use stage::FilterStage;

// Coefficient block type shared with the biquad crate
pub use biquad::Coefficients;
