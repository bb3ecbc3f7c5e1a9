//! SimpleEQ Core - Parameters and Editor Support
//!
//! This crate sits between the host/UI and the DSP chain:
//! - Lock-free parameter store the audio thread snapshots once per block
//! - Range, step and skew metadata for every automatable parameter
//! - Background response-curve monitor for the editor
//! - JSON state save/restore
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        UI Thread                            │
//! │   set() ──▶ ParameterStore ◀── ResponseMonitor ──events──▶  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ atomics (relaxed)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Audio Thread                           │
//! │   chain_settings() ──▶ StereoProcessor ──▶ L / R chains     │
//! │              (Zero allocation in this path)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod message;
mod monitor;
mod params;

pub use config::{MonitorConfig, ProcessorConfig, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
pub use error::{EngineError, EngineResult};
pub use message::{Command, Event};
pub use monitor::ResponseMonitor;
pub use params::{ParamRange, ParameterId, ParameterStore};

// Re-export DSP types for convenience
pub use simpleeq_dsp::{ChainSettings, SettingsSource, Slope, StereoProcessor};
