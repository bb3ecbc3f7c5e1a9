//! Processor and Monitor Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use simpleeq_dsp::ProcessSpec;

use crate::error::{EngineError, EngineResult};

/// Lowest rate whose Nyquist frequency is above every stored frequency (20kHz)
pub const MIN_SAMPLE_RATE: u32 = 44100;

pub const MAX_SAMPLE_RATE: u32 = 192000;

/// Audio stream configuration the processor is prepared with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Sample rate in Hz (e.g., 44100, 48000, 96000)
    ///
    /// Must keep the top of every frequency range below Nyquist.
    pub sample_rate: u32,

    /// Number of audio channels (the chain is stereo-only)
    pub channels: u16,

    /// Largest block the host will deliver, in frames
    pub max_block_size: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
            max_block_size: 512,
        }
    }
}

impl ProcessorConfig {
    /// Calculate latency in milliseconds for one block
    pub fn latency_ms(&self) -> f32 {
        (self.max_block_size as f32 / self.sample_rate as f32) * 1000.0
    }

    /// Validate configuration
    pub fn validate(&self) -> EngineResult<()> {
        if self.sample_rate < MIN_SAMPLE_RATE || self.sample_rate > MAX_SAMPLE_RATE {
            return Err(EngineError::Config(format!(
                "Invalid sample rate: {} (supported {}-{}Hz)",
                self.sample_rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE
            )));
        }
        if self.channels != 2 {
            return Err(EngineError::Config(format!(
                "Invalid channel count: {} (stereo only)",
                self.channels
            )));
        }
        if self.max_block_size < 16 || self.max_block_size > 8192 {
            return Err(EngineError::Config(format!(
                "Invalid block size: {}",
                self.max_block_size
            )));
        }
        Ok(())
    }

    pub fn process_spec(&self) -> ProcessSpec {
        ProcessSpec::new(self.sample_rate as f32, self.max_block_size as usize)
    }
}

/// Editor-side response curve refresh settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Sample rate the curve is evaluated at
    pub sample_rate: u32,

    /// Poll frequency in Hz
    pub refresh_hz: u32,

    /// Points per rendered curve
    pub points: usize,

    /// Lowest frequency on the curve
    pub min_hz: f32,

    /// Highest frequency on the curve
    pub max_hz: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            refresh_hz: 50,
            points: 256,
            min_hz: 20.0,
            max_hz: 20000.0,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.refresh_hz == 0 || self.refresh_hz > 1000 {
            return Err(EngineError::Config(format!(
                "Invalid refresh rate: {}Hz",
                self.refresh_hz
            )));
        }
        if self.points < 2 {
            return Err(EngineError::Config(format!(
                "Curve needs at least 2 points, got {}",
                self.points
            )));
        }
        if !(self.min_hz > 0.0 && self.min_hz < self.max_hz) {
            return Err(EngineError::Config(format!(
                "Invalid frequency span: {}Hz - {}Hz",
                self.min_hz, self.max_hz
            )));
        }
        if self.max_hz >= self.sample_rate as f32 / 2.0 {
            return Err(EngineError::Config(format!(
                "Curve end {}Hz is above Nyquist for {}Hz",
                self.max_hz, self.sample_rate
            )));
        }
        Ok(())
    }

    /// Time between polls
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.refresh_hz.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessorConfig::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channels, 2);
        assert_eq!(config.max_block_size, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_latency_calculation() {
        let config = ProcessorConfig {
            max_block_size: 480, // Exactly 10ms at 48kHz
            ..Default::default()
        };
        assert!((config.latency_ms() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_validation() {
        let invalid_rate = ProcessorConfig {
            sample_rate: 100,
            ..Default::default()
        };
        assert!(invalid_rate.validate().is_err());

        // 20kHz is above Nyquist at 32kHz
        let below_audio_band = ProcessorConfig {
            sample_rate: 32000,
            ..Default::default()
        };
        assert!(below_audio_band.validate().is_err());

        let cd_rate = ProcessorConfig {
            sample_rate: 44100,
            ..Default::default()
        };
        assert!(cd_rate.validate().is_ok());

        let mono = ProcessorConfig {
            channels: 1,
            ..Default::default()
        };
        assert!(mono.validate().is_err());

        let invalid_block = ProcessorConfig {
            max_block_size: 10,
            ..Default::default()
        };
        assert!(invalid_block.validate().is_err());
    }

    #[test]
    fn test_process_spec() {
        let spec = ProcessorConfig::default().process_spec();
        assert_eq!(spec.sample_rate, 48000.0);
        assert_eq!(spec.max_block_size, 512);
    }

    #[test]
    fn test_monitor_defaults() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_monitor_validation() {
        let above_nyquist = MonitorConfig {
            sample_rate: 32000,
            ..Default::default()
        };
        assert!(above_nyquist.validate().is_err());

        let no_points = MonitorConfig {
            points: 1,
            ..Default::default()
        };
        assert!(no_points.validate().is_err());

        let zero_rate = MonitorConfig {
            refresh_hz: 0,
            ..Default::default()
        };
        assert!(zero_rate.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = ProcessorConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ProcessorConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.sample_rate, deserialized.sample_rate);
        assert_eq!(config.max_block_size, deserialized.max_block_size);
    }
}
