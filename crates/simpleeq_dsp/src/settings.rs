//! Chain Settings Snapshot
//!
//! A `ChainSettings` is the value the audio path reads once per block. It carries
//! no identity beyond its fields and is rebuilt every time control state is sampled.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DspError;

/// Roll-off steepness of a cutoff filter
///
/// Each step adds one cascaded second-order section (12 dB/octave).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Slope {
    #[default]
    Db12,
    Db24,
    Db36,
    Db48,
}

impl Slope {
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Ordinal 0-3, one fewer than the number of active sections
    pub fn ordinal(self) -> u32 {
        match self {
            Slope::Db12 => 0,
            Slope::Db24 => 1,
            Slope::Db36 => 2,
            Slope::Db48 => 3,
        }
    }

    /// Number of cascaded second-order sections this slope activates
    pub fn sections(self) -> usize {
        self.ordinal() as usize + 1
    }

    /// Butterworth filter order (two poles per section)
    pub fn order(self) -> usize {
        self.sections() * 2
    }

    pub fn db_per_octave(self) -> f32 {
        12.0 * self.sections() as f32
    }

    /// Map an ordinal onto a slope, saturating at 48 dB/oct
    ///
    /// Used where the ordinal comes from storage that only ever holds valid values.
    pub fn from_ordinal_saturating(ordinal: u32) -> Self {
        Self::ALL[(ordinal as usize).min(Self::ALL.len() - 1)]
    }
}

impl TryFrom<u32> for Slope {
    type Error = DspError;

    fn try_from(ordinal: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(ordinal as usize)
            .copied()
            .ok_or(DspError::InvalidSlope(ordinal))
    }
}

/// Snapshot of every control the filter chain depends on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainSettings {
    pub peak_freq: f32,
    pub peak_gain_db: f32,
    pub peak_quality: f32,
    pub low_cut_freq: f32,
    pub high_cut_freq: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            peak_freq: 750.0,
            peak_gain_db: 0.0,
            peak_quality: 1.0,
            low_cut_freq: 20.0,
            high_cut_freq: 20000.0,
            low_cut_slope: Slope::Db12,
            high_cut_slope: Slope::Db12,
        }
    }
}

impl ChainSettings {
    /// Check every coefficient-design precondition against a sample rate
    pub fn validate(&self, sample_rate: f32) -> Result<(), DspError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate(sample_rate));
        }

        let nyquist = sample_rate / 2.0;
        for frequency in [self.peak_freq, self.low_cut_freq, self.high_cut_freq] {
            if !(frequency > 0.0 && frequency < nyquist) {
                return Err(DspError::FrequencyOutOfRange {
                    frequency,
                    sample_rate,
                });
            }
        }

        if !(self.peak_quality.is_finite() && self.peak_quality > 0.0) {
            return Err(DspError::InvalidQuality(self.peak_quality));
        }
        if !self.peak_gain_db.is_finite() {
            return Err(DspError::InvalidGain(self.peak_gain_db));
        }
        Ok(())
    }
}

/// Where the audio path reads its settings from
///
/// # Real-time Safety Contract
///
/// `chain_settings()` is called once per audio block. Implementors MUST NOT
/// allocate, lock, or block.
pub trait SettingsSource {
    fn chain_settings(&self) -> ChainSettings;
}

// Fixed settings (offline rendering, tests)
impl SettingsSource for ChainSettings {
    fn chain_settings(&self) -> ChainSettings {
        *self
    }
}

impl<T: SettingsSource + ?Sized> SettingsSource for &T {
    fn chain_settings(&self) -> ChainSettings {
        (**self).chain_settings()
    }
}

impl<T: SettingsSource + ?Sized> SettingsSource for Arc<T> {
    fn chain_settings(&self) -> ChainSettings {
        (**self).chain_settings()
    }
}
