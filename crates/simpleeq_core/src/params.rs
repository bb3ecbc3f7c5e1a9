//! Lock-free Parameter Store
//!
//! Control values written by the UI/host thread and read by the audio thread.
//! Every scalar lives in its own atomic cell, so neither side ever takes a lock.
//! A revision counter lets pollers notice that something changed.

use std::str::FromStr;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use simpleeq_dsp::{ChainSettings, SettingsSource, Slope};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Every control the equalizer exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterId {
    LowCutFreq,
    HighCutFreq,
    PeakFreq,
    PeakGain,
    PeakQuality,
    LowCutSlope,
    HighCutSlope,
}

impl ParameterId {
    pub const COUNT: usize = 7;

    pub const ALL: [ParameterId; Self::COUNT] = [
        ParameterId::LowCutFreq,
        ParameterId::HighCutFreq,
        ParameterId::PeakFreq,
        ParameterId::PeakGain,
        ParameterId::PeakQuality,
        ParameterId::LowCutSlope,
        ParameterId::HighCutSlope,
    ];

    /// Stable identifier used by hosts and saved state
    pub fn id(self) -> &'static str {
        match self {
            ParameterId::LowCutFreq => "LowCut Freq",
            ParameterId::HighCutFreq => "HighCut Freq",
            ParameterId::PeakFreq => "Peak Freq",
            ParameterId::PeakGain => "Peak Gain",
            ParameterId::PeakQuality => "Peak Quality",
            ParameterId::LowCutSlope => "LowCut Slope",
            ParameterId::HighCutSlope => "HighCut Slope",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn range(self) -> ParamRange {
        match self {
            ParameterId::LowCutFreq => ParamRange::new(20.0, 20000.0, 1.0, 0.25, 20.0),
            ParameterId::HighCutFreq => ParamRange::new(20.0, 20000.0, 1.0, 0.25, 20000.0),
            ParameterId::PeakFreq => ParamRange::new(20.0, 20000.0, 1.0, 0.25, 750.0),
            ParameterId::PeakGain => ParamRange::new(-24.0, 24.0, 0.5, 1.0, 0.0),
            ParameterId::PeakQuality => ParamRange::new(0.1, 10.0, 0.05, 1.0, 1.0),
            ParameterId::LowCutSlope | ParameterId::HighCutSlope => {
                ParamRange::new(0.0, 3.0, 1.0, 1.0, 0.0)
            }
        }
    }

    pub fn is_slope(self) -> bool {
        matches!(self, ParameterId::LowCutSlope | ParameterId::HighCutSlope)
    }
}

impl FromStr for ParameterId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.id() == s)
            .ok_or_else(|| EngineError::UnknownParameter(s.to_string()))
    }
}

/// Value range of one parameter
///
/// `skew` < 1 spends more of the normalized range on low values, which suits
/// frequencies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub skew: f32,
    pub default: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32, step: f32, skew: f32, default: f32) -> Self {
        Self {
            min,
            max,
            step,
            skew,
            default,
        }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Clamp, then round to the nearest step from `min`
    pub fn snap(&self, value: f32) -> f32 {
        let clamped = self.clamp(value);
        if self.step <= 0.0 {
            return clamped;
        }
        // f64 keeps on-grid values like 2.0 (min 0.1, step 0.05) exact after the round trip
        let (min, step) = (f64::from(self.min), f64::from(self.step));
        let steps = ((f64::from(clamped) - min) / step).round();
        self.clamp((min + steps * step) as f32)
    }

    /// Map a value into 0..1 using the skew
    pub fn to_normalized(&self, value: f32) -> f32 {
        let proportion = (self.clamp(value) - self.min) / (self.max - self.min);
        proportion.powf(self.skew)
    }

    /// Map 0..1 back into the range using the skew
    pub fn from_normalized(&self, normalized: f32) -> f32 {
        let proportion = normalized.clamp(0.0, 1.0).powf(1.0 / self.skew);
        self.min + (self.max - self.min) * proportion
    }
}

/// Shared control values
///
/// Writers: UI/host thread. Readers: audio thread (once per block) and the
/// response monitor.
#[derive(Debug)]
pub struct ParameterStore {
    /// f32 bit patterns, indexed by `ParameterId`
    values: [AtomicU32; ParameterId::COUNT],

    /// Bumped after every write
    revision: AtomicU64,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| {
                AtomicU32::new(ParameterId::ALL[i].range().default.to_bits())
            }),
            revision: AtomicU64::new(0),
        }
    }

    /// Store a value, snapped to the parameter's range and step
    ///
    /// Returns the value actually stored.
    pub fn set(&self, id: ParameterId, value: f32) -> EngineResult<f32> {
        if !value.is_finite() {
            return Err(EngineError::InvalidValue {
                parameter: id.id(),
                value,
            });
        }

        let stored = id.range().snap(value);
        self.values[id.index()].store(stored.to_bits(), Ordering::Relaxed);
        self.revision.fetch_add(1, Ordering::Release);

        debug!("Set '{}' to {}", id.id(), stored);
        Ok(stored)
    }

    /// Store a host-normalized (0..1) value
    pub fn set_normalized(&self, id: ParameterId, normalized: f32) -> EngineResult<f32> {
        if !normalized.is_finite() {
            return Err(EngineError::InvalidValue {
                parameter: id.id(),
                value: normalized,
            });
        }
        self.set(id, id.range().from_normalized(normalized))
    }

    pub fn get(&self, id: ParameterId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    pub fn get_normalized(&self, id: ParameterId) -> f32 {
        id.range().to_normalized(self.get(id))
    }

    pub fn set_low_cut_slope(&self, slope: Slope) {
        self.store_slope(ParameterId::LowCutSlope, slope);
    }

    pub fn set_high_cut_slope(&self, slope: Slope) {
        self.store_slope(ParameterId::HighCutSlope, slope);
    }

    fn store_slope(&self, id: ParameterId, slope: Slope) {
        self.values[id.index()].store((slope.ordinal() as f32).to_bits(), Ordering::Relaxed);
        self.revision.fetch_add(1, Ordering::Release);
        debug!("Set '{}' to {:?}", id.id(), slope);
    }

    fn slope(&self, id: ParameterId) -> Slope {
        Slope::from_ordinal_saturating(self.get(id).round().max(0.0) as u32)
    }

    /// Write every field of a snapshot (state restore)
    pub fn apply(&self, settings: &ChainSettings) -> EngineResult<()> {
        self.set(ParameterId::LowCutFreq, settings.low_cut_freq)?;
        self.set(ParameterId::HighCutFreq, settings.high_cut_freq)?;
        self.set(ParameterId::PeakFreq, settings.peak_freq)?;
        self.set(ParameterId::PeakGain, settings.peak_gain_db)?;
        self.set(ParameterId::PeakQuality, settings.peak_quality)?;
        self.set_low_cut_slope(settings.low_cut_slope);
        self.set_high_cut_slope(settings.high_cut_slope);
        Ok(())
    }

    pub fn reset_to_defaults(&self) {
        for id in ParameterId::ALL {
            self.values[id.index()].store(id.range().default.to_bits(), Ordering::Relaxed);
        }
        self.revision.fetch_add(1, Ordering::Release);
        debug!("Parameters reset to defaults");
    }

    /// Monotonic change counter; compare against a previous read to detect edits
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Snapshot of the current values as JSON, for an external persistence layer
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(&self.chain_settings())?)
    }

    /// Restore values previously produced by `to_json`
    pub fn restore_json(&self, json: &str) -> EngineResult<()> {
        let settings: ChainSettings = serde_json::from_str(json)?;
        self.apply(&settings)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsSource for ParameterStore {
    /// Lock-free, allocation-free read of all seven values
    fn chain_settings(&self) -> ChainSettings {
        ChainSettings {
            peak_freq: self.get(ParameterId::PeakFreq),
            peak_gain_db: self.get(ParameterId::PeakGain),
            peak_quality: self.get(ParameterId::PeakQuality),
            low_cut_freq: self.get(ParameterId::LowCutFreq),
            high_cut_freq: self.get(ParameterId::HighCutFreq),
            low_cut_slope: self.slope(ParameterId::LowCutSlope),
            high_cut_slope: self.slope(ParameterId::HighCutSlope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_defaults_match_chain_settings() {
        let store = ParameterStore::new();
        assert_eq!(store.chain_settings(), ChainSettings::default());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_ids_round_trip() {
        for id in ParameterId::ALL {
            assert_eq!(id.id().parse::<ParameterId>().unwrap(), id);
        }
        assert!(matches!(
            "Band Gain".parse::<ParameterId>(),
            Err(EngineError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_set_clamps_and_snaps() {
        let store = ParameterStore::new();

        assert_eq!(store.set(ParameterId::PeakGain, 100.0).unwrap(), 24.0);
        assert_eq!(store.set(ParameterId::PeakGain, -100.0).unwrap(), -24.0);
        assert_eq!(store.set(ParameterId::PeakGain, 3.3).unwrap(), 3.5);
        assert_eq!(store.set(ParameterId::LowCutFreq, 5.0).unwrap(), 20.0);
        assert_eq!(store.set(ParameterId::PeakQuality, 0.0).unwrap(), 0.1);
        assert_eq!(store.get(ParameterId::PeakQuality), 0.1);
    }

    #[test]
    fn test_set_rejects_nan() {
        let store = ParameterStore::new();
        assert!(matches!(
            store.set(ParameterId::PeakFreq, f32::NAN),
            Err(EngineError::InvalidValue { .. })
        ));
        assert_eq!(store.get(ParameterId::PeakFreq), 750.0);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_revision_increments_on_every_write() {
        let store = ParameterStore::new();
        store.set(ParameterId::PeakGain, 3.0).unwrap();
        store.set(ParameterId::PeakGain, 3.0).unwrap();
        store.set_low_cut_slope(Slope::Db24);
        assert_eq!(store.revision(), 3);

        store.reset_to_defaults();
        assert_eq!(store.revision(), 4);
        assert_eq!(store.chain_settings(), ChainSettings::default());
    }

    #[test]
    fn test_slopes_in_snapshot() {
        let store = ParameterStore::new();
        store.set_low_cut_slope(Slope::Db48);
        store.set(ParameterId::HighCutSlope, 2.0).unwrap();

        let settings = store.chain_settings();
        assert_eq!(settings.low_cut_slope, Slope::Db48);
        assert_eq!(settings.high_cut_slope, Slope::Db36);

        // Out-of-range choice indices are clamped by the range
        store.set(ParameterId::HighCutSlope, 9.0).unwrap();
        assert_eq!(store.chain_settings().high_cut_slope, Slope::Db48);
    }

    #[test]
    fn test_normalized_mapping() {
        let range = ParameterId::PeakFreq.range();
        assert_eq!(range.from_normalized(0.0), 20.0);
        assert!((range.from_normalized(1.0) - 20000.0).abs() < 0.01);

        // Skewed: the midpoint sits far below the linear midpoint
        let mid = range.from_normalized(0.5);
        assert!(mid < 2000.0, "got {}", mid);
        assert!((range.to_normalized(mid) - 0.5).abs() < 1e-4);

        let store = ParameterStore::new();
        store.set_normalized(ParameterId::PeakGain, 0.75).unwrap();
        assert_eq!(store.get(ParameterId::PeakGain), 12.0);
        assert!((store.get_normalized(ParameterId::PeakGain) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_apply_and_json_restore() {
        let store = ParameterStore::new();
        let settings = ChainSettings {
            peak_freq: 1000.0,
            peak_gain_db: 6.0,
            peak_quality: 2.0,
            low_cut_freq: 80.0,
            high_cut_freq: 12000.0,
            low_cut_slope: Slope::Db36,
            high_cut_slope: Slope::Db24,
        };
        store.apply(&settings).unwrap();
        assert_eq!(store.chain_settings(), settings);

        let json = store.to_json().unwrap();
        let restored = ParameterStore::new();
        restored.restore_json(&json).unwrap();
        assert_eq!(restored.chain_settings(), settings);

        assert!(matches!(
            restored.restore_json("{ not json"),
            Err(EngineError::Serialization(_))
        ));
    }

    #[test]
    fn test_concurrent_writes_and_reads() {
        let store = Arc::new(ParameterStore::new());
        let writer_store = Arc::clone(&store);

        let writer = thread::spawn(move || {
            for i in 0..1000 {
                writer_store
                    .set(ParameterId::PeakGain, (i % 48) as f32 - 24.0)
                    .unwrap();
            }
        });

        for _ in 0..1000 {
            let settings = store.chain_settings();
            assert!((-24.0..=24.0).contains(&settings.peak_gain_db));
            assert!(settings.validate(48000.0).is_ok());
        }
        writer.join().unwrap();
        assert_eq!(store.revision(), 1000);
    }
}
