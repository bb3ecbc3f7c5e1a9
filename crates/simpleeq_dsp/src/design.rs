//! Coefficient Designer
//!
//! Pure functions turning frequencies, gains and Q values into normalized
//! second-order coefficient blocks. Based on the RBJ (Robert Bristow-Johnson)
//! Audio EQ Cookbook; cutoff filters are Butterworth designs split into
//! cascaded second-order sections.
//!
//! # Preconditions
//!
//! Callers pass a positive, finite sample rate, frequencies strictly inside
//! `(0, sample_rate / 2)` and a positive Q. Violations are reported as
//! [`DspError`] and never clamped here.

use std::f64::consts::PI;

use biquad::{Coefficients, ToHertz, Type};

use crate::error::DspError;
use crate::settings::{ChainSettings, Slope};

/// Maximum number of cascaded sections in a cutoff filter (48 dB/oct)
pub const MAX_SECTIONS: usize = 4;

/// Coefficients that pass audio through unmodified
pub const PASSTHROUGH: Coefficients<f32> = Coefficients {
    a1: 0.0,
    a2: 0.0,
    b0: 1.0,
    b1: 0.0,
    b2: 0.0,
};

/// Convert dB gain to linear amplitude
/// Formula: amplitude = 10^(dB/20)
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Ordered second-order sections for one cutoff filter
///
/// Fixed capacity so designing a new set never allocates.
#[derive(Debug, Clone, Copy)]
pub struct CutCoefficients {
    sections: [Coefficients<f32>; MAX_SECTIONS],
    len: usize,
}

impl CutCoefficients {
    /// Build from up to [`MAX_SECTIONS`] blocks; extra blocks are ignored
    pub fn from_sections(blocks: &[Coefficients<f32>]) -> Self {
        let len = blocks.len().min(MAX_SECTIONS);
        let mut sections = [PASSTHROUGH; MAX_SECTIONS];
        sections[..len].copy_from_slice(&blocks[..len]);
        Self { sections, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<&Coefficients<f32>> {
        self.as_slice().get(index)
    }

    pub fn as_slice(&self) -> &[Coefficients<f32>] {
        &self.sections[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coefficients<f32>> {
        self.as_slice().iter()
    }
}

/// Which side of the spectrum a cutoff filter removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// High-pass: removes content below the cutoff
    LowCut,
    /// Low-pass: removes content above the cutoff
    HighCut,
}

fn check_sample_rate(sample_rate: f32) -> Result<(), DspError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(DspError::InvalidSampleRate(sample_rate))
    }
}

fn check_frequency(frequency: f32, sample_rate: f32) -> Result<(), DspError> {
    if frequency > 0.0 && frequency < sample_rate / 2.0 {
        Ok(())
    } else {
        Err(DspError::FrequencyOutOfRange {
            frequency,
            sample_rate,
        })
    }
}

/// Parametric peak/notch filter
///
/// `gain_db` is converted to a linear gain factor; at 0 dB the numerator equals
/// the denominator and the filter is the identity.
pub fn peak_coefficients(
    frequency: f32,
    gain_db: f32,
    q: f32,
    sample_rate: f32,
) -> Result<Coefficients<f32>, DspError> {
    check_sample_rate(sample_rate)?;
    check_frequency(frequency, sample_rate)?;
    if !(q.is_finite() && q > 0.0) {
        return Err(DspError::InvalidQuality(q));
    }
    if !gain_db.is_finite() {
        return Err(DspError::InvalidGain(gain_db));
    }

    // A = sqrt(linear gain) = 10^(dB/40)
    let a = f64::from(db_to_gain(gain_db)).sqrt();
    let omega = 2.0 * PI * f64::from(frequency) / f64::from(sample_rate);
    let alpha = omega.sin() / (2.0 * f64::from(q));
    let cos_omega = omega.cos();

    let a0 = 1.0 + alpha / a;
    let coeffs = Coefficients {
        a1: (-2.0 * cos_omega / a0) as f32,
        a2: ((1.0 - alpha / a) / a0) as f32,
        b0: ((1.0 + alpha * a) / a0) as f32,
        b1: (-2.0 * cos_omega / a0) as f32,
        b2: ((1.0 - alpha * a) / a0) as f32,
    };

    if is_finite(&coeffs) {
        Ok(coeffs)
    } else {
        Err(DspError::InvalidCoefficients {
            frequency,
            sample_rate,
        })
    }
}

/// Quality factor of section `index` in an even-order Butterworth cascade
///
/// Poles sit at angles `pi * (2k + 1) / (2N)` from the negative real axis;
/// each conjugate pair becomes one section with `Q = 1 / (2 cos(angle))`.
fn butterworth_section_q(order: usize, index: usize) -> f64 {
    let angle = PI * (2 * index + 1) as f64 / (2 * order) as f64;
    1.0 / (2.0 * angle.cos())
}

/// Butterworth cutoff filter of order `2 * slope.sections()`
pub fn cut_coefficients(
    kind: CutKind,
    frequency: f32,
    slope: Slope,
    sample_rate: f32,
) -> Result<CutCoefficients, DspError> {
    check_sample_rate(sample_rate)?;
    check_frequency(frequency, sample_rate)?;

    let order = slope.order();
    let mut sections = [PASSTHROUGH; MAX_SECTIONS];

    for (index, section) in sections.iter_mut().take(slope.sections()).enumerate() {
        let filter = match kind {
            CutKind::LowCut => Type::HighPass,
            CutKind::HighCut => Type::LowPass,
        };
        // Designed in f64: low cutoffs at high rates put poles close to z = 1
        let designed = Coefficients::<f64>::from_params(
            filter,
            f64::from(sample_rate).hz(),
            f64::from(frequency).hz(),
            butterworth_section_q(order, index),
        )
        .map_err(|_| DspError::InvalidCoefficients {
            frequency,
            sample_rate,
        })?;
        *section = Coefficients {
            a1: designed.a1 as f32,
            a2: designed.a2 as f32,
            b0: designed.b0 as f32,
            b1: designed.b1 as f32,
            b2: designed.b2 as f32,
        };
    }

    Ok(CutCoefficients {
        sections,
        len: slope.sections(),
    })
}

pub fn low_cut_coefficients(
    frequency: f32,
    slope: Slope,
    sample_rate: f32,
) -> Result<CutCoefficients, DspError> {
    cut_coefficients(CutKind::LowCut, frequency, slope, sample_rate)
}

pub fn high_cut_coefficients(
    frequency: f32,
    slope: Slope,
    sample_rate: f32,
) -> Result<CutCoefficients, DspError> {
    cut_coefficients(CutKind::HighCut, frequency, slope, sample_rate)
}

/// Peak stage coefficients for a settings snapshot
pub fn design_peak(settings: &ChainSettings, sample_rate: f32) -> Result<Coefficients<f32>, DspError> {
    peak_coefficients(
        settings.peak_freq,
        settings.peak_gain_db,
        settings.peak_quality,
        sample_rate,
    )
}

/// Low-cut sections for a settings snapshot
pub fn design_low_cut(settings: &ChainSettings, sample_rate: f32) -> Result<CutCoefficients, DspError> {
    low_cut_coefficients(settings.low_cut_freq, settings.low_cut_slope, sample_rate)
}

/// High-cut sections for a settings snapshot
pub fn design_high_cut(settings: &ChainSettings, sample_rate: f32) -> Result<CutCoefficients, DspError> {
    high_cut_coefficients(settings.high_cut_freq, settings.high_cut_slope, sample_rate)
}

fn is_finite(c: &Coefficients<f32>) -> bool {
    [c.a1, c.a2, c.b0, c.b1, c.b2].iter().all(|v| v.is_finite())
}

/// Raw bit patterns of a block, for exact comparisons
pub fn coefficient_bits(c: &Coefficients<f32>) -> [u32; 5] {
    [c.b0, c.b1, c.b2, c.a1, c.a2].map(f32::to_bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::magnitude_for_frequency;

    const FS: f32 = 48000.0;

    #[test]
    fn test_db_to_gain() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(6.0) - 1.9953).abs() < 1e-3);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_coefficients_finite_across_range() {
        for sample_rate in [44100.0_f32, 48000.0, 96000.0] {
            let nyquist = sample_rate / 2.0;
            let mut freq = 20.5_f32;
            while freq < nyquist - 50.0 {
                let peak = peak_coefficients(freq, 12.0, 0.7, sample_rate).unwrap();
                assert!(is_finite(&peak), "peak at {}Hz", freq);

                for slope in Slope::ALL {
                    let low = low_cut_coefficients(freq, slope, sample_rate).unwrap();
                    let high = high_cut_coefficients(freq, slope, sample_rate).unwrap();
                    assert!(low.iter().all(is_finite), "low cut at {}Hz", freq);
                    assert!(high.iter().all(is_finite), "high cut at {}Hz", freq);
                }
                freq *= 1.25;
            }
        }
    }

    #[test]
    fn test_peak_zero_gain_is_identity() {
        for (freq, q) in [(100.0, 0.1), (1000.0, 1.0), (8000.0, 10.0)] {
            let c = peak_coefficients(freq, 0.0, q, FS).unwrap();
            assert!((c.b0 - 1.0).abs() < 1e-6);
            assert!((c.b1 - c.a1).abs() < 1e-6);
            assert!((c.b2 - c.a2).abs() < 1e-6);
        }
    }

    #[test]
    fn test_peak_gain_at_center() {
        let c = peak_coefficients(1000.0, 6.0, 1.0, FS).unwrap();
        let db = 20.0 * magnitude_for_frequency(&c, 1000.0, FS).log10();
        assert!((db - 6.0).abs() < 0.01, "got {}dB", db);

        let c = peak_coefficients(1000.0, -12.0, 1.0, FS).unwrap();
        let db = 20.0 * magnitude_for_frequency(&c, 1000.0, FS).log10();
        assert!((db + 12.0).abs() < 0.01, "got {}dB", db);
    }

    #[test]
    fn test_section_count_follows_slope() {
        for slope in Slope::ALL {
            let c = low_cut_coefficients(100.0, slope, FS).unwrap();
            assert_eq!(c.len(), slope.sections());
        }
    }

    #[test]
    fn test_butterworth_q_values() {
        assert!((butterworth_section_q(2, 0) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((butterworth_section_q(4, 0) - 0.5412).abs() < 1e-3);
        assert!((butterworth_section_q(4, 1) - 1.3066).abs() < 1e-3);
    }

    #[test]
    fn test_cutoff_is_minus_three_db() {
        // Maximally flat: -3dB at the cutoff for every order
        for slope in Slope::ALL {
            let c = low_cut_coefficients(1000.0, slope, FS).unwrap();
            let mag: f64 = c
                .iter()
                .map(|s| magnitude_for_frequency(s, 1000.0, FS))
                .product();
            let db = 20.0 * mag.log10();
            assert!((db + 3.01).abs() < 0.1, "{:?}: {}dB", slope, db);
        }
    }

    #[test]
    fn test_low_cutoff_stays_flat_at_high_rate() {
        let sample_rate = 192000.0;
        let c = low_cut_coefficients(20.0, Slope::Db48, sample_rate).unwrap();
        let db_at = |freq: f32| -> f64 {
            let mag: f64 = c
                .iter()
                .map(|s| magnitude_for_frequency(s, freq, sample_rate))
                .product();
            20.0 * mag.log10()
        };

        // Ideal 8th-order Butterworth is -0.01dB at 1.5x the cutoff
        assert!(db_at(30.0) < 1.0, "30Hz: {}dB", db_at(30.0));
        assert!(db_at(2000.0).abs() < 0.1, "2kHz: {}dB", db_at(2000.0));
    }

    #[test]
    fn test_slope_monotonicity() {
        let cutoff = 1000.0;
        let mut previous_low = f64::INFINITY;
        let mut previous_high = f64::INFINITY;

        for slope in Slope::ALL {
            let low = low_cut_coefficients(cutoff, slope, FS).unwrap();
            let high = high_cut_coefficients(cutoff, slope, FS).unwrap();

            // Two octaves past cutoff on each side
            let low_mag: f64 = low
                .iter()
                .map(|s| magnitude_for_frequency(s, cutoff / 4.0, FS))
                .product();
            let high_mag: f64 = high
                .iter()
                .map(|s| magnitude_for_frequency(s, cutoff * 4.0, FS))
                .product();

            assert!(low_mag < previous_low, "{:?} not steeper than previous", slope);
            assert!(high_mag < previous_high, "{:?} not steeper than previous", slope);
            previous_low = low_mag;
            previous_high = high_mag;
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            peak_coefficients(24000.0, 0.0, 1.0, FS),
            Err(DspError::FrequencyOutOfRange { .. })
        ));
        assert!(matches!(
            peak_coefficients(1000.0, 0.0, 0.0, FS),
            Err(DspError::InvalidQuality(_))
        ));
        assert!(matches!(
            low_cut_coefficients(0.0, Slope::Db12, FS),
            Err(DspError::FrequencyOutOfRange { .. })
        ));
        assert!(matches!(
            high_cut_coefficients(1000.0, Slope::Db12, -1.0),
            Err(DspError::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn test_design_is_deterministic() {
        let settings = ChainSettings {
            peak_gain_db: 3.5,
            low_cut_slope: Slope::Db48,
            ..Default::default()
        };
        let a = design_low_cut(&settings, FS).unwrap();
        let b = design_low_cut(&settings, FS).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(coefficient_bits(x), coefficient_bits(y));
        }
        assert_eq!(
            coefficient_bits(&design_peak(&settings, FS).unwrap()),
            coefficient_bits(&design_peak(&settings, FS).unwrap())
        );
    }

    #[test]
    fn test_from_sections_truncates() {
        let blocks = [PASSTHROUGH; 6];
        let set = CutCoefficients::from_sections(&blocks);
        assert_eq!(set.len(), MAX_SECTIONS);
        assert!(set.get(MAX_SECTIONS).is_none());
        assert!(CutCoefficients::from_sections(&[]).is_empty());
    }
}
