//! Frequency Response Evaluation
//!
//! Display-side consumer of the coefficient designer. A `ResponseCurve`
//! designs its own coefficient sets from a settings snapshot and evaluates
//! |H(e^jw)| on demand, so drawing a curve never touches the audio chains.

use std::f64::consts::PI;

use biquad::Coefficients;

use crate::design::{design_high_cut, design_low_cut, design_peak, CutCoefficients};
use crate::error::DspError;
use crate::settings::ChainSettings;

/// Linear magnitude of one second-order section at `frequency`
pub fn magnitude_for_frequency(coeffs: &Coefficients<f32>, frequency: f32, sample_rate: f32) -> f64 {
    let w = 2.0 * PI * f64::from(frequency) / f64::from(sample_rate);
    let (sin1, cos1) = w.sin_cos();
    let (sin2, cos2) = (2.0 * w).sin_cos();

    let (b0, b1, b2) = (f64::from(coeffs.b0), f64::from(coeffs.b1), f64::from(coeffs.b2));
    let (a1, a2) = (f64::from(coeffs.a1), f64::from(coeffs.a2));

    // z^-1 = cos(w) - j sin(w)
    let num_re = b0 + b1 * cos1 + b2 * cos2;
    let num_im = -(b1 * sin1 + b2 * sin2);
    let den_re = 1.0 + a1 * cos1 + a2 * cos2;
    let den_im = -(a1 * sin1 + a2 * sin2);

    (num_re.hypot(num_im)) / (den_re.hypot(den_im))
}

/// Combined response of the low-cut, peak and high-cut stages
#[derive(Debug, Clone)]
pub struct ResponseCurve {
    settings: ChainSettings,
    sample_rate: f32,
    peak: Coefficients<f32>,
    low_cut: CutCoefficients,
    high_cut: CutCoefficients,
}

impl ResponseCurve {
    pub fn new(settings: ChainSettings, sample_rate: f32) -> Result<Self, DspError> {
        Ok(Self {
            peak: design_peak(&settings, sample_rate)?,
            low_cut: design_low_cut(&settings, sample_rate)?,
            high_cut: design_high_cut(&settings, sample_rate)?,
            settings,
            sample_rate,
        })
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Linear magnitude of the full chain at `frequency`
    pub fn magnitude_at(&self, frequency: f32) -> f64 {
        let cut = |set: &CutCoefficients| -> f64 {
            set.iter()
                .map(|section| magnitude_for_frequency(section, frequency, self.sample_rate))
                .product()
        };

        magnitude_for_frequency(&self.peak, frequency, self.sample_rate)
            * cut(&self.low_cut)
            * cut(&self.high_cut)
    }

    pub fn magnitude_db_at(&self, frequency: f32) -> f64 {
        // Floor avoids -inf for exact zeros
        20.0 * self.magnitude_at(frequency).max(1e-12).log10()
    }

    /// Fill `out` with dB magnitudes at log-spaced frequencies from `min_hz` to `max_hz`
    pub fn render_db(&self, out: &mut [f32], min_hz: f32, max_hz: f32) {
        let points = out.len();
        for (i, value) in out.iter_mut().enumerate() {
            *value = self.magnitude_db_at(log_frequency(i, points, min_hz, max_hz)) as f32;
        }
    }
}

/// Frequency of point `index` on a log-spaced axis of `points` entries
pub fn log_frequency(index: usize, points: usize, min_hz: f32, max_hz: f32) -> f32 {
    let steps = points.saturating_sub(1).max(1) as f32;
    min_hz * (max_hz / min_hz).powf(index as f32 / steps)
}
