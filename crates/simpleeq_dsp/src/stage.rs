//! Single Filter Stage
//!
//! One second-order IIR section with its own delay line and a replaceable
//! coefficient block.

use biquad::{Biquad, Coefficients, DirectForm2Transposed};

use crate::design::PASSTHROUGH;

/// A biquad section that can be bypassed without touching its state
///
/// Coefficient replacement is a whole-block `Copy` assignment; the delay line
/// is left as-is so parameter changes do not restart the filter.
pub struct FilterStage {
    // DirectForm2Transposed: better numerical stability than DF1
    filter: DirectForm2Transposed<f32>,
    coefficients: Coefficients<f32>,
    bypassed: bool,
}

impl FilterStage {
    pub fn new(coefficients: Coefficients<f32>) -> Self {
        Self {
            filter: DirectForm2Transposed::<f32>::new(coefficients),
            coefficients,
            bypassed: false,
        }
    }

    /// Process one sample
    ///
    /// # Real-time Safety
    /// No allocations, O(1). Bypassed stages return the input and do not
    /// advance the delay line.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        if self.bypassed {
            return sample;
        }
        self.filter.run(sample)
    }

    /// Replace the live coefficient block
    pub fn set_coefficients(&mut self, coefficients: Coefficients<f32>) {
        self.coefficients = coefficients;
        self.filter.update_coefficients(coefficients);
    }

    pub fn coefficients(&self) -> &Coefficients<f32> {
        &self.coefficients
    }

    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Clear the delay line, keeping coefficients and bypass state
    pub fn reset(&mut self) {
        self.filter.reset_state();
    }
}

impl Default for FilterStage {
    fn default() -> Self {
        Self::new(PASSTHROUGH)
    }
}
