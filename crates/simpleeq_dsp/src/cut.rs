//! Cutoff Filter Chain
//!
//! Four filter stages in series. The slope decides how many of them run;
//! the rest are bypassed and pass audio through.

use crate::design::{CutCoefficients, MAX_SECTIONS};
use crate::settings::Slope;
use crate::stage::FilterStage;

pub struct CutFilter {
    stages: [FilterStage; MAX_SECTIONS],
}

impl CutFilter {
    pub fn new() -> Self {
        Self {
            stages: core::array::from_fn(|_| FilterStage::default()),
        }
    }

    /// Activate sections `0..slope.sections()` with the matching coefficient blocks
    ///
    /// Every stage is bypassed first, so lowering the slope leaves the higher
    /// sections bypassed with whatever coefficients they last held.
    pub fn configure(&mut self, coefficients: &CutCoefficients, slope: Slope) {
        debug_assert!(
            coefficients.len() >= slope.sections(),
            "{:?} needs {} sections, got {}",
            slope,
            slope.sections(),
            coefficients.len()
        );

        for stage in &mut self.stages {
            stage.set_bypassed(true);
        }

        let active = slope.sections().min(coefficients.len());
        for (stage, block) in self.stages.iter_mut().zip(coefficients.iter()).take(active) {
            stage.set_coefficients(*block);
            stage.set_bypassed(false);
        }
    }

    /// Run one sample through stages 0 to 3
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.stages
            .iter_mut()
            .fold(sample, |acc, stage| stage.process(acc))
    }

    pub fn stage(&self, index: usize) -> Option<&FilterStage> {
        self.stages.get(index)
    }

    /// Number of stages currently running
    pub fn active_sections(&self) -> usize {
        self.stages.iter().filter(|s| !s.is_bypassed()).count()
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

impl Default for CutFilter {
    fn default() -> Self {
        Self::new()
    }
}
