//! Channel Filter Chain
//!
//! Fixed topology for one audio channel: low-cut, then peak, then high-cut.

use biquad::Coefficients;

use crate::cut::CutFilter;
use crate::design::CutCoefficients;
use crate::settings::Slope;
use crate::stage::FilterStage;

/// Position of each stage in a `MonoChain`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    LowCut,
    Peak,
    HighCut,
}

impl ChainPosition {
    /// Processing order
    pub const ORDER: [ChainPosition; 3] = [
        ChainPosition::LowCut,
        ChainPosition::Peak,
        ChainPosition::HighCut,
    ];
}

pub struct MonoChain {
    low_cut: CutFilter,
    peak: FilterStage,
    high_cut: CutFilter,
}

impl MonoChain {
    pub fn new() -> Self {
        Self {
            low_cut: CutFilter::new(),
            peak: FilterStage::default(),
            high_cut: CutFilter::new(),
        }
    }

    /// Process one sample through low-cut, peak and high-cut
    ///
    /// # Real-time Safety
    /// No allocations, no syscalls.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let sample = self.low_cut.process(sample);
        let sample = self.peak.process(sample);
        self.high_cut.process(sample)
    }

    /// Process a mono buffer in-place
    #[inline]
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Swap the peak stage's coefficients; the peak stage is never bypassed
    pub fn update_peak(&mut self, coefficients: Coefficients<f32>) {
        self.peak.set_coefficients(coefficients);
    }

    pub fn update_low_cut(&mut self, coefficients: &CutCoefficients, slope: Slope) {
        self.low_cut.configure(coefficients, slope);
    }

    pub fn update_high_cut(&mut self, coefficients: &CutCoefficients, slope: Slope) {
        self.high_cut.configure(coefficients, slope);
    }

    /// Number of sections currently filtering at `position`
    pub fn active_sections(&self, position: ChainPosition) -> usize {
        match position {
            ChainPosition::LowCut => self.low_cut.active_sections(),
            ChainPosition::Peak => usize::from(!self.peak.is_bypassed()),
            ChainPosition::HighCut => self.high_cut.active_sections(),
        }
    }

    pub fn low_cut(&self) -> &CutFilter {
        &self.low_cut
    }

    pub fn peak(&self) -> &FilterStage {
        &self.peak
    }

    pub fn high_cut(&self) -> &CutFilter {
        &self.high_cut
    }

    /// Clear every delay line in the chain
    pub fn reset(&mut self) {
        self.low_cut.reset();
        self.peak.reset();
        self.high_cut.reset();
    }
}

impl Default for MonoChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{
        coefficient_bits, high_cut_coefficients, low_cut_coefficients, peak_coefficients,
    };

    const FS: f32 = 48000.0;

    fn configured_chain(peak_gain_db: f32) -> MonoChain {
        let mut chain = MonoChain::new();
        chain.update_peak(peak_coefficients(1000.0, peak_gain_db, 1.0, FS).unwrap());
        chain.update_low_cut(&low_cut_coefficients(20.0, Slope::Db12, FS).unwrap(), Slope::Db12);
        chain.update_high_cut(&high_cut_coefficients(20000.0, Slope::Db12, FS).unwrap(), Slope::Db12);
        chain
    }

    #[test]
    fn test_new_chain_is_passthrough() {
        let mut chain = MonoChain::new();
        let mut buffer = [0.5, -0.25, 0.125];
        chain.process_buffer(&mut buffer);
        assert_eq!(buffer, [0.5, -0.25, 0.125]);
    }

    #[test]
    fn test_topology_order() {
        assert_eq!(
            ChainPosition::ORDER,
            [ChainPosition::LowCut, ChainPosition::Peak, ChainPosition::HighCut]
        );
    }

    #[test]
    fn test_active_sections_by_position() {
        let mut chain = configured_chain(3.0);
        chain.update_low_cut(&low_cut_coefficients(80.0, Slope::Db36, FS).unwrap(), Slope::Db36);

        let active: Vec<usize> = ChainPosition::ORDER
            .iter()
            .map(|&position| chain.active_sections(position))
            .collect();
        assert_eq!(active, vec![3, 1, 1]);
    }

    #[test]
    fn test_update_peak_only_touches_peak() {
        let mut chain = configured_chain(0.0);
        let low_before = coefficient_bits(chain.low_cut().stage(0).unwrap().coefficients());

        let boosted = peak_coefficients(2000.0, 9.0, 0.5, FS).unwrap();
        chain.update_peak(boosted);

        assert_eq!(coefficient_bits(chain.peak().coefficients()), coefficient_bits(&boosted));
        assert!(!chain.peak().is_bypassed());
        assert_eq!(
            coefficient_bits(chain.low_cut().stage(0).unwrap().coefficients()),
            low_before
        );
        assert_eq!(chain.low_cut().active_sections(), 1);
        assert_eq!(chain.high_cut().active_sections(), 1);
    }

    #[test]
    fn test_peak_boost_at_center() {
        let mut flat = configured_chain(0.0);
        let mut boosted = configured_chain(6.0);

        let mut flat_peak = 0.0_f32;
        let mut boost_peak = 0.0_f32;
        for i in 0..9600 {
            let x = (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / FS).sin() * 0.25;
            let a = flat.process(x);
            let b = boosted.process(x);
            if i >= 4800 {
                flat_peak = flat_peak.max(a.abs());
                boost_peak = boost_peak.max(b.abs());
            }
        }

        let db = 20.0 * (boost_peak / flat_peak).log10();
        assert!((db - 6.0).abs() < 0.25, "expected ~6dB, got {}", db);
    }

    #[test]
    fn test_reset_returns_to_rest() {
        let mut chain = configured_chain(6.0);
        let mut fresh = configured_chain(6.0);
        for _ in 0..256 {
            chain.process(0.4);
        }
        chain.reset();
        assert_eq!(chain.process(0.1), fresh.process(0.1));
    }
}
