//! Stereo Processor
//!
//! Owns one `MonoChain` per channel. Every block it reads a fresh settings
//! snapshot, designs all coefficient sets, applies them identically to both
//! chains, and only then processes samples.

use crate::chain::MonoChain;
use crate::design::{design_high_cut, design_low_cut, design_peak};
use crate::error::DspError;
use crate::settings::{ChainSettings, SettingsSource};

/// Stream parameters known once the host is about to play
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    pub sample_rate: f32,
    pub max_block_size: usize,
}

impl ProcessSpec {
    pub fn new(sample_rate: f32, max_block_size: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
        }
    }

    pub fn validate(&self) -> Result<(), DspError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(DspError::InvalidBlockSize(self.max_block_size));
        }
        Ok(())
    }
}

/// Lifecycle of a processor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessorState {
    /// No sample rate yet; processing is refused
    Uninitialized,
    Ready {
        sample_rate: f32,
        max_block_size: usize,
    },
}

/// Trait for audio processors driven by a host
///
/// # Real-time Safety Contract
///
/// Implementors MUST follow these rules in `process()`:
/// - NO heap allocations (no Vec::push, no Box::new, no String)
/// - NO syscalls (no file I/O, no network, no mutex locks)
/// - NO unbounded loops
/// - Constant or O(n) time complexity where n = buffer size
///
/// Violating these rules causes audio dropouts ("glitches").
pub trait AudioProcessor: Send {
    /// Called before playback and whenever the sample rate or block size changes
    fn prepare(&mut self, spec: &ProcessSpec) -> Result<(), DspError>;

    /// Process planar stereo buffers in-place
    fn process(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<(), DspError>;

    /// Reset internal state (delay lines, envelopes, etc.)
    fn reset(&mut self);

    /// Human-readable name for debugging/UI
    fn name(&self) -> &'static str;

    /// Whether this processor is currently enabled
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Low-cut / peak / high-cut equalizer for a stereo stream
pub struct StereoProcessor<S> {
    source: S,
    left: MonoChain,
    right: MonoChain,
    state: ProcessorState,
    settings: ChainSettings,
    design_failures: u64,
}

impl<S: SettingsSource> StereoProcessor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            left: MonoChain::new(),
            right: MonoChain::new(),
            state: ProcessorState::Uninitialized,
            settings: ChainSettings::default(),
            design_failures: 0,
        }
    }

    /// Enter the ready state for a (possibly new) sample rate
    ///
    /// Clears both chains' delay lines and applies the current settings. An
    /// invalid spec or out-of-range settings leave the processor
    /// `Uninitialized`, even if it was ready at another rate before.
    pub fn prepare(&mut self, spec: ProcessSpec) -> Result<(), DspError> {
        // Chains still hold coefficients for the previous rate until this succeeds
        self.state = ProcessorState::Uninitialized;
        spec.validate()?;
        self.source.chain_settings().validate(spec.sample_rate)?;

        self.state = ProcessorState::Ready {
            sample_rate: spec.sample_rate,
            max_block_size: spec.max_block_size,
        };
        self.left.reset();
        self.right.reset();
        if let Err(e) = self.update_filters() {
            self.state = ProcessorState::Uninitialized;
            return Err(e);
        }
        Ok(())
    }

    /// Read the settings source and push fresh coefficients into both chains
    ///
    /// All coefficient sets are designed before any of them is applied, so a
    /// failure leaves both chains exactly as they were.
    pub fn update_filters(&mut self) -> Result<(), DspError> {
        let sample_rate = self.sample_rate().ok_or(DspError::NotPrepared)?;
        let settings = self.source.chain_settings();

        let peak = design_peak(&settings, sample_rate)?;
        let low_cut = design_low_cut(&settings, sample_rate)?;
        let high_cut = design_high_cut(&settings, sample_rate)?;

        // Same order on both channels keeps left and right phase-coherent
        for chain in [&mut self.left, &mut self.right] {
            chain.update_peak(peak);
            chain.update_low_cut(&low_cut, settings.low_cut_slope);
            chain.update_high_cut(&high_cut, settings.high_cut_slope);
        }

        self.settings = settings;
        Ok(())
    }

    /// Process one block of planar stereo audio in-place
    ///
    /// Coefficients are recomputed every block, even when nothing changed.
    ///
    /// # Real-time Safety
    /// No allocations, no locks. O(n) where n = block length.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<(), DspError> {
        if left.len() != right.len() {
            return Err(DspError::BufferSizeMismatch {
                expected: left.len(),
                got: right.len(),
            });
        }
        self.begin_block(left.len())?;

        self.left.process_buffer(left);
        self.right.process_buffer(right);
        Ok(())
    }

    /// Process an interleaved stereo buffer in-place
    ///
    /// Buffer format: [L0, R0, L1, R1, L2, R2, ...]
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) -> Result<(), DspError> {
        if buffer.len() % 2 != 0 {
            return Err(DspError::BufferSizeMismatch {
                expected: buffer.len() + 1,
                got: buffer.len(),
            });
        }
        self.begin_block(buffer.len() / 2)?;

        for frame in buffer.chunks_exact_mut(2) {
            frame[0] = self.left.process(frame[0]);
            frame[1] = self.right.process(frame[1]);
        }
        Ok(())
    }

    fn begin_block(&mut self, frames: usize) -> Result<(), DspError> {
        let max_block_size = match self.state {
            ProcessorState::Uninitialized => return Err(DspError::NotPrepared),
            ProcessorState::Ready { max_block_size, .. } => max_block_size,
        };
        if frames > max_block_size {
            return Err(DspError::BufferSizeMismatch {
                expected: max_block_size,
                got: frames,
            });
        }

        // Out-of-range settings are an upstream bug; keep the last good
        // coefficients in release builds
        let update = self.update_filters();
        debug_assert!(update.is_ok(), "coefficient design failed: {:?}", update);
        if update.is_err() {
            self.design_failures += 1;
        }
        Ok(())
    }

    /// Clear delay lines without leaving the ready state
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn sample_rate(&self) -> Option<f32> {
        match self.state {
            ProcessorState::Uninitialized => None,
            ProcessorState::Ready { sample_rate, .. } => Some(sample_rate),
        }
    }

    /// Settings most recently applied to the chains
    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    /// Blocks whose coefficient update was rejected
    pub fn design_failures(&self) -> u64 {
        self.design_failures
    }

    pub fn left(&self) -> &MonoChain {
        &self.left
    }

    pub fn right(&self) -> &MonoChain {
        &self.right
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: SettingsSource + Send> AudioProcessor for StereoProcessor<S> {
    fn prepare(&mut self, spec: &ProcessSpec) -> Result<(), DspError> {
        StereoProcessor::prepare(self, *spec)
    }

    fn process(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<(), DspError> {
        self.process_block(left, right)
    }

    fn reset(&mut self) {
        StereoProcessor::reset(self);
    }

    fn name(&self) -> &'static str {
        "SimpleEQ"
    }
}
