//! Offline signal probes

use std::f64::consts::TAU;

use simpleeq_dsp::{DspError, SettingsSource, Slope, StereoProcessor};

/// Parse a slope given as dB/octave ("12", "24", "36", "48")
pub fn parse_slope(s: &str) -> Result<Slope, String> {
    let db: u32 = s
        .trim()
        .trim_end_matches("dB")
        .parse()
        .map_err(|_| format!("'{}' is not a slope in dB/octave", s))?;

    Slope::ALL
        .iter()
        .copied()
        .find(|slope| slope.db_per_octave() as u32 == db)
        .ok_or_else(|| format!("slope must be 12, 24, 36 or 48 dB/octave, got {}", db))
}

/// Run a sine through both channels and return the steady-state gain in dB
///
/// The first half of the rendered frames is discarded as settling time. The
/// processor's delay lines are cleared first so probes don't bleed into each
/// other.
pub fn measure_gain_db<S: SettingsSource>(
    processor: &mut StereoProcessor<S>,
    frequency: f32,
    frames: usize,
    block_size: usize,
) -> Result<f64, DspError> {
    let sample_rate = processor.sample_rate().ok_or(DspError::NotPrepared)?;
    processor.reset();

    let phase_step = TAU * f64::from(frequency) / f64::from(sample_rate);
    let mut left = vec![0.0_f32; block_size];
    let mut right = vec![0.0_f32; block_size];

    let settle = frames / 2;
    let mut input_energy = 0.0_f64;
    let mut output_energy = 0.0_f64;
    let mut n = 0usize;

    while n < frames {
        let len = block_size.min(frames - n);
        for i in 0..len {
            let sample = ((n + i) as f64 * phase_step).sin() as f32;
            left[i] = sample;
            right[i] = sample;
        }
        processor.process_block(&mut left[..len], &mut right[..len])?;

        for i in 0..len {
            if n + i >= settle {
                let input = ((n + i) as f64 * phase_step).sin();
                input_energy += input * input;
                output_energy += f64::from(left[i]) * f64::from(left[i]);
            }
        }
        n += len;
    }

    Ok(10.0 * (output_energy.max(1e-24) / input_energy.max(1e-24)).log10())
}
