//! SimpleEQ offline host
//!
//! Prepares the stereo equalizer, renders sine probes through it and reports
//! measured gain next to the analytic response. Optionally prints the curve
//! produced by the response monitor.

mod probe;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use simpleeq_core::{
    Event, MonitorConfig, ParameterId, ParameterStore, ProcessorConfig, ResponseMonitor,
    SettingsSource, Slope, StereoProcessor,
};
use simpleeq_dsp::{log_frequency, ChainPosition, ResponseCurve};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "simpleeq")]
#[command(about = "Three-band parametric equalizer, offline host", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// Largest block delivered to the processor, in frames
    #[arg(long, default_value_t = 512)]
    block_size: u32,

    /// Restore parameters from a JSON state file before applying flags
    #[arg(long)]
    state: Option<PathBuf>,

    /// Write the final parameters as JSON
    #[arg(long)]
    save_state: Option<PathBuf>,

    #[arg(long)]
    peak_freq: Option<f32>,

    /// Peak gain in dB
    #[arg(long, allow_hyphen_values = true)]
    peak_gain: Option<f32>,

    #[arg(long)]
    peak_quality: Option<f32>,

    #[arg(long)]
    low_cut_freq: Option<f32>,

    #[arg(long)]
    high_cut_freq: Option<f32>,

    /// Low-cut slope in dB/octave (12, 24, 36, 48)
    #[arg(long, value_parser = probe::parse_slope)]
    low_cut_slope: Option<Slope>,

    /// High-cut slope in dB/octave (12, 24, 36, 48)
    #[arg(long, value_parser = probe::parse_slope)]
    high_cut_slope: Option<Slope>,

    /// Probe frequencies in Hz
    #[arg(long, value_delimiter = ',', default_values_t = [30.0, 100.0, 1000.0, 5000.0, 15000.0])]
    probe: Vec<f32>,

    /// Length of each probe in seconds
    #[arg(long, default_value_t = 1.0)]
    seconds: f32,

    /// Print the response monitor's curve with this many points
    #[arg(long)]
    curve: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "simpleeq=debug"
    } else {
        "simpleeq=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let config = ProcessorConfig {
        sample_rate: cli.sample_rate,
        channels: 2,
        max_block_size: cli.block_size,
    };
    config.validate()?;
    info!(
        "Starting SimpleEQ host ({}Hz, {} frames, {:.2}ms per block)",
        config.sample_rate,
        config.max_block_size,
        config.latency_ms()
    );

    let store = Arc::new(ParameterStore::new());
    if let Some(path) = &cli.state {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading state file {}", path.display()))?;
        store.restore_json(&json)?;
        info!("Restored parameters from {}", path.display());
    }
    apply_overrides(&store, &cli)?;
    print_parameters(&store);

    let mut processor = StereoProcessor::new(Arc::clone(&store));
    processor
        .prepare(config.process_spec())
        .context("preparing processor")?;
    for position in ChainPosition::ORDER {
        debug!(
            "{:?}: {} active section(s)",
            position,
            processor.left().active_sections(position)
        );
    }

    let curve = ResponseCurve::new(store.chain_settings(), config.sample_rate as f32)?;
    let frames = (cli.seconds.max(0.01) * config.sample_rate as f32) as usize;

    println!();
    println!("{:>10}  {:>10}  {:>10}", "freq Hz", "measured", "expected");
    for &frequency in &cli.probe {
        if !(frequency > 0.0 && frequency < config.sample_rate as f32 / 2.0) {
            warn!("Skipping probe at {}Hz (outside 0 - Nyquist)", frequency);
            continue;
        }
        let measured = probe::measure_gain_db(
            &mut processor,
            frequency,
            frames,
            config.max_block_size as usize,
        )?;
        println!(
            "{:>10.1}  {:>8.2}dB  {:>8.2}dB",
            frequency,
            measured,
            curve.magnitude_db_at(frequency)
        );
    }

    if processor.design_failures() > 0 {
        warn!("{} blocks kept stale coefficients", processor.design_failures());
    }

    if let Some(points) = cli.curve {
        print_monitor_curve(&store, config.sample_rate, points)?;
    }

    if let Some(path) = &cli.save_state {
        fs::write(path, store.to_json()?)
            .with_context(|| format!("writing state file {}", path.display()))?;
        info!("Saved parameters to {}", path.display());
    }

    Ok(())
}

fn apply_overrides(store: &ParameterStore, cli: &Cli) -> anyhow::Result<()> {
    let values = [
        (ParameterId::PeakFreq, cli.peak_freq),
        (ParameterId::PeakGain, cli.peak_gain),
        (ParameterId::PeakQuality, cli.peak_quality),
        (ParameterId::LowCutFreq, cli.low_cut_freq),
        (ParameterId::HighCutFreq, cli.high_cut_freq),
    ];
    for (id, value) in values {
        if let Some(value) = value {
            let stored = store.set(id, value)?;
            if stored != value {
                warn!("'{}' adjusted from {} to {}", id.id(), value, stored);
            }
        }
    }

    if let Some(slope) = cli.low_cut_slope {
        store.set_low_cut_slope(slope);
    }
    if let Some(slope) = cli.high_cut_slope {
        store.set_high_cut_slope(slope);
    }
    Ok(())
}

fn print_parameters(store: &ParameterStore) {
    for id in ParameterId::ALL {
        let value = store.get(id);
        if id.is_slope() {
            let slope = Slope::from_ordinal_saturating(value as u32);
            println!("{:>14}: {} dB/oct", id.id(), slope.db_per_octave());
        } else {
            println!("{:>14}: {}", id.id(), value);
        }
    }
}

fn print_monitor_curve(
    store: &Arc<ParameterStore>,
    sample_rate: u32,
    points: usize,
) -> anyhow::Result<()> {
    let config = MonitorConfig {
        sample_rate,
        points,
        max_hz: MonitorConfig::default().max_hz.min(sample_rate as f32 * 0.45),
        ..Default::default()
    };
    let mut monitor = ResponseMonitor::spawn(Arc::clone(store), config.clone())?;

    let magnitudes_db = loop {
        match monitor.wait_event_timeout(Duration::from_secs(2))? {
            Event::ResponseUpdated { magnitudes_db, .. } => break magnitudes_db,
            Event::Error { message } => bail!("response monitor failed: {}", message),
            Event::Started | Event::Stopped => continue,
        }
    };
    monitor.shutdown();

    println!();
    println!("{:>10}  {:>10}", "freq Hz", "dB");
    for (i, db) in magnitudes_db.iter().enumerate() {
        let frequency = log_frequency(i, magnitudes_db.len(), config.min_hz, config.max_hz);
        println!("{:>10.1}  {:>10.2}", frequency, db);
    }
    Ok(())
}
