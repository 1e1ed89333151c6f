//! Waveform rendering command.

use clap::{Args, ValueEnum};
use thump_config::EngineConfig;
use thump_core::Waveform;

use super::common::CliWaveform;

/// Output formats for rendered samples
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum WaveFormat {
    /// Statistics only
    #[default]
    Summary,
    /// `index,value` rows
    Csv,
    /// Settings plus every sample
    Json,
}

#[derive(Args)]
pub struct WaveArgs {
    /// Waveform shape
    #[arg(long, value_enum, default_value = "sine")]
    shape: CliWaveform,

    /// Frequency in Hz
    #[arg(long, default_value = "440.0")]
    pitch: f64,

    /// Peak amplitude
    #[arg(long, default_value = "1.0")]
    volume: f64,

    /// Duration in seconds
    #[arg(long, default_value = "0.01")]
    duration: f64,

    /// Sample rate (overrides the config)
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    format: WaveFormat,
}

pub fn run(args: WaveArgs, config: EngineConfig) -> anyhow::Result<()> {
    let config = match args.sample_rate {
        Some(rate) => config.with_sample_rate(rate),
        None => config,
    };
    config.validate()?;

    let ctx = config.context();
    let shape = Waveform::from(args.shape);
    let samples = shape.build(&ctx, args.pitch, args.volume, args.duration)?;
    tracing::debug!(
        "wave: rendered {} {shape} samples at {} Hz",
        samples.len(),
        config.sample_rate
    );

    match args.format {
        WaveFormat::Summary => print_summary(shape, &args, config.sample_rate, &samples),
        WaveFormat::Csv => {
            println!("index,value");
            for (i, s) in samples.iter().enumerate() {
                println!("{i},{s}");
            }
        }
        WaveFormat::Json => {
            let json = serde_json::json!({
                "shape": shape.as_str(),
                "pitch": args.pitch,
                "volume": args.volume,
                "sample_rate": config.sample_rate,
                "samples": samples,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

fn print_summary(shape: Waveform, args: &WaveArgs, sample_rate: f64, samples: &[f32]) {
    let min = samples.iter().copied().fold(f32::INFINITY, f32::min);
    let max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let rms = if samples.is_empty() {
        0.0
    } else {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    };
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
        .count();

    println!("Waveform: {shape}");
    println!("  Pitch:       {:.2} Hz", args.pitch);
    println!("  Volume:      {:.3}", args.volume);
    println!("  Sample rate: {sample_rate} Hz");
    println!("  Cycle:       {:.2} samples", sample_rate / args.pitch);
    println!("  Samples:     {}", samples.len());
    if !samples.is_empty() {
        println!("  Range:       [{min:.4}, {max:.4}]");
        println!("  RMS:         {rms:.4}");
        println!("  Crossings:   {crossings}");
    }
}
