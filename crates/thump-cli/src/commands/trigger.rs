//! One-shot trigger command: plays a note on an offline clock and reports
//! the gain automation the envelope wrote.

use anyhow::Context;
use clap::Args;
use thump_config::EngineConfig;
use thump_core::{EnvelopeUpdate, Waveform};

use super::common::{CliWaveform, patch_voice};

#[derive(Args)]
pub struct TriggerArgs {
    /// Oscillator shape
    #[arg(long, value_enum, default_value = "saw")]
    shape: CliWaveform,

    /// Oscillator frequency in Hz
    #[arg(long, default_value = "110.0")]
    pitch: f64,

    /// Seconds between start and stop
    #[arg(long, default_value = "0.25")]
    duration: f64,

    /// Attack time in seconds
    #[arg(long)]
    attack: Option<f64>,

    /// Decay time in seconds
    #[arg(long)]
    decay: Option<f64>,

    /// Sustain level (0-1)
    #[arg(long)]
    sustain: Option<f64>,

    /// Release time in seconds
    #[arg(long)]
    release: Option<f64>,

    /// Peak gain
    #[arg(long)]
    gain: Option<f64>,

    /// Insert a lowpass filter at this cutoff (Hz)
    #[arg(long)]
    cutoff: Option<f64>,

    /// Number of points in the sampled gain curve
    #[arg(long, default_value = "16")]
    points: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: TriggerArgs, config: EngineConfig) -> anyhow::Result<()> {
    let mut config = config.with_envelope(EnvelopeUpdate {
        attack: args.attack,
        decay: args.decay,
        sustain: args.sustain,
        release: args.release,
    });
    if let Some(gain) = args.gain {
        config = config.with_gain(gain);
    }
    config.validate()?;

    let (ctx, _clock) = config.offline_context();
    let mut voice = config.build_synth(&ctx);
    let shape = Waveform::from(args.shape);
    patch_voice(&ctx, &mut voice, shape, args.pitch, args.cutoff);
    voice.play(args.duration);

    let gain = voice
        .gain_param()
        .context("output gain stage missing from the voice")?;
    let events = gain.events();
    let end = events.last().map_or(0.0, |e| e.time) * 1.1;
    let curve: Vec<(f64, f64)> = match args.points {
        0 => Vec::new(),
        1 => vec![(0.0, gain.value_at(0.0))],
        n => (0..n)
            .map(|i| {
                let t = end * i as f64 / (n - 1) as f64;
                (t, gain.value_at(t))
            })
            .collect(),
    };
    let sources: Vec<(&str, &str)> = voice
        .graph()
        .sources()
        .names()
        .filter_map(|name| {
            let state = voice.graph().sources().state(name)?;
            Some((name, state.as_str()))
        })
        .collect();
    let env = voice.envelope();

    if args.json {
        let json = serde_json::json!({
            "shape": shape.as_str(),
            "pitch": args.pitch,
            "duration": args.duration,
            "gain": voice.gain(),
            "envelope": env,
            "events": events.iter().map(|e| serde_json::json!({
                "time": e.time,
                "value": e.value,
                "kind": e.kind.as_str(),
            })).collect::<Vec<_>>(),
            "curve": curve.iter().map(|(t, v)| serde_json::json!({
                "time": t,
                "value": v,
            })).collect::<Vec<_>>(),
            "sources": sources.iter().map(|(name, state)| serde_json::json!({
                "name": name,
                "state": state,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("Trigger: {shape} at {:.2} Hz for {:.3}s", args.pitch, args.duration);
    println!(
        "  Envelope: A {:.3}s  D {:.3}s  S {:.2}  R {:.3}s  (peak {:.2})",
        env.attack,
        env.decay,
        env.sustain,
        env.release,
        voice.gain()
    );
    println!();
    println!("Gain automation:");
    println!("  {:>10}  {:<12}  {:>8}", "time (s)", "kind", "value");
    for e in events {
        println!("  {:>10.4}  {:<12}  {:>8.4}", e.time, e.kind.as_str(), e.value);
    }
    if !curve.is_empty() {
        println!();
        println!("Gain curve:");
        for (t, v) in &curve {
            let bar = "#".repeat((v / voice.gain().max(1e-9) * 40.0).round() as usize);
            println!("  {t:>8.4}s  {v:>7.4}  {bar}");
        }
    }
    println!();
    println!("Sources:");
    for (name, state) in &sources {
        println!("  {name:<10} {state}");
    }
    Ok(())
}
