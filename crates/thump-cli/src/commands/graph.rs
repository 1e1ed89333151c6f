//! Graph topology command.

use clap::Args;
use thump_config::EngineConfig;
use thump_core::Waveform;

use super::common::{CliWaveform, patch_voice};

#[derive(Args)]
pub struct GraphArgs {
    /// Oscillator shape
    #[arg(long, value_enum, default_value = "saw")]
    shape: CliWaveform,

    /// Oscillator frequency in Hz
    #[arg(long, default_value = "110.0")]
    pitch: f64,

    /// Insert a lowpass filter at this cutoff (Hz)
    #[arg(long)]
    cutoff: Option<f64>,
}

pub fn run(args: GraphArgs, config: EngineConfig) -> anyhow::Result<()> {
    config.validate()?;
    let (ctx, _clock) = config.offline_context();
    let mut voice = config.build_synth(&ctx);
    patch_voice(
        &ctx,
        &mut voice,
        Waveform::from(args.shape),
        args.pitch,
        args.cutoff,
    );
    let graph = voice.graph();

    println!("Nodes ({}):", graph.len());
    for name in graph.names() {
        let Some(unit) = graph.unit(name) else {
            continue;
        };
        let params: Vec<&str> = unit.params().iter().map(|p| p.as_str()).collect();
        if params.is_empty() {
            println!("  {name:<12} {}", unit.kind_name());
        } else {
            println!("  {name:<12} {:<12} [{}]", unit.kind_name(), params.join(", "));
        }
    }

    println!();
    println!("Edges:");
    for edge in graph.edges() {
        println!("  {} → {} ({})", edge.from, edge.to, edge.target);
    }

    println!();
    println!("Sources:");
    for name in graph.sources().names() {
        if let Some(state) = graph.sources().state(name) {
            println!("  {name:<12} {}", state.as_str());
        }
    }
    Ok(())
}
