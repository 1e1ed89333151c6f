//! Shared helpers for CLI commands.

use anyhow::Context;
use clap::ValueEnum;
use std::path::Path;
use thump_config::EngineConfig;
use thump_core::{AudioContext, FilterType, Synthesizer, Target, Waveform, synth};

/// Waveform types for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliWaveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Saw,
}

impl From<CliWaveform> for Waveform {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Sine => Waveform::Sine,
            CliWaveform::Square => Waveform::Square,
            CliWaveform::Triangle => Waveform::Triangle,
            CliWaveform::Saw => Waveform::Saw,
        }
    }
}

/// Loads `path` if given, otherwise the engine defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Wires the demo patch into `voice`: `osc → [filter →] gain`.
pub fn patch_voice(
    ctx: &AudioContext,
    voice: &mut Synthesizer,
    shape: Waveform,
    pitch: f64,
    cutoff: Option<f64>,
) {
    voice.add_node("osc", ctx.oscillator(shape, pitch));
    match cutoff {
        Some(hz) => {
            voice.add_node("filter", ctx.biquad(FilterType::Lowpass, hz));
            voice.connect("osc", "filter", Target::Input);
            voice.connect("filter", synth::GAIN, Target::Input);
        }
        None => voice.connect("osc", synth::GAIN, Target::Input),
    }
}
