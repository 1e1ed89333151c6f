//! Engine configuration file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use thump_core::unit::{DEFAULT_FFT_SIZE, DEFAULT_SMOOTHING};
use thump_core::{
    AudioContext, Envelope, EnvelopeUpdate, ManualClock, Processor, Synthesizer, synth,
};

use crate::error::ConfigError;
use crate::validation::validate_engine;

/// Analysis-tap settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyserConfig {
    /// Window length in samples; a power of two in `32..=32768`.
    pub fft_size: usize,
    /// Smoothing time constant in `[0, 1]`.
    pub smoothing: f64,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

/// Settings for one synthesizer voice and the context it runs in.
///
/// Missing keys take their defaults, so an empty file is a valid config.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 44100.0
/// gain = 1.0
///
/// [envelope]
/// attack = 0.01
/// decay = 0.1
/// sustain = 1.0
/// release = 0.5
///
/// [analyser]
/// fft_size = 2048
/// smoothing = 0.8
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Context sample rate in Hz.
    pub sample_rate: f64,
    /// Peak gain reached at the end of the attack.
    pub gain: f64,
    /// Default envelope for new voices.
    pub envelope: Envelope,
    /// Analysis-tap settings.
    pub analyser: AnalyserConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            gain: 1.0,
            envelope: Envelope::default(),
            analyser: AnalyserConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the peak gain.
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Merge envelope overrides; unset fields keep the configured value.
    pub fn with_envelope(mut self, update: EnvelopeUpdate) -> Self {
        self.envelope.merge(update);
        self
    }

    /// Load and validate a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the config to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every setting against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_engine(self)?;
        Ok(())
    }

    /// Context at the configured rate, on the wall clock.
    pub fn context(&self) -> AudioContext {
        AudioContext::realtime(self.sample_rate)
    }

    /// Context at the configured rate, on a manual clock starting at 0.
    pub fn offline_context(&self) -> (AudioContext, Arc<ManualClock>) {
        AudioContext::offline(self.sample_rate)
    }

    /// Builds a voice on `ctx` with the configured gain, envelope, and analyser.
    pub fn build_synth(&self, ctx: &AudioContext) -> Synthesizer {
        let mut voice = Synthesizer::new(ctx);
        voice.set_gain(self.gain);
        voice.set_envelope(self.envelope.into());

        let analyser = self.analyser;
        voice.update_node(synth::ANALYSER, |unit| {
            if let Processor::Analyser(tap) = unit.processor_mut() {
                tap.set_fft_size(analyser.fft_size);
                tap.set_smoothing(analyser.smoothing);
            }
        });
        voice
    }
}
