//! Engine configuration for thump.
//!
//! One TOML file describes the audio context and the default voice: sample
//! rate, peak gain, ADSR envelope, and analysis-tap settings. Missing keys
//! fall back to the engine defaults, and every value is range-checked on
//! load.
//!
//! # Example
//!
//! ```rust,no_run
//! use thump_config::EngineConfig;
//! use thump_core::EnvelopeUpdate;
//!
//! let config = EngineConfig::load("thump.toml")
//!     .unwrap_or_default()
//!     .with_envelope(EnvelopeUpdate::default().release(0.8));
//!
//! let ctx = config.context();
//! let mut voice = config.build_synth(&ctx);
//! voice.play(0.25);
//!
//! config.save("thump.toml").unwrap();
//! ```

mod engine;
mod error;

/// Range checks for engine settings.
pub mod validation;

pub use engine::{AnalyserConfig, EngineConfig};
pub use error::ConfigError;
pub use validation::{ValidationError, ValidationResult, validate_engine};
