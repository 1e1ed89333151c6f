//! Range checks for engine settings.
//!
//! Every field is checked and all failures are reported together, so a
//! hand-edited file can be fixed in one pass.

use thiserror::Error;
use thump_core::{Analyser, MAX_ENVELOPE_TIME};

use crate::engine::EngineConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Value outside its allowed range.
    #[error("{field} value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the setting, e.g. `envelope.sustain`.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// NaN or infinite value.
    #[error("{field} must be finite, got {value}")]
    NotFinite {
        /// Dotted path of the setting.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Analyser window that is not a power of two in range.
    #[error("analyser.fft_size {0} is not a power of two in [32, 32768]")]
    InvalidFftSize(usize),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) {
    if !value.is_finite() {
        errors.push(ValidationError::NotFinite { field, value });
    } else if value < min || value > max {
        errors.push(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
}

/// Checks every setting of `config`.
///
/// A single failure is returned as-is; several are wrapped in
/// [`ValidationError::Multiple`].
pub fn validate_engine(config: &EngineConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if config.sample_rate.is_finite() && config.sample_rate <= 0.0 {
        errors.push(ValidationError::OutOfRange {
            field: "sample_rate",
            value: config.sample_rate,
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
        });
    } else {
        check(&mut errors, "sample_rate", config.sample_rate, 0.0, f64::MAX);
    }
    check(&mut errors, "gain", config.gain, 0.0, f64::MAX);

    let env = &config.envelope;
    check(&mut errors, "envelope.attack", env.attack, 0.0, MAX_ENVELOPE_TIME);
    check(&mut errors, "envelope.decay", env.decay, 0.0, MAX_ENVELOPE_TIME);
    check(&mut errors, "envelope.sustain", env.sustain, 0.0, 1.0);
    check(&mut errors, "envelope.release", env.release, 0.0, MAX_ENVELOPE_TIME);

    if !Analyser::is_valid_fft_size(config.analyser.fft_size) {
        errors.push(ValidationError::InvalidFftSize(config.analyser.fft_size));
    }
    check(
        &mut errors,
        "analyser.smoothing",
        config.analyser.smoothing,
        0.0,
        1.0,
    );

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
