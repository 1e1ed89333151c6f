//! Error types for the synthesis engine.
//!
//! Graph edits never fail: they ignore unknown names and parameters. The
//! errors here belong to the lower layers (automation timelines, one-shot
//! generators) and to waveform generation, which is the only operation whose
//! failure reaches a caller of the high-level API.

use thiserror::Error;

/// Errors from the waveform sample generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaveformError {
    /// The audio environment has not been initialised, so there is no sample rate.
    #[error("audio environment unavailable: no sample rate")]
    Unavailable,
    /// The requested duration needs more than `max` samples.
    #[error("waveform too long: more than {max} samples")]
    TooLong {
        /// Largest table [`Waveform::render`](crate::Waveform::render) will allocate.
        max: usize,
    },
}

/// Errors from scheduling automation events on an [`AudioParam`](crate::AudioParam).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AutomationError {
    /// Event time is negative, NaN, or infinite.
    #[error("invalid automation time {0}")]
    InvalidTime(f64),
    /// Event value is NaN or infinite.
    #[error("invalid automation value {0}")]
    InvalidValue(f64),
    /// Exponential ramps cannot reach zero or cross it.
    #[error("exponential ramp target must be positive, got {0}")]
    NonPositiveExponentialTarget(f64),
}

/// Errors from driving a one-shot [`Generator`](crate::Generator) directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// `start` was already called on this generator.
    #[error("generator already started")]
    AlreadyStarted,
    /// `stop` was called before `start`.
    #[error("generator not started")]
    NotStarted,
    /// `stop` was already called on this generator.
    #[error("generator already stopped")]
    AlreadyStopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_display() {
        assert_eq!(
            WaveformError::Unavailable.to_string(),
            "audio environment unavailable: no sample rate"
        );
    }

    #[test]
    fn too_long_display() {
        let msg = WaveformError::TooLong { max: 64 }.to_string();
        assert_eq!(msg, "waveform too long: more than 64 samples");
    }

    #[test]
    fn exponential_target_display() {
        let msg = AutomationError::NonPositiveExponentialTarget(0.0).to_string();
        assert!(msg.contains("must be positive"), "got: {msg}");
    }

    #[test]
    fn generator_errors_are_distinct() {
        assert_ne!(GeneratorError::AlreadyStarted, GeneratorError::AlreadyStopped);
        assert_eq!(
            GeneratorError::NotStarted.to_string(),
            "generator not started"
        );
    }
}
