//! Audio environment: sample rate, clock, and unit factory.
//!
//! Nothing in the engine reads ambient global state. Whatever needs the
//! sample rate or the current time receives an [`AudioEnvironment`]
//! explicitly. [`AudioContext`] is the concrete environment; `Option<E>`
//! models one that has not been created yet, so callers can pass "no context"
//! and get an explicit unavailability result instead of a guessed default.

use std::sync::Arc;

use crate::clock::{Clock, ManualClock, SystemClock};
use crate::error::WaveformError;
use crate::unit::{
    Analyser, BiquadFilter, BufferSource, ConstantSource, FilterType, GainStage, Oscillator,
    Processor, Unit,
};
use crate::waveform::Waveform;

/// Provides the sample rate and current time to the engine.
pub trait AudioEnvironment {
    /// Sample rate in Hz, or `None` if the environment is unavailable.
    fn sample_rate(&self) -> Option<f64>;

    /// Current scheduler time in seconds.
    fn current_time(&self) -> f64;
}

impl<E: AudioEnvironment> AudioEnvironment for Option<E> {
    fn sample_rate(&self) -> Option<f64> {
        self.as_ref().and_then(AudioEnvironment::sample_rate)
    }

    fn current_time(&self) -> f64 {
        self.as_ref().map_or(0.0, AudioEnvironment::current_time)
    }
}

impl<E: AudioEnvironment + ?Sized> AudioEnvironment for &E {
    fn sample_rate(&self) -> Option<f64> {
        (**self).sample_rate()
    }

    fn current_time(&self) -> f64 {
        (**self).current_time()
    }
}

impl<E: AudioEnvironment + ?Sized> AudioEnvironment for Arc<E> {
    fn sample_rate(&self) -> Option<f64> {
        (**self).sample_rate()
    }

    fn current_time(&self) -> f64 {
        (**self).current_time()
    }
}

/// Concrete audio environment.
///
/// Cheap to clone; clones share the clock.
///
/// ```rust
/// use thump_core::{AudioContext, AudioEnvironment, Waveform};
///
/// let (ctx, clock) = AudioContext::offline(48000.0);
/// clock.advance(2.0);
/// assert_eq!(ctx.current_time(), 2.0);
///
/// let osc = ctx.oscillator(Waveform::Square, 220.0);
/// assert!(osc.is_source());
/// ```
#[derive(Clone)]
pub struct AudioContext {
    sample_rate: f64,
    clock: Arc<dyn Clock>,
}

impl core::fmt::Debug for AudioContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AudioContext")
            .field("sample_rate", &self.sample_rate)
            .field("current_time", &self.clock.now())
            .finish()
    }
}

impl AudioContext {
    /// Creates a context over an existing clock.
    ///
    /// A non-positive or non-finite `sample_rate` makes the context report
    /// itself unavailable.
    pub fn new(sample_rate: f64, clock: Arc<dyn Clock>) -> Self {
        Self { sample_rate, clock }
    }

    /// Creates a context driven by wall-clock time.
    pub fn realtime(sample_rate: f64) -> Self {
        Self::new(sample_rate, Arc::new(SystemClock::new()))
    }

    /// Creates a context on a manual clock at 0.0, returning the clock handle.
    pub fn offline(sample_rate: f64) -> (Self, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0.0));
        (Self::new(sample_rate, clock.clone()), clock)
    }

    /// Shared clock.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    fn rate(&self) -> f64 {
        self.sample_rate().unwrap_or(0.0)
    }

    /// Creates an oscillator unit.
    pub fn oscillator(&self, shape: Waveform, frequency: f64) -> Unit {
        Unit::new(Processor::Oscillator(Oscillator::new(
            shape,
            frequency,
            self.rate(),
        )))
    }

    /// Creates a biquad filter unit.
    pub fn biquad(&self, kind: FilterType, frequency: f64) -> Unit {
        Unit::new(Processor::Filter(BiquadFilter::new(
            kind,
            frequency,
            self.rate(),
        )))
    }

    /// Creates a gain unit.
    pub fn gain(&self, gain: f64) -> Unit {
        Unit::new(Processor::Gain(GainStage::new(gain)))
    }

    /// Creates a constant-source unit.
    pub fn constant(&self, offset: f64) -> Unit {
        Unit::new(Processor::Constant(ConstantSource::new(offset)))
    }

    /// Creates a buffer-source unit playing `samples` at the context rate.
    pub fn buffer_source(&self, samples: Vec<f32>) -> Unit {
        Unit::new(Processor::Buffer(BufferSource::new(samples, self.rate())))
    }

    /// Renders a waveform and wraps it in a looping buffer-source unit.
    pub fn buffer_from_waveform(
        &self,
        shape: Waveform,
        pitch: f64,
        volume: f64,
        duration: f64,
    ) -> Result<Unit, WaveformError> {
        let samples = shape.build(self, pitch, volume, duration)?;
        let mut source = BufferSource::new(samples, self.rate());
        source.looping = true;
        Ok(Unit::new(Processor::Buffer(source)))
    }

    /// Creates an analyser unit with default settings.
    pub fn analyser(&self) -> Unit {
        Unit::new(Processor::Analyser(Analyser::default()))
    }

    /// Creates the output sink unit.
    pub fn destination(&self) -> Unit {
        Unit::new(Processor::Destination)
    }
}

impl AudioEnvironment for AudioContext {
    fn sample_rate(&self) -> Option<f64> {
        (self.sample_rate.is_finite() && self.sample_rate > 0.0).then_some(self.sample_rate)
    }

    fn current_time(&self) -> f64 {
        self.clock.now()
    }
}
