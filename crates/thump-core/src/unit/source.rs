//! Self-clocked generators: oscillator, constant source, buffer source.
//!
//! Generators are one-shot: once started they cannot be started again, and
//! once stopped they are finished for good. Playing a sound twice means
//! building a fresh unit. The [`SourceTracker`](crate::SourceTracker) sits in
//! front of these rules so the graph never trips over them.

use crate::error::GeneratorError;
use crate::param::AudioParam;
use crate::unit::ParamName;
use crate::waveform::Waveform;

/// Largest detune in cents accepted by generator parameters.
const MAX_DETUNE_CENTS: f64 = 4800.0;

/// Start/stop bookkeeping shared by every generator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OneShot {
    start: Option<f64>,
    stop: Option<f64>,
}

impl OneShot {
    fn start(&mut self, when: f64) -> Result<(), GeneratorError> {
        if self.start.is_some() {
            return Err(GeneratorError::AlreadyStarted);
        }
        self.start = Some(when.max(0.0));
        Ok(())
    }

    fn stop(&mut self, when: f64) -> Result<(), GeneratorError> {
        match (self.start, self.stop) {
            (None, _) => Err(GeneratorError::NotStarted),
            (Some(_), Some(_)) => Err(GeneratorError::AlreadyStopped),
            (Some(_), None) => {
                self.stop = Some(when.max(0.0));
                Ok(())
            }
        }
    }
}

/// A schedulable signal generator with single-use start/stop.
pub trait Generator {
    /// Start/stop bookkeeping.
    fn one_shot(&self) -> &OneShot;

    /// Start/stop bookkeeping, mutably.
    fn one_shot_mut(&mut self) -> &mut OneShot;

    /// Begins generation at `when` seconds.
    fn start(&mut self, when: f64) -> Result<(), GeneratorError> {
        self.one_shot_mut().start(when)
    }

    /// Ends generation at `when` seconds. Terminal.
    fn stop(&mut self, when: f64) -> Result<(), GeneratorError> {
        self.one_shot_mut().stop(when)
    }

    /// Scheduled start time, if started.
    fn start_time(&self) -> Option<f64> {
        self.one_shot().start
    }

    /// Scheduled stop time, if stopped.
    fn stop_time(&self) -> Option<f64> {
        self.one_shot().stop
    }

    /// True if the generator produces signal at `time`.
    fn is_active_at(&self, time: f64) -> bool {
        let shot = self.one_shot();
        shot.start.is_some_and(|s| s <= time) && shot.stop.is_none_or(|s| time < s)
    }
}

/// Periodic oscillator.
#[derive(Clone, Debug)]
pub struct Oscillator {
    /// Waveform shape.
    pub shape: Waveform,
    /// Pitch in Hz.
    pub frequency: AudioParam,
    /// Pitch offset in cents.
    pub detune: AudioParam,
    shot: OneShot,
}

impl Oscillator {
    /// Creates an oscillator; frequency is limited to ±Nyquist.
    pub fn new(shape: Waveform, frequency: f64, sample_rate: f64) -> Self {
        let nyquist = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate / 2.0
        } else {
            f64::MAX
        };
        let mut freq = AudioParam::new(ParamName::Frequency, frequency, -nyquist, nyquist);
        freq.set_value(frequency);
        Self {
            shape,
            frequency: freq,
            detune: AudioParam::new(ParamName::Detune, 0.0, -MAX_DETUNE_CENTS, MAX_DETUNE_CENTS),
            shot: OneShot::default(),
        }
    }
}

impl Generator for Oscillator {
    fn one_shot(&self) -> &OneShot {
        &self.shot
    }

    fn one_shot_mut(&mut self) -> &mut OneShot {
        &mut self.shot
    }
}

/// Source emitting a constant (automatable) level, used as a modulation bus.
#[derive(Clone, Debug)]
pub struct ConstantSource {
    /// Output level.
    pub offset: AudioParam,
    shot: OneShot,
}

impl ConstantSource {
    /// Creates a constant source at `offset`.
    pub fn new(offset: f64) -> Self {
        Self {
            offset: AudioParam::new(ParamName::Offset, offset, f64::MIN, f64::MAX),
            shot: OneShot::default(),
        }
    }
}

impl Generator for ConstantSource {
    fn one_shot(&self) -> &OneShot {
        &self.shot
    }

    fn one_shot_mut(&mut self) -> &mut OneShot {
        &mut self.shot
    }
}

/// Plays a block of samples, e.g. a drawn or generated waveform.
#[derive(Clone, Debug)]
pub struct BufferSource {
    samples: Vec<f32>,
    sample_rate: f64,
    /// Restart from the beginning when the end is reached.
    pub looping: bool,
    /// Speed multiplier.
    pub playback_rate: AudioParam,
    /// Pitch offset in cents.
    pub detune: AudioParam,
    shot: OneShot,
}

impl BufferSource {
    /// Creates a buffer player for `samples` recorded at `sample_rate`.
    pub fn new(samples: Vec<f32>, sample_rate: f64) -> Self {
        Self {
            samples,
            sample_rate,
            looping: false,
            playback_rate: AudioParam::new(ParamName::PlaybackRate, 1.0, f64::MIN, f64::MAX),
            detune: AudioParam::new(ParamName::Detune, 0.0, -MAX_DETUNE_CENTS, MAX_DETUNE_CENTS),
            shot: OneShot::default(),
        }
    }

    /// Buffer contents.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Buffer length in seconds at its own sample rate.
    pub fn duration(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.samples.len() as f64 / self.sample_rate
        } else {
            0.0
        }
    }
}

impl Generator for BufferSource {
    fn one_shot(&self) -> &OneShot {
        &self.shot
    }

    fn one_shot_mut(&mut self) -> &mut OneShot {
        &mut self.shot
    }
}
