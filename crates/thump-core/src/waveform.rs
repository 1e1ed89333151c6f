//! Deterministic periodic-waveform sample generator.
//!
//! Renders naive (non-band-limited) sine, square, triangle, and saw tables of
//! a fixed length. These feed buffer sources and waveform drawings, so they
//! are computed exactly per sample index rather than with a running phase:
//! identical inputs always produce identical sequences.
//!
//! With `cycle = sample_rate / pitch` samples per period:
//!
//! ```text
//! sine      volume * sin(2π·i·pitch / sample_rate)
//! square    +volume when floor(2i / cycle) is even, else -volume
//! triangle  0 → +volume (¼ cycle) → -volume (¾ cycle) → 0
//! saw       -volume → +volume over each cycle, then reset
//! ```
//!
//! ```rust
//! use thump_core::Waveform;
//!
//! let table = Waveform::Triangle.render(100.0, 1.0, 0.01, 10000.0)?;
//! assert_eq!(table.len(), 100);
//! assert!((table[25] - 1.0).abs() < 1e-6);
//! # Ok::<(), thump_core::WaveformError>(())
//! ```

use core::f64::consts::TAU;
use core::fmt;
use core::str::FromStr;

use crate::context::AudioEnvironment;
use crate::error::WaveformError;

/// Largest table `render` allocates (about 25 minutes at 44.1 kHz).
pub const MAX_TABLE_LEN: usize = 1 << 26;

/// Periodic waveform shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Waveform {
    /// Pure sine.
    #[default]
    Sine,
    /// 50% duty square.
    Square,
    /// Symmetric triangle starting at zero.
    Triangle,
    /// Rising sawtooth.
    Saw,
}

impl Waveform {
    /// All shapes.
    pub const ALL: [Waveform; 4] = [Self::Sine, Self::Square, Self::Triangle, Self::Saw];

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Saw => "saw",
        }
    }

    /// Sample `index` of this waveform.
    ///
    /// Non-positive or non-finite `pitch` (or sample rate) yields silence.
    pub fn sample(self, index: usize, pitch: f64, volume: f64, sample_rate: f64) -> f32 {
        if !(pitch.is_finite() && pitch > 0.0 && sample_rate.is_finite() && sample_rate > 0.0) {
            return 0.0;
        }
        let i = index as f64;
        let cycle = sample_rate / pitch;

        let value = match self {
            Self::Sine => (TAU * i * pitch / sample_rate).sin() * volume,
            Self::Square => {
                let div = (2.0 * i / cycle).floor();
                if div % 2.0 == 0.0 { volume } else { -volume }
            }
            Self::Triangle => {
                let incline = 4.0 / cycle;
                let pos = i % cycle;
                if pos < cycle * 0.25 {
                    incline * pos * volume
                } else if pos > cycle * 0.75 {
                    (incline * pos - 4.0) * volume
                } else {
                    (-incline * pos + 2.0) * volume
                }
            }
            Self::Saw => {
                let incline = 2.0 / cycle;
                (incline * (i % cycle) - 1.0) * volume
            }
        };
        value as f32
    }

    /// Renders `duration` seconds at `sample_rate`.
    ///
    /// The table holds `round(sample_rate * duration)` samples; negative or
    /// non-finite durations give an empty table. Tables longer than
    /// [`MAX_TABLE_LEN`] fail with [`WaveformError::TooLong`].
    pub fn render(
        self,
        pitch: f64,
        volume: f64,
        duration: f64,
        sample_rate: f64,
    ) -> Result<Vec<f32>, WaveformError> {
        let len = table_len(duration, sample_rate)?;
        Ok((0..len)
            .map(|i| self.sample(i, pitch, volume, sample_rate))
            .collect())
    }

    /// Renders using the sample rate of `env`.
    ///
    /// Fails with [`WaveformError::Unavailable`] if the environment has no
    /// sample rate (not yet initialised, or closed).
    pub fn build<E: AudioEnvironment + ?Sized>(
        self,
        env: &E,
        pitch: f64,
        volume: f64,
        duration: f64,
    ) -> Result<Vec<f32>, WaveformError> {
        let sample_rate = env.sample_rate().ok_or(WaveformError::Unavailable)?;
        self.render(pitch, volume, duration, sample_rate)
    }
}

fn table_len(duration: f64, sample_rate: f64) -> Result<usize, WaveformError> {
    let len = (sample_rate * duration).round();
    if !len.is_finite() || len <= 0.0 {
        return Ok(0);
    }
    if len > MAX_TABLE_LEN as f64 {
        return Err(WaveformError::TooLong { max: MAX_TABLE_LEN });
    }
    Ok(len as usize)
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(Self::Sine),
            "square" | "sq" => Ok(Self::Square),
            "triangle" | "tri" => Ok(Self::Triangle),
            "saw" | "sawtooth" => Ok(Self::Saw),
            _ => Err(format!("unknown waveform '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 44100.0;

    #[test]
    fn length_is_rounded() {
        assert_eq!(Waveform::Sine.render(440.0, 1.0, 1.0, SR).unwrap().len(), 44100);
        // 44100 * 0.00001 = 0.441 -> 0, 44100 * 0.00002 = 0.882 -> 1
        assert_eq!(Waveform::Sine.render(440.0, 1.0, 0.00001, SR).unwrap().len(), 0);
        assert_eq!(Waveform::Sine.render(440.0, 1.0, 0.00002, SR).unwrap().len(), 1);
        assert!(Waveform::Saw.render(440.0, 1.0, -1.0, SR).unwrap().is_empty());
        assert!(Waveform::Saw.render(440.0, 1.0, f64::NAN, SR).unwrap().is_empty());
    }

    #[test]
    fn square_starts_high_and_flips_in_second_half() {
        let table = Waveform::Square.render(440.0, 1.0, 0.01, SR).unwrap();
        let cycle = SR / 440.0;
        assert_eq!(table[0], 1.0);
        // floor(2i / cycle) turns odd on the first index past cycle / 2, so
        // the flip is at ceil(cycle / 2) = 51 here; index 50, the rounded
        // midpoint, is still +volume.
        assert_eq!(table[50], 1.0);
        let flip = (cycle / 2.0).ceil() as usize;
        assert_eq!(table[flip], -1.0);
        assert_eq!(table[flip - 1], 1.0);
        assert_eq!(table[cycle.ceil() as usize], 1.0);
    }

    #[test]
    fn oversized_table_is_rejected() {
        assert_eq!(
            Waveform::Sine.render(440.0, 1.0, 1e15, SR),
            Err(WaveformError::TooLong { max: MAX_TABLE_LEN })
        );
        let twice_the_limit = 2.0 * MAX_TABLE_LEN as f64 / SR;
        assert!(Waveform::Sine.render(440.0, 1.0, twice_the_limit, SR).is_err());
        assert!(Waveform::Saw.render(440.0, 1.0, f64::INFINITY, SR).unwrap().is_empty());
    }

    #[test]
    fn triangle_breakpoints() {
        let table = Waveform::Triangle.render(100.0, 0.5, 0.01, 10000.0).unwrap();
        assert_eq!(table[0], 0.0);
        assert!((table[25] - 0.5).abs() < 1e-6);
        assert!(table[50].abs() < 1e-6);
        assert!((table[75] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn saw_ramps_and_resets() {
        let table = Waveform::Saw.render(100.0, 1.0, 0.02, 10000.0).unwrap();
        assert_eq!(table[0], -1.0);
        assert!(table[50].abs() < 1e-6);
        assert!(table[99] > 0.95);
        assert_eq!(table[100], -1.0);
    }

    #[test]
    fn sine_quarter_period() {
        let table = Waveform::Sine.render(100.0, 2.0, 0.01, 10000.0).unwrap();
        assert_eq!(table[0], 0.0);
        assert!((table[25] - 2.0).abs() < 1e-6);
        assert!((table[75] + 2.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_pitch_is_silent() {
        for shape in Waveform::ALL {
            let table = shape.render(0.0, 1.0, 0.001, SR).unwrap();
            assert!(table.iter().all(|&s| s == 0.0), "{shape}");
            assert_eq!(shape.sample(3, -10.0, 1.0, SR), 0.0);
        }
    }

    #[test]
    fn unavailable_environment() {
        let env: Option<crate::AudioContext> = None;
        assert_eq!(
            Waveform::Sine.build(&env, 440.0, 1.0, 1.0),
            Err(WaveformError::Unavailable)
        );
    }

    #[test]
    fn names_round_trip() {
        for shape in Waveform::ALL {
            assert_eq!(shape.as_str().parse::<Waveform>(), Ok(shape));
        }
        assert_eq!("Sawtooth".parse::<Waveform>(), Ok(Waveform::Saw));
        assert!("noise".parse::<Waveform>().is_err());
    }
}
