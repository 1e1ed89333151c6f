//! Non-generating units: biquad filter, gain stage, analyser tap.

use crate::param::AudioParam;
use crate::unit::ParamName;

/// Default analysis window length in samples.
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Default analyser smoothing constant.
pub const DEFAULT_SMOOTHING: f64 = 0.8;

/// Biquad response types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// Second-order low-pass.
    #[default]
    Lowpass,
    /// Second-order high-pass.
    Highpass,
    /// Constant-skirt band-pass.
    Bandpass,
    /// Band-reject.
    Notch,
    /// Peaking EQ bell (uses `gain`).
    Peaking,
    /// Phase-only all-pass.
    Allpass,
}

/// Second-order IIR filter with automatable cutoff, detune, Q, and gain.
#[derive(Clone, Debug)]
pub struct BiquadFilter {
    /// Response type.
    pub kind: FilterType,
    /// Cutoff/center frequency in Hz.
    pub frequency: AudioParam,
    /// Frequency offset in cents.
    pub detune: AudioParam,
    /// Quality factor.
    pub q: AudioParam,
    /// Peak gain in dB (peaking only).
    pub gain: AudioParam,
}

impl BiquadFilter {
    /// Creates a filter at `frequency` Hz with Butterworth Q.
    pub fn new(kind: FilterType, frequency: f64, sample_rate: f64) -> Self {
        let nyquist = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate / 2.0
        } else {
            f64::MAX
        };
        let mut freq = AudioParam::new(ParamName::Frequency, frequency, 0.0, nyquist);
        freq.set_value(frequency);
        Self {
            kind,
            frequency: freq,
            detune: AudioParam::new(ParamName::Detune, 0.0, -4800.0, 4800.0),
            q: AudioParam::new(ParamName::Q, core::f64::consts::FRAC_1_SQRT_2, 0.0001, 1000.0),
            gain: AudioParam::new(ParamName::Gain, 0.0, -40.0, 40.0),
        }
    }
}

/// Linear gain stage.
#[derive(Clone, Debug)]
pub struct GainStage {
    /// Linear gain multiplier.
    pub gain: AudioParam,
}

impl GainStage {
    /// Creates a gain stage at `gain`.
    pub fn new(gain: f64) -> Self {
        Self {
            gain: AudioParam::new(ParamName::Gain, gain, f64::MIN, f64::MAX),
        }
    }
}

/// Level-analysis tap.
///
/// The rendering engine writes the most recent block of samples with
/// [`write_frame`](Self::write_frame); visualisers read levels back.
#[derive(Clone, Debug)]
pub struct Analyser {
    fft_size: usize,
    smoothing: f64,
    frame: Vec<f32>,
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new(DEFAULT_FFT_SIZE, DEFAULT_SMOOTHING)
    }
}

impl Analyser {
    /// Creates an analyser; invalid settings fall back to the defaults.
    pub fn new(fft_size: usize, smoothing: f64) -> Self {
        let mut analyser = Self {
            fft_size: DEFAULT_FFT_SIZE,
            smoothing: DEFAULT_SMOOTHING,
            frame: Vec::new(),
        };
        analyser.set_fft_size(fft_size);
        analyser.set_smoothing(smoothing);
        analyser
    }

    /// True if `size` is an accepted window length (power of two, 32..=32768).
    pub fn is_valid_fft_size(size: usize) -> bool {
        size.is_power_of_two() && (32..=32768).contains(&size)
    }

    /// Window length in samples.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Sets the window length. Returns false (and keeps the old size) if invalid.
    pub fn set_fft_size(&mut self, size: usize) -> bool {
        if !Self::is_valid_fft_size(size) {
            return false;
        }
        self.fft_size = size;
        if self.frame.len() > size {
            self.frame.drain(..self.frame.len() - size);
        }
        true
    }

    /// Smoothing time constant in `[0, 1]`.
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Sets the smoothing constant, clamped to `[0, 1]`. NaN is ignored.
    pub fn set_smoothing(&mut self, smoothing: f64) {
        if !smoothing.is_nan() {
            self.smoothing = smoothing.clamp(0.0, 1.0);
        }
    }

    /// Appends rendered samples, keeping only the last `fft_size`.
    pub fn write_frame(&mut self, samples: &[f32]) {
        self.frame.extend_from_slice(samples);
        if self.frame.len() > self.fft_size {
            self.frame.drain(..self.frame.len() - self.fft_size);
        }
    }

    /// Most recent time-domain samples.
    pub fn time_domain_data(&self) -> &[f32] {
        &self.frame
    }

    /// RMS level of the current frame (0 when empty).
    pub fn rms(&self) -> f32 {
        if self.frame.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = self.frame.iter().map(|&s| s * s).sum();
        (sum_sq / self.frame.len() as f32).sqrt()
    }

    /// Absolute peak of the current frame (0 when empty).
    pub fn peak(&self) -> f32 {
        self.frame.iter().fold(0.0_f32, |m, &s| m.max(s.abs()))
    }
}
