//! Processing units and their capability tables.
//!
//! A [`Unit`] is what a graph node owns: one [`Processor`] plus the list of
//! outgoing [`Route`]s that represent its platform-level wiring. Each
//! processor variant declares, in a static table, which named control inputs
//! ([`ParamName`]) it exposes. Graph connections to a parameter consult that
//! table instead of probing the unit at runtime.
//!
//! | Processor | Parameters |
//! |-----------|------------|
//! | [`Oscillator`] | frequency, detune |
//! | [`ConstantSource`] | offset |
//! | [`BufferSource`] | playbackRate, detune |
//! | [`BiquadFilter`] | frequency, detune, Q, gain |
//! | [`GainStage`] | gain |
//! | [`Analyser`] | (none) |
//! | `Destination` | (none) |

mod effect;
mod source;

pub use effect::{
    Analyser, BiquadFilter, DEFAULT_FFT_SIZE, DEFAULT_SMOOTHING, FilterType, GainStage,
};
pub use source::{BufferSource, ConstantSource, Generator, OneShot, Oscillator};

use core::fmt;
use core::str::FromStr;

use crate::param::AudioParam;

/// Named automation inputs a unit may expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamName {
    /// Oscillator pitch or filter cutoff/center, in Hz.
    Frequency,
    /// Pitch offset in cents.
    Detune,
    /// Filter quality factor.
    Q,
    /// Linear gain (gain stage) or shelf/peak gain in dB (filter).
    Gain,
    /// Constant source output level.
    Offset,
    /// Buffer playback speed multiplier.
    PlaybackRate,
}

impl ParamName {
    /// All parameter names.
    pub const ALL: [ParamName; 6] = [
        Self::Frequency,
        Self::Detune,
        Self::Q,
        Self::Gain,
        Self::Offset,
        Self::PlaybackRate,
    ];

    /// Canonical name as used by patch descriptions (`"frequency"`, `"Q"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::Detune => "detune",
            Self::Q => "Q",
            Self::Gain => "gain",
            Self::Offset => "offset",
            Self::PlaybackRate => "playbackRate",
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase().replace(['_', '-'], "");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().to_ascii_lowercase() == key)
            .ok_or_else(|| format!("unknown parameter '{s}'"))
    }
}

/// Connection-target selector: where an edge lands on its destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Target {
    /// The destination's generic signal input.
    #[default]
    Input,
    /// A named automation parameter of the destination.
    Param(ParamName),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Param(p) => write!(f, "{p}"),
        }
    }
}

impl From<ParamName> for Target {
    fn from(p: ParamName) -> Self {
        Self::Param(p)
    }
}

/// One outgoing wire of a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Name of the destination node.
    pub dest: String,
    /// Where on the destination the wire lands.
    pub target: Target,
}

/// The signal-processing element inside a unit.
#[derive(Clone, Debug)]
pub enum Processor {
    /// Periodic oscillator (self-clocked).
    Oscillator(Oscillator),
    /// Constant-level source (self-clocked).
    Constant(ConstantSource),
    /// Sample buffer player (self-clocked).
    Buffer(BufferSource),
    /// Second-order filter.
    Filter(BiquadFilter),
    /// Gain stage.
    Gain(GainStage),
    /// Level-analysis tap.
    Analyser(Analyser),
    /// Output sink.
    Destination,
}

const OSCILLATOR_PARAMS: &[ParamName] = &[ParamName::Frequency, ParamName::Detune];
const CONSTANT_PARAMS: &[ParamName] = &[ParamName::Offset];
const BUFFER_PARAMS: &[ParamName] = &[ParamName::PlaybackRate, ParamName::Detune];
const FILTER_PARAMS: &[ParamName] = &[
    ParamName::Frequency,
    ParamName::Detune,
    ParamName::Q,
    ParamName::Gain,
];
const GAIN_PARAMS: &[ParamName] = &[ParamName::Gain];

impl Processor {
    /// Short lowercase kind label.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Oscillator(_) => "oscillator",
            Self::Constant(_) => "constant",
            Self::Buffer(_) => "buffer",
            Self::Filter(_) => "filter",
            Self::Gain(_) => "gain",
            Self::Analyser(_) => "analyser",
            Self::Destination => "destination",
        }
    }

    /// Capability table: parameters this processor exposes.
    pub fn params(&self) -> &'static [ParamName] {
        match self {
            Self::Oscillator(_) => OSCILLATOR_PARAMS,
            Self::Constant(_) => CONSTANT_PARAMS,
            Self::Buffer(_) => BUFFER_PARAMS,
            Self::Filter(_) => FILTER_PARAMS,
            Self::Gain(_) => GAIN_PARAMS,
            Self::Analyser(_) | Self::Destination => &[],
        }
    }

    /// Returns the named parameter, if exposed.
    pub fn param(&self, name: ParamName) -> Option<&AudioParam> {
        match (self, name) {
            (Self::Oscillator(o), ParamName::Frequency) => Some(&o.frequency),
            (Self::Oscillator(o), ParamName::Detune) => Some(&o.detune),
            (Self::Constant(c), ParamName::Offset) => Some(&c.offset),
            (Self::Buffer(b), ParamName::PlaybackRate) => Some(&b.playback_rate),
            (Self::Buffer(b), ParamName::Detune) => Some(&b.detune),
            (Self::Filter(f), ParamName::Frequency) => Some(&f.frequency),
            (Self::Filter(f), ParamName::Detune) => Some(&f.detune),
            (Self::Filter(f), ParamName::Q) => Some(&f.q),
            (Self::Filter(f), ParamName::Gain) => Some(&f.gain),
            (Self::Gain(g), ParamName::Gain) => Some(&g.gain),
            _ => None,
        }
    }

    /// Returns the named parameter mutably, if exposed.
    pub fn param_mut(&mut self, name: ParamName) -> Option<&mut AudioParam> {
        match (self, name) {
            (Self::Oscillator(o), ParamName::Frequency) => Some(&mut o.frequency),
            (Self::Oscillator(o), ParamName::Detune) => Some(&mut o.detune),
            (Self::Constant(c), ParamName::Offset) => Some(&mut c.offset),
            (Self::Buffer(b), ParamName::PlaybackRate) => Some(&mut b.playback_rate),
            (Self::Buffer(b), ParamName::Detune) => Some(&mut b.detune),
            (Self::Filter(f), ParamName::Frequency) => Some(&mut f.frequency),
            (Self::Filter(f), ParamName::Detune) => Some(&mut f.detune),
            (Self::Filter(f), ParamName::Q) => Some(&mut f.q),
            (Self::Filter(f), ParamName::Gain) => Some(&mut f.gain),
            (Self::Gain(g), ParamName::Gain) => Some(&mut g.gain),
            _ => None,
        }
    }

    /// The self-clocked generator inside this processor, if any.
    pub fn generator(&self) -> Option<&dyn Generator> {
        match self {
            Self::Oscillator(o) => Some(o),
            Self::Constant(c) => Some(c),
            Self::Buffer(b) => Some(b),
            _ => None,
        }
    }

    /// Mutable access to the self-clocked generator, if any.
    pub fn generator_mut(&mut self) -> Option<&mut dyn Generator> {
        match self {
            Self::Oscillator(o) => Some(o),
            Self::Constant(c) => Some(c),
            Self::Buffer(b) => Some(b),
            _ => None,
        }
    }
}

/// A processing unit owned by one graph node.
#[derive(Clone, Debug)]
pub struct Unit {
    processor: Processor,
    routes: Vec<Route>,
}

impl Unit {
    /// Wraps a processor with no outgoing routes.
    pub fn new(processor: Processor) -> Self {
        Self {
            processor,
            routes: Vec::new(),
        }
    }

    /// The wrapped processor.
    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    /// The wrapped processor, mutably.
    pub fn processor_mut(&mut self) -> &mut Processor {
        &mut self.processor
    }

    /// Short lowercase kind label.
    pub fn kind_name(&self) -> &'static str {
        self.processor.kind_name()
    }

    /// Capability table: parameters this unit exposes.
    pub fn params(&self) -> &'static [ParamName] {
        self.processor.params()
    }

    /// True if the unit exposes `name`.
    pub fn has_param(&self, name: ParamName) -> bool {
        self.params().contains(&name)
    }

    /// Returns the named parameter, if exposed.
    pub fn param(&self, name: ParamName) -> Option<&AudioParam> {
        self.processor.param(name)
    }

    /// Returns the named parameter mutably, if exposed.
    pub fn param_mut(&mut self, name: ParamName) -> Option<&mut AudioParam> {
        self.processor.param_mut(name)
    }

    /// True if the unit is a self-clocked generator.
    pub fn is_source(&self) -> bool {
        self.processor.generator().is_some()
    }

    /// The generator inside this unit, if any.
    pub fn generator(&self) -> Option<&dyn Generator> {
        self.processor.generator()
    }

    /// The generator inside this unit, mutably.
    pub fn generator_mut(&mut self) -> Option<&mut dyn Generator> {
        self.processor.generator_mut()
    }

    /// Outgoing routes in the order they were made.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub(crate) fn route(&mut self, dest: &str, target: Target) {
        if !self.is_routed(dest, target) {
            self.routes.push(Route {
                dest: dest.to_owned(),
                target,
            });
        }
    }

    pub(crate) fn unroute(&mut self, dest: &str, target: Target) -> bool {
        let before = self.routes.len();
        self.routes
            .retain(|r| !(r.dest == dest && r.target == target));
        before != self.routes.len()
    }

    /// Drops every outgoing route. Returns how many were dropped.
    pub(crate) fn detach(&mut self) -> usize {
        let n = self.routes.len();
        self.routes.clear();
        n
    }

    fn is_routed(&self, dest: &str, target: Target) -> bool {
        self.routes
            .iter()
            .any(|r| r.dest == dest && r.target == target)
    }
}

impl From<Processor> for Unit {
    fn from(processor: Processor) -> Self {
        Self::new(processor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::Waveform;

    #[test]
    fn capability_table_matches_accessors() {
        let units = [
            Processor::Oscillator(Oscillator::new(Waveform::Sine, 440.0, 48000.0)),
            Processor::Constant(ConstantSource::new(1.0)),
            Processor::Buffer(BufferSource::new(vec![0.0; 4], 48000.0)),
            Processor::Filter(BiquadFilter::new(FilterType::Lowpass, 1000.0, 48000.0)),
            Processor::Gain(GainStage::new(1.0)),
            Processor::Analyser(Analyser::default()),
            Processor::Destination,
        ];
        for unit in &units {
            for name in ParamName::ALL {
                assert_eq!(
                    unit.params().contains(&name),
                    unit.param(name).is_some(),
                    "{} / {name}",
                    unit.kind_name()
                );
            }
        }
    }

    #[test]
    fn param_names_parse() {
        assert_eq!("frequency".parse::<ParamName>(), Ok(ParamName::Frequency));
        assert_eq!("q".parse::<ParamName>(), Ok(ParamName::Q));
        assert_eq!("playback_rate".parse::<ParamName>(), Ok(ParamName::PlaybackRate));
        assert!("cutoff".parse::<ParamName>().is_err());
    }

    #[test]
    fn only_generators_are_sources() {
        let osc = Unit::new(Processor::Oscillator(Oscillator::new(
            Waveform::Saw,
            110.0,
            48000.0,
        )));
        let gain = Unit::new(Processor::Gain(GainStage::new(0.5)));
        assert!(osc.is_source());
        assert!(!gain.is_source());
    }

    #[test]
    fn routes_are_deduplicated_and_detachable() {
        let mut unit = Unit::new(Processor::Gain(GainStage::new(1.0)));
        unit.route("out", Target::Input);
        unit.route("out", Target::Input);
        unit.route("filter", Target::Param(ParamName::Frequency));
        assert_eq!(unit.routes().len(), 2);
        assert!(unit.unroute("out", Target::Input));
        assert!(!unit.unroute("out", Target::Input));
        assert_eq!(unit.detach(), 1);
        assert!(unit.routes().is_empty());
    }
}
