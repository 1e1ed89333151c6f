//! One-voice synthesizer: a signal graph ending in a fixed output chain,
//! driven by an ADSR envelope on the chain's gain stage.
//!
//! ```text
//!   [user nodes] ──▶ gain ──▶ analyser ──▶ destination
//!                     ▲
//!                     └── envelope automation
//! ```
//!
//! The three chain nodes are created by [`Synthesizer::new`] and cannot be
//! removed. User nodes connect into [`GAIN`] to be heard.

use crate::context::AudioContext;
use crate::envelope::{Envelope, EnvelopeScheduler, EnvelopeUpdate};
use crate::graph::SignalGraph;
use crate::param::AudioParam;
use crate::unit::{Analyser, ParamName, Processor, Target, Unit};

/// Name of the output sink node.
pub const DESTINATION: &str = "destination";
/// Name of the envelope-controlled gain node.
pub const GAIN: &str = "gain";
/// Name of the analysis tap between gain and destination.
pub const ANALYSER: &str = "analyser";

const FIXED_CHAIN: [&str; 3] = [DESTINATION, GAIN, ANALYSER];

/// A single voice.
///
/// # Example
///
/// ```rust
/// use thump_core::{AudioContext, EnvelopeUpdate, Synthesizer, Target, Waveform, synth};
///
/// let (ctx, clock) = AudioContext::offline(48000.0);
/// let mut voice = Synthesizer::new(&ctx);
/// voice.add_node("osc", ctx.oscillator(Waveform::Triangle, 220.0));
/// voice.connect("osc", synth::GAIN, Target::Input);
/// voice.set_envelope(EnvelopeUpdate::default().attack(0.005).release(0.2));
///
/// voice.start(0.0);
/// assert!(voice.is_playing());
/// clock.advance(0.5);
/// voice.stop(0.0);
/// assert!(!voice.is_playing());
/// ```
#[derive(Debug)]
pub struct Synthesizer {
    graph: SignalGraph,
    scheduler: EnvelopeScheduler,
    gain: f64,
    playing: bool,
}

impl Synthesizer {
    /// Creates a voice with the fixed output chain and the default envelope.
    pub fn new(ctx: &AudioContext) -> Self {
        let mut graph = SignalGraph::new();
        graph.add_node(DESTINATION, ctx.destination());
        graph.add_node(GAIN, ctx.gain(0.0));
        graph.add_node(ANALYSER, ctx.analyser());
        graph.connect(GAIN, ANALYSER, Target::Input);
        graph.connect(ANALYSER, DESTINATION, Target::Input);

        Self {
            graph,
            scheduler: EnvelopeScheduler::new(ctx.clock()),
            gain: 1.0,
            playing: false,
        }
    }

    // --- Playback ---

    /// Starts every armed source now and schedules attack and decay
    /// `offset` seconds from now.
    pub fn start(&mut self, offset: f64) {
        let now = self.scheduler.now();
        self.graph.start_sources(now);

        let scheduler = &self.scheduler;
        let peak = self.gain;
        self.graph.update_node(GAIN, |unit| {
            if let Some(param) = unit.param_mut(ParamName::Gain) {
                scheduler.schedule_start(param, peak, offset);
            }
        });
        self.playing = true;
    }

    /// Schedules the release `offset` seconds from now and stops every
    /// running source when it completes.
    pub fn stop(&mut self, offset: f64) {
        let scheduler = &self.scheduler;
        let mut end = None;
        self.graph.update_node(GAIN, |unit| {
            if let Some(param) = unit.param_mut(ParamName::Gain) {
                end = Some(scheduler.schedule_stop(param, offset));
            }
        });
        let end = end.unwrap_or_else(|| {
            (scheduler.now() + offset).max(0.0) + scheduler.envelope().release
        });
        self.graph.stop_sources(end);
        self.playing = false;
    }

    /// Starts now and stops after `duration` seconds.
    pub fn play(&mut self, duration: f64) {
        self.start(0.0);
        self.stop(duration);
    }

    /// True between `start` and `stop`.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    // --- Settings ---

    /// Current envelope.
    pub fn envelope(&self) -> Envelope {
        self.scheduler.envelope()
    }

    /// Merges `update` into the envelope. Takes effect on the next start.
    pub fn set_envelope(&mut self, update: EnvelopeUpdate) {
        self.scheduler.update(update);
    }

    /// Peak gain reached at the end of the attack.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Sets the peak gain, clamped to `>= 0`. Non-finite values are ignored.
    pub fn set_gain(&mut self, gain: f64) {
        if gain.is_finite() {
            self.gain = gain.max(0.0);
        }
    }

    // --- Graph ---

    /// Adds a node. See [`SignalGraph::add_node`].
    pub fn add_node(&mut self, name: impl Into<String>, unit: Unit) {
        self.graph.add_node(name, unit);
    }

    /// Removes a user node. Fixed-chain nodes are kept.
    pub fn remove_node(&mut self, name: &str) {
        if FIXED_CHAIN.contains(&name) {
            #[cfg(feature = "tracing")]
            tracing::debug!("synth_remove: ignored, '{name}' is part of the output chain");
            return;
        }
        self.graph.remove_node(name);
    }

    /// Mutates a node in place. See [`SignalGraph::update_node`].
    pub fn update_node<F>(&mut self, name: &str, mutator: F)
    where
        F: FnOnce(&mut Unit),
    {
        self.graph.update_node(name, mutator);
    }

    /// Connects two nodes. See [`SignalGraph::connect`].
    pub fn connect(&mut self, src: &str, dest: &str, target: Target) {
        self.graph.connect(src, dest, target);
    }

    /// Disconnects two nodes. See [`SignalGraph::disconnect`].
    pub fn disconnect(&mut self, src: &str, dest: &str, target: Target) {
        self.graph.disconnect(src, dest, target);
    }

    /// The analysis tap, unless it was replaced through `update_node`.
    pub fn analyser(&self) -> Option<&Analyser> {
        match self.graph.unit(ANALYSER).map(Unit::processor) {
            Some(Processor::Analyser(analyser)) => Some(analyser),
            _ => None,
        }
    }

    /// Automation timeline of the output gain.
    pub fn gain_param(&self) -> Option<&AudioParam> {
        self.graph.unit(GAIN).and_then(|u| u.param(ParamName::Gain))
    }

    /// The underlying graph.
    pub fn graph(&self) -> &SignalGraph {
        &self.graph
    }
}
