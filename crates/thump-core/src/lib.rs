//! Thump Core - synthesis engine for the thump drum toy
//!
//! This crate provides the parts of the instrument that carry real invariants:
//! a named, live-patchable signal graph, a scheduled amplitude envelope, and a
//! deterministic periodic-waveform generator.
//!
//! # Core Abstractions
//!
//! ## Audio Environment
//!
//! - [`Clock`] - Monotonic time source ([`ManualClock`], [`SystemClock`])
//! - [`AudioEnvironment`] - Sample rate + clock, possibly unavailable
//! - [`AudioContext`] - Concrete environment and processing-unit factory
//!
//! ## Processing Units
//!
//! - [`Unit`] - One processing unit plus its outgoing routes
//! - [`Processor`] - Oscillator, filter, gain, constant, buffer, analyser, sink
//! - [`ParamName`] / [`Target`] - Capability table and connection selector
//! - [`AudioParam`] - Automation timeline for a single control input
//!
//! ## Signal Graph
//!
//! - [`SignalGraph`] - Named nodes with symmetric `next`/`prev` adjacency
//! - [`SourceTracker`] - Arms, starts, and stops self-clocked generators
//!
//! ## Synthesis
//!
//! - [`Envelope`] / [`EnvelopeScheduler`] - ADSR written as gain automation
//! - [`Synthesizer`] - One voice: graph + fixed output chain + envelope
//! - [`Waveform`] - Sine/square/triangle/saw sample generator
//!
//! # Example
//!
//! ```rust
//! use thump_core::{AudioContext, Synthesizer, Target, Waveform, synth};
//!
//! let (ctx, clock) = AudioContext::offline(44100.0);
//! let mut synth = Synthesizer::new(&ctx);
//! synth.add_node("osc", ctx.oscillator(Waveform::Sine, 110.0));
//! synth.connect("osc", synth::GAIN, Target::Input);
//!
//! clock.set(1.0);
//! synth.play(0.25);
//! assert_eq!(synth.gain_param().map(|p| p.events().len()), Some(4));
//! ```
//!
//! # Design Principles
//!
//! - **Total graph edits**: invalid names or parameters are ignored, never fatal
//! - **Explicit environment**: no ambient global context; clocks are injected
//! - **Scheduling only**: the engine writes automation, it never renders audio

pub mod clock;
pub mod context;
pub mod envelope;
pub mod error;
pub mod graph;
pub mod param;
pub mod source;
pub mod synth;
pub mod unit;
pub mod waveform;

// Re-export main types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{AudioContext, AudioEnvironment};
pub use envelope::{
    Envelope, EnvelopeScheduler, EnvelopeUpdate, MAX_ENVELOPE_TIME, MIN_EXPONENTIAL_TARGET,
};
pub use error::{AutomationError, GeneratorError, WaveformError};
pub use graph::{Node, SignalGraph};
pub use param::{AudioParam, AutomationEvent, AutomationKind};
pub use source::{SourceState, SourceTracker};
pub use synth::Synthesizer;
pub use unit::{
    Analyser, BiquadFilter, BufferSource, ConstantSource, FilterType, GainStage, Generator,
    Oscillator, ParamName, Processor, Route, Target, Unit,
};
pub use waveform::{MAX_TABLE_LEN, Waveform};
