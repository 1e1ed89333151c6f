//! Named signal graph for one synthesizer voice.
//!
//! The graph is a live patch bay: nodes are added, rewired, reconfigured,
//! and removed while the voice is in use, so every mutation is total. An
//! unknown node name, a duplicate name, or a parameter the destination does
//! not expose makes the call a no-op rather than an error. With the
//! `tracing` feature enabled, rejected edits are logged at `debug`.
//!
//! # Invariants
//!
//! - Node names are unique.
//! - `a.next` contains `b` iff `b.prev` contains `a`, with the same [`Target`].
//! - Every adjacency entry names a live node: removal severs all edges first.
//! - Each unit's outgoing routes mirror its `next` map.
//!
//! Self-loops are accepted.
//!
//! # Example
//!
//! ```rust
//! use thump_core::{AudioContext, FilterType, ParamName, SignalGraph, Target, Waveform};
//!
//! let (ctx, _) = AudioContext::offline(48000.0);
//! let mut graph = SignalGraph::new();
//! graph.add_node("osc", ctx.oscillator(Waveform::Saw, 110.0));
//! graph.add_node("lfo", ctx.oscillator(Waveform::Sine, 3.0));
//! graph.add_node("filter", ctx.biquad(FilterType::Lowpass, 800.0));
//!
//! graph.connect("osc", "filter", Target::Input);
//! graph.connect("lfo", "filter", Target::Param(ParamName::Frequency));
//! graph.connect("lfo", "filter", Target::Param(ParamName::Offset)); // not exposed: ignored
//!
//! assert_eq!(graph.edges().len(), 2);
//! graph.remove_node("filter");
//! assert!(graph.edges().is_empty());
//! ```
//!
//! [`Target`]: crate::Target

mod node;
mod signal;

pub use node::Node;
pub use signal::{Edge, SignalGraph};
